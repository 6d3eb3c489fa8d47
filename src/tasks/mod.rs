// src/tasks/mod.rs

//! The built-in task set.
//!
//! [`build_registry`] turns a validated [`ConfigFile`] into a
//! [`TaskRegistry`] holding every named task: the asset pipelines, the
//! external-tool tasks, the live-reload server and the composite/watch
//! tasks built from them.

pub mod assets;
pub mod clean;
pub mod external;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::model::ConfigFile;
use crate::dag::{action_fn, TaskAction, TaskDef, TaskRegistry};
use crate::errors::{AssetpipeError, Result};
use crate::exec::ExternalCommand;
use crate::fs::FileSystem;
use crate::pipeline::Pipeline;
use crate::server::LiveReload;
use crate::watch::WatchBinding;

use self::assets::{icons_pipeline, prototype_pipeline, styles_pipeline};
use self::clean::clean_dir;
use self::external::{backstop_command, styleguide_command, BackstopMode};

pub const DEFAULT_TASK_MESSAGE: &str =
    "No default task set! Run `assetpipe --list` for an overview of the tasks.";

/// Register every built-in task.
pub fn build_registry(
    cfg: &ConfigFile,
    fs: Arc<dyn FileSystem>,
    live: LiveReload,
) -> Result<TaskRegistry> {
    let mut registry = TaskRegistry::new();

    let scss_glob = cfg.glob_under(&cfg.paths.scss, "**/*.scss");
    let twig_glob = cfg.glob_under(&cfg.paths.twig, "**/*.twig");

    registry.register(
        TaskDef::new("icons")
            .with_description("Minify SVG icons and merge them into one sprite")
            .with_action(pipeline_action(icons_pipeline(cfg, Arc::clone(&fs))?)),
    )?;

    registry.register(
        TaskDef::new("styles")
            .with_description("Compile SCSS, then write a minified, prefixed bundle")
            .with_action(pipeline_action(styles_pipeline(cfg, Arc::clone(&fs))?)),
    )?;

    registry.register(
        TaskDef::new("styles:watch")
            .with_description("Rebuild styles whenever a stylesheet changes")
            .with_watch(WatchBinding::new([scss_glob.as_str()], ["styles"])),
    )?;

    registry.register(
        TaskDef::new("prototype")
            .with_description("Render templates to static HTML")
            .with_action(pipeline_action(prototype_pipeline(
                cfg,
                Arc::clone(&fs),
                live.clone(),
            )?)),
    )?;

    registry.register(
        TaskDef::new("prototype:watch")
            .with_description("Clean, render and serve the prototype; re-render on template changes")
            .with_prerequisites(["clean", "prototype", "browser-sync"])
            .with_watch(WatchBinding::new([twig_glob.as_str()], ["prototype"])),
    )?;

    registry.register(
        TaskDef::new("styleguide")
            .with_description("Generate the style guide with the external generator")
            .with_action(styleguide_action(cfg, Arc::clone(&fs), live.clone())),
    )?;

    registry.register(
        TaskDef::new("styleguide:watch")
            .with_description("Clean, build and serve; rebuild on stylesheet and template changes")
            .with_prerequisites(["clean", "build", "browser-sync"])
            .with_watch(WatchBinding::new([scss_glob.as_str()], ["styles", "styleguide"]))
            .with_watch(WatchBinding::new([twig_glob.as_str()], ["prototype"])),
    )?;

    registry.register(
        TaskDef::new("clean")
            .with_description("Empty the style guide output, keeping backstop_data/, static/ and pdp.html")
            .with_action(clean_action(cfg, Arc::clone(&fs))),
    )?;

    for mode in BackstopMode::ALL {
        let cmd = backstop_command(cfg, mode);
        registry.register(
            TaskDef::new(mode.task_name())
                .with_description(format!("Run visual regression tests ({mode})"))
                .with_action(action_fn(move || {
                    let cmd = cmd.clone();
                    async move { cmd.run().await.map_err(AssetpipeError::from) }
                })),
        )?;
    }

    registry.register(
        TaskDef::new("browser-sync")
            .with_description("Serve the html dir with live reload")
            .with_action(server_action(cfg, live))
            .long_lived(),
    )?;

    registry.register(
        TaskDef::new("build")
            .with_description("Build icons, styles, prototype and style guide")
            .with_prerequisites(["icons", "styles", "prototype", "styleguide"]),
    )?;

    registry.register(
        TaskDef::new("default")
            .with_description("Print a usage hint")
            .with_action(action_fn(|| async {
                println!("{DEFAULT_TASK_MESSAGE}");
                Result::Ok(())
            })),
    )?;

    Ok(registry)
}

fn pipeline_action(pipeline: Pipeline) -> Arc<dyn TaskAction> {
    let pipeline = Arc::new(pipeline);
    action_fn(move || {
        let pipeline = Arc::clone(&pipeline);
        async move {
            pipeline
                .execute_blocking()
                .await
                .map(|_report| ())
                .map_err(AssetpipeError::from)
        }
    })
}

fn styleguide_action(
    cfg: &ConfigFile,
    fs: Arc<dyn FileSystem>,
    live: LiveReload,
) -> Arc<dyn TaskAction> {
    let config_path = cfg.resolve(&cfg.styleguide.config);
    let cmd = styleguide_command(cfg);
    let output = cfg.paths.styleguide.clone();

    action_fn(move || {
        let fs = Arc::clone(&fs);
        let config_path = config_path.clone();
        let cmd = cmd.clone();
        let live = live.clone();
        let output = output.clone();
        async move { run_styleguide(fs, config_path, cmd, live, output).await }
    })
}

async fn run_styleguide(
    fs: Arc<dyn FileSystem>,
    config_path: PathBuf,
    cmd: ExternalCommand,
    live: LiveReload,
    output: String,
) -> Result<()> {
    if !fs.is_file(&config_path) {
        warn!(config = ?config_path, "style guide config not found; skipping generator");
        return Ok(());
    }
    cmd.run().await?;
    live.reload(vec![output]);
    Ok(())
}

fn clean_action(cfg: &ConfigFile, fs: Arc<dyn FileSystem>) -> Arc<dyn TaskAction> {
    let dir = cfg.resolve(&cfg.paths.styleguide);
    action_fn(move || {
        let fs = Arc::clone(&fs);
        let dir = dir.clone();
        async move {
            clean_dir(fs.as_ref(), &dir)
                .map(|_removed| ())
                .map_err(AssetpipeError::from)
        }
    })
}

fn server_action(cfg: &ConfigFile, live: LiveReload) -> Arc<dyn TaskAction> {
    let base_dir = cfg.resolve(&cfg.server.base_dir);
    let port = cfg.server.port;
    let open_browser = cfg.server.open;

    action_fn(move || {
        let live = live.clone();
        let base_dir = base_dir.clone();
        async move { start_server(live, base_dir, port, open_browser).await }
    })
}

async fn start_server(live: LiveReload, base_dir: PathBuf, port: u16, open_browser: bool) -> Result<()> {
    let addr = live.serve(&base_dir, port).await?;
    let url = format!("http://{addr}/");
    info!(%url, "serving prototype");
    if open_browser {
        if let Err(err) = open::that(&url) {
            warn!(%url, error = %err, "could not open browser");
        }
    }
    Ok(())
}

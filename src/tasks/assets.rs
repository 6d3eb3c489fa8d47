// src/tasks/assets.rs

//! File pipelines behind the `icons`, `styles` and `prototype` tasks.

use std::sync::Arc;

use anyhow::Result;

use crate::config::model::ConfigFile;
use crate::fs::FileSystem;
use crate::pipeline::stages::{
    Compile, Concat, Dest, Minify, PostProcess, Reload, Rename, SvgMin, SvgStore, Twig,
};
use crate::pipeline::{EachFile, FileSet, Pipeline};
use crate::server::LiveReload;

/// `icons/**/*.svg` → strip attributes → one sprite → icons output dir.
pub fn icons_pipeline(cfg: &ConfigFile, fs: Arc<dyn FileSystem>) -> Result<Pipeline> {
    let source = FileSet::new(cfg.resolve(&cfg.paths.icons), ["**/*.svg"])?;
    Ok(Pipeline::new("icons", source, fs)
        .stage(EachFile::abort(SvgMin::new(cfg.icons.strip_attributes.clone())))
        .stage(SvgStore::new(&cfg.icons.sprite_name))
        .stage(Dest::new(cfg.resolve(&cfg.paths.icons_out))))
}

/// Compile every non-partial stylesheet, write the flattened, source-mapped
/// CSS, then
/// write one minified, prefixed and media-packed bundle next to it.
///
/// Compilation errors skip the offending file; any later error aborts.
pub fn styles_pipeline(cfg: &ConfigFile, fs: Arc<dyn FileSystem>) -> Result<Pipeline> {
    let scss = cfg.resolve(&cfg.paths.scss);
    let css_out = cfg.resolve(&cfg.paths.css_out);

    let mut load_paths = vec![scss.clone()];
    load_paths.extend(cfg.styles.include_paths.iter().map(|p| cfg.resolve(p)));

    let source = FileSet::new(&scss, ["**/*.scss", "!**/_*.scss"])?;
    let post = PostProcess::new(&cfg.styles.browsers, cfg.styles.sort_media_queries)?;

    Ok(Pipeline::new("styles", source, fs)
        .stage(EachFile::skip(
            Compile::new(load_paths, cfg.styles.output_style)
                .with_source_maps(cfg.styles.source_maps),
        ))
        .stage(Rename::flatten())
        .stage(Dest::new(&css_out))
        .stage(EachFile::abort(Minify))
        .stage(Concat::new(&cfg.styles.bundle_name))
        .stage(EachFile::abort(post))
        .stage(Dest::new(&css_out)))
}

/// Render every non-partial template into the html dir and reload browsers.
pub fn prototype_pipeline(
    cfg: &ConfigFile,
    fs: Arc<dyn FileSystem>,
    live: LiveReload,
) -> Result<Pipeline> {
    let twig = cfg.resolve(&cfg.paths.twig);
    let source = FileSet::new(&twig, ["**/*.twig", "!**/_*.twig"])?;

    Ok(Pipeline::new("prototype", source, fs)
        .stage(Twig::new(&twig))
        .stage(Dest::new(cfg.resolve(&cfg.paths.html)))
        .stage(Reload::new(live)))
}

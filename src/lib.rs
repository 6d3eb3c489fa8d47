// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod server;
pub mod tasks;
pub mod types;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::load_or_default;
use crate::dag::{Sequencer, TaskRegistry};
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TaskName, TriggerReason};
use crate::errors::{AssetpipeError, Result};
use crate::exec::RealRunBackend;
use crate::fs::{FileSystem, RealFileSystem};
use crate::server::LiveReload;
use crate::tasks::build_registry;
use crate::watch::WatchBinding;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and task registration
/// - the core runtime and its run backend
/// - (optional) file watcher, when the plan contains watch bindings
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(args.config.as_deref().map(Path::new))?;
    debug!(root = ?cfg.root(), "configuration loaded");

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let live = LiveReload::new();

    let registry = build_registry(&cfg, fs, live)?;
    registry.validate()?;

    if args.list {
        print_task_list(&registry);
        return Ok(());
    }

    let requested = args.requested_tasks();
    let sequencer = Arc::new(Sequencer::new(Arc::new(registry)));
    let plan = sequencer.plan(&requested)?;

    if args.dry_run {
        print_dry_run(sequencer.registry(), &plan);
        return Ok(());
    }

    let bindings = watch_bindings(sequencer.registry(), &plan)?;
    let persistent = !bindings.is_empty()
        || plan
            .iter()
            .map(|name| sequencer.registry().get(name))
            .collect::<Result<Vec<_>>>()?
            .iter()
            .any(|def| def.is_long_lived());

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let _watcher_handle = if bindings.is_empty() {
        None
    } else {
        Some(crate::watch::spawn_watcher(cfg.root(), &bindings, rt_tx.clone())?)
    };

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    info!(tasks = ?requested, persistent, "starting");
    rt_tx
        .send(RuntimeEvent::TasksTriggered {
            tasks: requested,
            reason: TriggerReason::Manual,
        })
        .await
        .map_err(|e| AssetpipeError::Other(e.into()))?;

    let options = RuntimeOptions {
        exit_when_idle: !persistent,
    };
    let core = CoreRuntime::new(
        cfg.watch.triggered_while_running_behaviour,
        cfg.watch.queue_length,
        options,
    );
    let backend = RealRunBackend::new(Arc::clone(&sequencer), rt_tx);

    Runtime::new(core, rt_rx, backend).run().await
}

/// Watch bindings of every task in `plan`, in plan order.
fn watch_bindings(registry: &TaskRegistry, plan: &[TaskName]) -> Result<Vec<WatchBinding>> {
    let mut bindings = Vec::new();
    for name in plan {
        bindings.extend(registry.get(name)?.watch_bindings().iter().cloned());
    }
    Ok(bindings)
}

fn print_task_list(registry: &TaskRegistry) {
    println!("tasks ({}):", registry.len());
    for def in registry.iter() {
        println!("  {:<20} {}", def.name(), def.description());
        if !def.prerequisites().is_empty() {
            println!("  {:<20} after: {}", "", def.prerequisites().join(", "));
        }
    }
}

fn print_dry_run(registry: &TaskRegistry, plan: &[TaskName]) {
    println!("assetpipe dry-run");
    println!("sequence ({}):", plan.len());
    for (idx, name) in plan.iter().enumerate() {
        let Ok(def) = registry.get(name) else {
            continue;
        };
        let kind = if def.action().is_some() { "" } else { " (composite)" };
        println!("  {}. {name}{kind}", idx + 1);
        for binding in def.watch_bindings() {
            println!(
                "      watch {:?} -> {}",
                binding.patterns,
                binding.tasks.join(", ")
            );
        }
        if def.is_long_lived() {
            println!("      long_lived: true");
        }
    }

    debug!("dry-run complete (no execution)");
}

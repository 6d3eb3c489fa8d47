// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::{AssetpipeError, Result};
use crate::exec::RunBackend;

use super::core::CoreRuntime;
use super::{CoreCommand, RunOutcome, RuntimeEvent};

/// Drives [`CoreRuntime`] in response to `RuntimeEvent`s and delegates
/// run execution to a [`RunBackend`].
///
/// All semantics live in the core; this shell only reads events from the
/// channel and carries out the commands it gets back.
pub struct Runtime<B: RunBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    backend: B,
}

impl<B: RunBackend> fmt::Debug for Runtime<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<B: RunBackend> Runtime<B> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, backend: B) -> Self {
        Self {
            core,
            event_rx,
            backend,
        }
    }

    /// Main event loop.
    ///
    /// Returns `Err(TaskFailed)` when a manual run failed; a shutdown
    /// request or an idle exit returns `Ok(())`.
    pub async fn run(mut self) -> Result<()> {
        info!("assetpipe runtime started");

        loop {
            let Some(event) = self.event_rx.recv().await else {
                info!("runtime event channel closed; exiting");
                break;
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        if let Some(run_id) = self.core.active_run_id() {
            self.backend.cancel_run(run_id);
        }

        match self.core.fatal_outcome() {
            Some(RunOutcome::Failed { task, message }) => Err(AssetpipeError::TaskFailed {
                task: task.clone().unwrap_or_else(|| "<plan>".to_string()),
                message: message.clone(),
            }),
            _ => {
                info!("runtime exiting");
                Ok(())
            }
        }
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::StartRun { run_id, tasks } => {
                self.backend.start_run(run_id, tasks).await?;
            }
            CoreCommand::CancelRun { run_id } => {
                self.backend.cancel_run(run_id);
            }
            CoreCommand::RequestExit => {
                debug!("core issued RequestExit command");
            }
        }
        Ok(())
    }
}

// src/exec/backend.rs

//! Pluggable run backend abstraction.
//!
//! The runtime talks to a `RunBackend` instead of spawning sequences
//! itself. Production uses [`RealRunBackend`]; tests can provide a fake
//! that records requested runs and emits `RunFinished` events directly.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::dag::{cancel_pair, CancelHandle, Sequencer};
use crate::engine::{RunOutcome, RuntimeEvent, TaskName};
use crate::errors::{AssetpipeError, Result};

/// Trait abstracting how runs are executed.
pub trait RunBackend: Send {
    /// Begin executing `tasks` (with prerequisites) as run `run_id`.
    ///
    /// Completion must be reported back as `RuntimeEvent::RunFinished`.
    fn start_run(
        &mut self,
        run_id: u64,
        tasks: Vec<TaskName>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Request cancellation of run `run_id`, if it is still in flight.
    fn cancel_run(&mut self, run_id: u64);
}

/// Runs sequences on Tokio tasks using a shared [`Sequencer`].
pub struct RealRunBackend {
    sequencer: Arc<Sequencer>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    cancel: Option<(u64, CancelHandle)>,
}

impl RealRunBackend {
    pub fn new(sequencer: Arc<Sequencer>, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self {
            sequencer,
            runtime_tx,
            cancel: None,
        }
    }
}

impl RunBackend for RealRunBackend {
    fn start_run(
        &mut self,
        run_id: u64,
        tasks: Vec<TaskName>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let (handle, signal) = cancel_pair();
        self.cancel = Some((run_id, handle));

        let sequencer = Arc::clone(&self.sequencer);
        let runtime_tx = self.runtime_tx.clone();

        Box::pin(async move {
            tokio::spawn(async move {
                let outcome = match sequencer.run_cancellable(&tasks, signal).await {
                    Ok(()) => RunOutcome::Success,
                    Err(AssetpipeError::Cancelled) => RunOutcome::Cancelled,
                    Err(AssetpipeError::TaskFailed { task, message }) => RunOutcome::Failed {
                        task: Some(task),
                        message,
                    },
                    Err(other) => RunOutcome::Failed {
                        task: None,
                        message: other.detail(),
                    },
                };
                debug!(run_id, ?outcome, "sequence finished");
                if runtime_tx
                    .send(RuntimeEvent::RunFinished { run_id, outcome })
                    .await
                    .is_err()
                {
                    debug!(run_id, "runtime gone before run finished");
                }
            });
            Ok(())
        })
    }

    fn cancel_run(&mut self, run_id: u64) {
        match self.cancel.take() {
            Some((id, handle)) if id == run_id => handle.cancel(),
            Some(other) => {
                warn!(run_id, active = other.0, "cancel for unknown run; ignoring");
                self.cancel = Some(other);
            }
            None => debug!(run_id, "no run to cancel"),
        }
    }
}

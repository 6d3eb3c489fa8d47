// src/dag/sequencer.rs

//! Dependency sequencing: resolve a run order and execute it fail-fast.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::dag::registry::TaskRegistry;
use crate::engine::TaskName;
use crate::errors::{AssetpipeError, Result};

/// Requests cancellation of an in-flight run.
#[derive(Debug, Clone)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn cancel(&self) {
        // No receiver left means the run already finished.
        let _ = self.0.send(true);
    }
}

/// Observed by [`Sequencer::run_cancellable`] between and during tasks.
#[derive(Debug, Clone)]
pub struct CancelSignal(watch::Receiver<bool>);

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self(rx)
    }

    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once cancellation is requested. Pends forever if the handle
    /// is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.0.borrow_and_update() {
                return;
            }
            if self.0.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Create a connected cancel handle / signal pair.
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(tx), CancelSignal(rx))
}

/// Runs named tasks and their prerequisites strictly one after another.
#[derive(Debug, Clone)]
pub struct Sequencer {
    registry: Arc<TaskRegistry>,
}

impl Sequencer {
    pub fn new(registry: Arc<TaskRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Resolve the execution order for `names`.
    ///
    /// For each requested name (in order) its prerequisites are visited
    /// depth-first, then the task itself. Every task appears at most once,
    /// even if several requested tasks share a prerequisite.
    pub fn plan<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<TaskName>> {
        let mut order = Vec::new();
        let mut done: HashSet<TaskName> = HashSet::new();
        let mut visiting: Vec<TaskName> = Vec::new();

        for name in names {
            self.visit(name.as_ref(), &mut visiting, &mut done, &mut order)?;
        }

        Ok(order)
    }

    fn visit(
        &self,
        name: &str,
        visiting: &mut Vec<TaskName>,
        done: &mut HashSet<TaskName>,
        order: &mut Vec<TaskName>,
    ) -> Result<()> {
        if done.contains(name) {
            return Ok(());
        }
        if visiting.iter().any(|v| v == name) {
            let mut chain = visiting.clone();
            chain.push(name.to_string());
            return Err(AssetpipeError::DagCycle(chain.join(" -> ")));
        }

        let task = self.registry.get(name)?;

        visiting.push(name.to_string());
        for dep in task.prerequisites() {
            self.visit(dep, visiting, done, order)?;
        }
        visiting.pop();

        done.insert(name.to_string());
        order.push(name.to_string());
        Ok(())
    }

    /// Run `names` (with prerequisites) to completion or first failure.
    pub async fn run<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        self.run_cancellable(names, CancelSignal::never()).await
    }

    /// Like [`Sequencer::run`], but aborts with [`AssetpipeError::Cancelled`]
    /// once `cancel` fires. The in-flight task future is dropped; tasks that
    /// already finished are not undone.
    pub async fn run_cancellable<S: AsRef<str>>(
        &self,
        names: &[S],
        mut cancel: CancelSignal,
    ) -> Result<()> {
        let plan = self.plan(names)?;
        info!(?plan, "resolved task sequence");

        for name in &plan {
            if cancel.is_cancelled() {
                warn!(task = %name, "run cancelled before task started");
                return Err(AssetpipeError::Cancelled);
            }

            let task = self.registry.get(name)?;
            let Some(action) = task.action() else {
                debug!(task = %name, "no action; prerequisites only");
                continue;
            };

            info!(task = %name, "starting task");
            let started = Instant::now();

            tokio::select! {
                res = action.run() => {
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    match res {
                        Ok(()) => info!(task = %name, elapsed_ms, "finished task"),
                        Err(err) => {
                            error!(task = %name, elapsed_ms, error = %err.detail(), "task failed; aborting sequence");
                            return Err(AssetpipeError::TaskFailed {
                                task: name.clone(),
                                message: err.detail(),
                            });
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    warn!(task = %name, "cancellation requested; abandoning task");
                    return Err(AssetpipeError::Cancelled);
                }
            }
        }

        Ok(())
    }
}

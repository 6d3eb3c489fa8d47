// src/engine/queue.rs

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::engine::TaskName;
use crate::types::TriggerWhileRunningBehaviour;

/// Queue of triggers that arrive while a run is already executing.
///
/// Semantics:
/// - Each queued entry is an ordered *batch* of task names to request
///   together in a future run.
/// - `max_runs` (`[watch].queue_length`) bounds how many batches are kept;
///   the default of 1 means "at most one follow-up run".
/// - When the runtime becomes idle it calls `drain_pending()`, which merges
///   all batches (first occurrence wins) into one request.
#[derive(Debug)]
pub struct TriggerQueue {
    behaviour: TriggerWhileRunningBehaviour,
    max_runs: usize,
    runs: VecDeque<Vec<TaskName>>,
}

impl TriggerQueue {
    /// `max_runs` is clamped to at least 1.
    pub fn new(behaviour: TriggerWhileRunningBehaviour, max_runs: usize) -> Self {
        let max_runs = max_runs.max(1);
        Self {
            behaviour,
            max_runs,
            runs: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn behaviour(&self) -> TriggerWhileRunningBehaviour {
        self.behaviour
    }

    /// Record tasks requested while a run is in progress.
    ///
    /// - `Queue`: merge into the last batch (or start one). If that would
    ///   exceed `max_runs`, the oldest batches are dropped.
    /// - `Cancel`: replace everything queued with this request. Cancelling
    ///   the active run is the caller's job.
    pub fn record_trigger(&mut self, tasks: &[TaskName]) {
        if tasks.is_empty() {
            return;
        }

        match self.behaviour {
            TriggerWhileRunningBehaviour::Queue => {
                if let Some(last_batch) = self.runs.back_mut() {
                    merge_into(last_batch, tasks);
                    debug!(?tasks, "merged trigger into last queued batch (queue mode)");
                } else {
                    self.runs.push_back(dedup(tasks));
                    debug!(?tasks, "created first queued batch (queue mode)");
                }

                if self.runs.len() > self.max_runs {
                    warn!(
                        current_batches = self.runs.len(),
                        max_runs = self.max_runs,
                        "exceeded queue_length; dropping oldest queued batches"
                    );
                    while self.runs.len() > self.max_runs {
                        self.runs.pop_front();
                    }
                }
            }
            TriggerWhileRunningBehaviour::Cancel => {
                debug!(?tasks, "resetting queued batches to this trigger only (cancel mode)");
                self.runs.clear();
                self.runs.push_back(dedup(tasks));
            }
        }
    }

    /// Put `tasks` in front of everything queued, as their own batch.
    ///
    /// Used to re-run a cancelled command-line request; the batch is not
    /// subject to `max_runs`.
    pub fn requeue_front(&mut self, tasks: &[TaskName]) {
        if tasks.is_empty() {
            return;
        }
        debug!(?tasks, "re-queued cancelled run ahead of pending triggers");
        self.runs.push_front(dedup(tasks));
    }

    /// Drain all queued batches into one ordered, de-duplicated request.
    pub fn drain_pending(&mut self) -> Vec<TaskName> {
        let mut merged: Vec<TaskName> = Vec::new();

        while let Some(batch) = self.runs.pop_front() {
            merge_into(&mut merged, &batch);
        }

        debug!(drained = merged.len(), "drained queued triggers into new run");
        merged
    }
}

fn merge_into(target: &mut Vec<TaskName>, tasks: &[TaskName]) {
    for task in tasks {
        if !target.contains(task) {
            target.push(task.clone());
        }
    }
}

fn dedup(tasks: &[TaskName]) -> Vec<TaskName> {
    let mut out = Vec::with_capacity(tasks.len());
    merge_into(&mut out, tasks);
    out
}

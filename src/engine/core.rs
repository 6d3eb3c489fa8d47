// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! The core consumes [`RuntimeEvent`]s and produces [`CoreCommand`]s for
//! the IO shell (`engine::runtime::Runtime`). It has no channels, no Tokio
//! types, and performs no IO, so it can be unit tested directly.
//!
//! [`CoreCommand`]: crate::engine::CoreCommand

use crate::engine::event_handlers::{
    handle_run_finished, handle_tasks_triggered, CoreState, CoreStep,
};
use crate::engine::queue::TriggerQueue;
use crate::engine::{RunOutcome, RuntimeEvent, RuntimeOptions};
use crate::types::TriggerWhileRunningBehaviour;

/// Pure core runtime state.
///
/// At most one run is active at any time; triggers that arrive meanwhile
/// are held in the trigger queue.
#[derive(Debug)]
pub struct CoreRuntime {
    state: CoreState,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(
        behaviour: TriggerWhileRunningBehaviour,
        queue_length: usize,
        options: RuntimeOptions,
    ) -> Self {
        let queue = TriggerQueue::new(behaviour, queue_length);
        Self {
            state: CoreState::new(queue),
            options,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state.active.is_none()
    }

    pub fn active_run_id(&self) -> Option<u64> {
        self.state.active.as_ref().map(|r| r.id)
    }

    pub fn queue_is_empty(&self) -> bool {
        self.state.queue.is_empty()
    }

    /// Failure of a manual run, if one happened.
    pub fn fatal_outcome(&self) -> Option<&RunOutcome> {
        self.state.fatal.as_ref()
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::TasksTriggered { tasks, reason } => {
                handle_tasks_triggered(&mut self.state, tasks, reason)
            }
            RuntimeEvent::RunFinished { run_id, outcome } => {
                handle_run_finished(&mut self.state, &self.options, run_id, outcome)
            }
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}

// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use tracing::{error, info, warn};

use crate::engine::queue::TriggerQueue;
use crate::engine::{RunOutcome, RuntimeOptions, TaskName, TriggerReason};
use crate::types::TriggerWhileRunningBehaviour;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start executing `tasks` (with prerequisites) as run `run_id`.
    StartRun { run_id: u64, tasks: Vec<TaskName> },
    /// Cancel the in-flight run `run_id`.
    CancelRun { run_id: u64 },
    /// Request that the process exits.
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub(crate) fn cont(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }

    pub(crate) fn exit(mut commands: Vec<CoreCommand>) -> Self {
        commands.push(CoreCommand::RequestExit);
        Self {
            commands,
            keep_running: false,
        }
    }
}

/// The run currently owned by the backend.
#[derive(Debug, Clone)]
pub struct ActiveRun {
    pub id: u64,
    pub reason: TriggerReason,
    pub tasks: Vec<TaskName>,
    pub cancel_requested: bool,
}

/// Mutable state shared by the handlers below.
#[derive(Debug)]
pub struct CoreState {
    pub active: Option<ActiveRun>,
    pub next_run_id: u64,
    pub queue: TriggerQueue,
    /// Reason attached to whatever is currently queued.
    pub queued_reason: TriggerReason,
    /// Set when a manual run fails; the shell turns it into an error.
    pub fatal: Option<RunOutcome>,
}

impl CoreState {
    pub fn new(queue: TriggerQueue) -> Self {
        Self {
            active: None,
            next_run_id: 1,
            queue,
            queued_reason: TriggerReason::FileWatch,
            fatal: None,
        }
    }

    fn start_run(&mut self, tasks: Vec<TaskName>, reason: TriggerReason) -> CoreCommand {
        let run_id = self.next_run_id;
        self.next_run_id += 1;
        self.active = Some(ActiveRun {
            id: run_id,
            reason,
            tasks: tasks.clone(),
            cancel_requested: false,
        });
        info!(run_id, %reason, ?tasks, "starting run");
        CoreCommand::StartRun { run_id, tasks }
    }
}

/// Handle a trigger event.
///
/// - Idle: start a run with this trigger plus anything already queued.
/// - Busy: record the trigger; in cancel mode also cancel the active run.
///   A cancelled manual run is queued again ahead of the trigger, so the
///   command-line tasks still run before the session settles into watching.
pub fn handle_tasks_triggered(
    state: &mut CoreState,
    tasks: Vec<TaskName>,
    reason: TriggerReason,
) -> CoreStep {
    if tasks.is_empty() {
        return CoreStep::cont(Vec::new());
    }

    let Some(active) = state.active.as_mut() else {
        let mut merged = state.queue.drain_pending();
        for task in tasks {
            if !merged.contains(&task) {
                merged.push(task);
            }
        }
        return CoreStep::cont(vec![state.start_run(merged, reason)]);
    };

    state.queue.record_trigger(&tasks);
    if reason == TriggerReason::Manual {
        state.queued_reason = TriggerReason::Manual;
    }

    let mut commands = Vec::new();
    if state.queue.behaviour() == TriggerWhileRunningBehaviour::Cancel {
        if active.reason == TriggerReason::Manual {
            state.queue.requeue_front(&active.tasks);
            state.queued_reason = TriggerReason::Manual;
        }
        if !active.cancel_requested {
            active.cancel_requested = true;
            warn!(run_id = active.id, "new trigger while running; cancelling active run");
            commands.push(CoreCommand::CancelRun { run_id: active.id });
        }
    }

    CoreStep::cont(commands)
}

/// Handle a finished run.
///
/// Stale completions (unknown `run_id`) are ignored. A failed manual run
/// is fatal; failures of watch-triggered runs are logged and the session
/// continues. Afterwards any queued triggers start the next run.
pub fn handle_run_finished(
    state: &mut CoreState,
    options: &RuntimeOptions,
    run_id: u64,
    outcome: RunOutcome,
) -> CoreStep {
    let Some(active) = state.active.as_ref() else {
        warn!(run_id, "run finished while no run was active; ignoring");
        return CoreStep::cont(Vec::new());
    };
    if active.id != run_id {
        warn!(run_id, active = active.id, "stale run completion; ignoring");
        return CoreStep::cont(Vec::new());
    }

    let reason = active.reason;
    state.active = None;

    match &outcome {
        RunOutcome::Success => info!(run_id, "run finished"),
        RunOutcome::Cancelled => info!(run_id, "run cancelled"),
        RunOutcome::Failed { task, message } => {
            if reason == TriggerReason::Manual {
                error!(run_id, ?task, %message, "run failed");
                state.fatal = Some(outcome.clone());
                return CoreStep::exit(Vec::new());
            }
            error!(run_id, ?task, %message, "run failed; still watching");
        }
    }

    if !state.queue.is_empty() {
        let tasks = state.queue.drain_pending();
        let queued_reason = std::mem::replace(&mut state.queued_reason, TriggerReason::FileWatch);
        return CoreStep::cont(vec![state.start_run(tasks, queued_reason)]);
    }

    if options.exit_when_idle {
        info!("idle with nothing queued; exiting");
        return CoreStep::exit(Vec::new());
    }

    CoreStep::cont(Vec::new())
}

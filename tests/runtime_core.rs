// tests/runtime_core.rs
//
// The core is pure: feed it events, inspect the commands it returns.

use assetpipe::engine::{
    CoreCommand, CoreRuntime, RunOutcome, RuntimeEvent, RuntimeOptions, TaskName, TriggerReason,
};
use assetpipe::types::TriggerWhileRunningBehaviour;

fn names(list: &[&str]) -> Vec<TaskName> {
    list.iter().map(|s| s.to_string()).collect()
}

fn triggered(tasks: &[&str], reason: TriggerReason) -> RuntimeEvent {
    RuntimeEvent::TasksTriggered {
        tasks: names(tasks),
        reason,
    }
}

fn finished(run_id: u64, outcome: RunOutcome) -> RuntimeEvent {
    RuntimeEvent::RunFinished { run_id, outcome }
}

fn watching(behaviour: TriggerWhileRunningBehaviour) -> CoreRuntime {
    CoreRuntime::new(behaviour, 1, RuntimeOptions { exit_when_idle: false })
}

#[test]
fn idle_trigger_starts_a_run() {
    let mut core = watching(TriggerWhileRunningBehaviour::Queue);

    let step = core.step(triggered(&["styleguide:watch"], TriggerReason::Manual));

    assert!(step.keep_running);
    assert_eq!(
        step.commands,
        vec![CoreCommand::StartRun {
            run_id: 1,
            tasks: names(&["styleguide:watch"]),
        }]
    );
    assert_eq!(core.active_run_id(), Some(1));
}

#[test]
fn empty_trigger_is_ignored() {
    let mut core = watching(TriggerWhileRunningBehaviour::Queue);

    let step = core.step(triggered(&[], TriggerReason::FileWatch));

    assert!(step.keep_running);
    assert!(step.commands.is_empty());
    assert!(core.is_idle());
}

#[test]
fn triggers_while_busy_are_queued_and_merged() {
    let mut core = watching(TriggerWhileRunningBehaviour::Queue);
    core.step(triggered(&["styleguide:watch"], TriggerReason::Manual));

    let step = core.step(triggered(&["styles", "styleguide"], TriggerReason::FileWatch));
    assert!(step.commands.is_empty());
    let step = core.step(triggered(&["prototype", "styles"], TriggerReason::FileWatch));
    assert!(step.commands.is_empty());
    assert!(!core.queue_is_empty());

    // The queued batch becomes the next run, deduplicated in arrival order.
    let step = core.step(finished(1, RunOutcome::Success));
    assert!(step.keep_running);
    assert_eq!(
        step.commands,
        vec![CoreCommand::StartRun {
            run_id: 2,
            tasks: names(&["styles", "styleguide", "prototype"]),
        }]
    );
    assert!(core.queue_is_empty());
}

#[test]
fn cancel_mode_cancels_active_run_once_and_keeps_latest_trigger() {
    let mut core = watching(TriggerWhileRunningBehaviour::Cancel);
    core.step(triggered(&["styles"], TriggerReason::FileWatch));

    let step = core.step(triggered(&["styles"], TriggerReason::FileWatch));
    assert_eq!(step.commands, vec![CoreCommand::CancelRun { run_id: 1 }]);

    let step = core.step(triggered(&["prototype"], TriggerReason::FileWatch));
    assert!(step.commands.is_empty());

    let step = core.step(finished(1, RunOutcome::Cancelled));
    assert_eq!(
        step.commands,
        vec![CoreCommand::StartRun {
            run_id: 2,
            tasks: names(&["prototype"]),
        }]
    );
}

#[test]
fn cancelled_command_line_run_is_run_again_before_the_trigger() {
    let mut core = watching(TriggerWhileRunningBehaviour::Cancel);
    core.step(triggered(&["styleguide:watch"], TriggerReason::Manual));

    let step = core.step(triggered(&["prototype"], TriggerReason::FileWatch));
    assert_eq!(step.commands, vec![CoreCommand::CancelRun { run_id: 1 }]);
    // A later trigger replaces the watch batch but keeps the manual one.
    core.step(triggered(&["styles"], TriggerReason::FileWatch));

    let step = core.step(finished(1, RunOutcome::Cancelled));
    assert_eq!(
        step.commands,
        vec![CoreCommand::StartRun {
            run_id: 2,
            tasks: names(&["styleguide:watch", "styles"]),
        }]
    );

    // The re-run keeps its manual reason, so its failure is still fatal.
    let outcome = RunOutcome::Failed {
        task: Some("clean".to_string()),
        message: "permission denied".to_string(),
    };
    let step = core.step(finished(2, outcome.clone()));
    assert!(!step.keep_running);
    assert_eq!(core.fatal_outcome(), Some(&outcome));
}

#[test]
fn stale_completion_is_ignored() {
    let mut core = watching(TriggerWhileRunningBehaviour::Queue);
    core.step(triggered(&["icons"], TriggerReason::FileWatch));

    let step = core.step(finished(42, RunOutcome::Success));

    assert!(step.keep_running);
    assert!(step.commands.is_empty());
    assert_eq!(core.active_run_id(), Some(1));
}

#[test]
fn completion_without_active_run_is_ignored() {
    let mut core = watching(TriggerWhileRunningBehaviour::Queue);

    let step = core.step(finished(1, RunOutcome::Success));

    assert!(step.keep_running);
    assert!(step.commands.is_empty());
}

#[test]
fn failed_manual_run_is_fatal() {
    let mut core = watching(TriggerWhileRunningBehaviour::Queue);
    core.step(triggered(&["build"], TriggerReason::Manual));
    // Queued work is abandoned once the manual run fails.
    core.step(triggered(&["styles"], TriggerReason::FileWatch));

    let outcome = RunOutcome::Failed {
        task: Some("styles".to_string()),
        message: "bad scss".to_string(),
    };
    let step = core.step(finished(1, outcome.clone()));

    assert!(!step.keep_running);
    assert_eq!(step.commands, vec![CoreCommand::RequestExit]);
    assert_eq!(core.fatal_outcome(), Some(&outcome));
}

#[test]
fn failed_watch_run_keeps_watching() {
    let mut core = watching(TriggerWhileRunningBehaviour::Queue);
    core.step(triggered(&["styles"], TriggerReason::FileWatch));

    let step = core.step(finished(
        1,
        RunOutcome::Failed {
            task: Some("styles".to_string()),
            message: "bad scss".to_string(),
        },
    ));

    assert!(step.keep_running);
    assert!(step.commands.is_empty());
    assert!(core.fatal_outcome().is_none());
    assert!(core.is_idle());

    let step = core.step(triggered(&["styles"], TriggerReason::FileWatch));
    assert_eq!(
        step.commands,
        vec![CoreCommand::StartRun {
            run_id: 2,
            tasks: names(&["styles"]),
        }]
    );
}

#[test]
fn one_shot_exits_when_idle() {
    let mut core = CoreRuntime::new(
        TriggerWhileRunningBehaviour::Queue,
        1,
        RuntimeOptions { exit_when_idle: true },
    );
    core.step(triggered(&["build"], TriggerReason::Manual));

    let step = core.step(finished(1, RunOutcome::Success));

    assert!(!step.keep_running);
    assert_eq!(step.commands, vec![CoreCommand::RequestExit]);
    assert!(core.fatal_outcome().is_none());
}

#[test]
fn shutdown_stops_the_loop() {
    let mut core = watching(TriggerWhileRunningBehaviour::Queue);
    core.step(triggered(&["styleguide:watch"], TriggerReason::Manual));

    let step = core.step(RuntimeEvent::ShutdownRequested);

    assert!(!step.keep_running);
    assert!(step.commands.is_empty());
    // The shell cancels whatever is still active.
    assert_eq!(core.active_run_id(), Some(1));
}

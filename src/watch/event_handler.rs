// src/watch/event_handler.rs

//! Turn a single filesystem change into a runtime trigger.

use std::path::Path;

use notify::EventKind;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::{RuntimeEvent, TaskName, TriggerReason};
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::WatchProfile;

/// Only creations, modifications and removals can trigger tasks.
pub fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// Tasks of every profile matching `rel_path`, in profile order, each once.
pub fn tasks_for_path(rel_path: &str, profiles: &[WatchProfile]) -> Vec<TaskName> {
    let mut tasks: Vec<TaskName> = Vec::new();
    for profile in profiles.iter().filter(|p| p.matches(rel_path)) {
        for task in profile.tasks() {
            if !tasks.contains(task) {
                tasks.push(task.clone());
            }
        }
    }
    tasks
}

/// Map a changed `path` to its tasks and send one `TasksTriggered` event.
///
/// Returns `false` once the runtime channel is closed, so the caller can
/// stop its loop.
pub async fn process_file_change(
    root: &Path,
    path: &Path,
    profiles: &[WatchProfile],
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) -> bool {
    let Some(rel_str) = relative_str(root, path) else {
        warn!(?path, ?root, "could not relativize path against root");
        return true;
    };

    let tasks = tasks_for_path(&rel_str, profiles);
    if tasks.is_empty() {
        return true;
    }

    debug!(path = %rel_str, ?tasks, "watch match -> triggering tasks");

    if let Err(err) = runtime_tx
        .send(RuntimeEvent::TasksTriggered {
            tasks,
            reason: TriggerReason::FileWatch,
        })
        .await
    {
        warn!("failed to send RuntimeEvent::TasksTriggered: {err}");
        return false;
    }
    true
}

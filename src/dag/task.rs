// src/dag/task.rs

//! Declarative task definitions.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::engine::TaskName;
use crate::errors::Result;
use crate::watch::WatchBinding;

/// Boxed future returned by a [`TaskAction`].
pub type TaskFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// The unit of deferred work behind a task.
///
/// Completion is reported through the returned future's `Result`; the
/// sequencer decides what happens on failure.
pub trait TaskAction: Send + Sync {
    fn run(&self) -> TaskFuture<'_>;
}

/// Adapter that turns an async closure into a [`TaskAction`].
pub struct FnAction<F>(F);

impl<F, Fut> TaskAction for FnAction<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    fn run(&self) -> TaskFuture<'_> {
        Box::pin((self.0)())
    }
}

/// Wrap a closure returning a future as a shareable action.
pub fn action_fn<F, Fut>(f: F) -> Arc<dyn TaskAction>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(FnAction(f))
}

/// A registered task: name, prerequisites, optional action and any watch
/// bindings that become active once the task has run.
///
/// Built once with the `with_*` methods and never mutated after
/// registration.
#[derive(Clone)]
pub struct TaskDef {
    name: TaskName,
    description: String,
    prerequisites: Vec<TaskName>,
    action: Option<Arc<dyn TaskAction>>,
    watch: Vec<WatchBinding>,
    long_lived: bool,
}

impl fmt::Debug for TaskDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskDef")
            .field("name", &self.name)
            .field("prerequisites", &self.prerequisites)
            .field("has_action", &self.action.is_some())
            .field("watch", &self.watch)
            .field("long_lived", &self.long_lived)
            .finish()
    }
}

impl TaskDef {
    pub fn new(name: impl Into<TaskName>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            prerequisites: Vec::new(),
            action: None,
            watch: Vec::new(),
            long_lived: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append prerequisites; they run (in this order) before the task.
    pub fn with_prerequisites<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskName>,
    {
        self.prerequisites.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_action(mut self, action: Arc<dyn TaskAction>) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_watch(mut self, binding: WatchBinding) -> Self {
        self.watch.push(binding);
        self
    }

    /// Mark the task as starting something that outlives its action (e.g. a
    /// server), so the process must stay up after the run.
    pub fn long_lived(mut self) -> Self {
        self.long_lived = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn prerequisites(&self) -> &[TaskName] {
        &self.prerequisites
    }

    pub fn action(&self) -> Option<&Arc<dyn TaskAction>> {
        self.action.as_ref()
    }

    pub fn watch_bindings(&self) -> &[WatchBinding] {
        &self.watch
    }

    pub fn is_long_lived(&self) -> bool {
        self.long_lived
    }
}

// src/dag/mod.rs

//! Task definitions, registry and sequencing.
//!
//! - [`task`] holds the declarative `TaskDef` record and the `TaskAction`
//!   trait for deferred work.
//! - [`registry`] stores tasks by unique name and validates the
//!   prerequisite graph.
//! - [`sequencer`] resolves a depth-first run order and executes it
//!   fail-fast, with explicit cancellation.

pub mod registry;
pub mod sequencer;
pub mod task;

pub use registry::TaskRegistry;
pub use sequencer::{cancel_pair, CancelHandle, CancelSignal, Sequencer};
pub use task::{action_fn, TaskAction, TaskDef, TaskFuture};

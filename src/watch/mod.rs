// src/watch/mod.rs

//! File watching.
//!
//! This module is responsible for:
//! - Compiling watch binding patterns (with `!` exclusions).
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//!
//! It does **not** know about task dependencies; it only turns filesystem
//! changes into task-level triggers.

pub mod event_handler;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use patterns::{build_globset, split_patterns, WatchBinding, WatchProfile};
pub use watcher::{spawn_watcher, WatcherHandle};

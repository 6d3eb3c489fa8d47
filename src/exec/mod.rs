// src/exec/mod.rs

//! Execution layer.
//!
//! - [`backend`] provides the `RunBackend` trait and the production
//!   `RealRunBackend`, which runs task sequences on Tokio tasks.
//! - [`command`] spawns external tools with `tokio::process` and streams
//!   their output to the log.

pub mod backend;
pub mod command;

pub use backend::{RealRunBackend, RunBackend};
pub use command::ExternalCommand;

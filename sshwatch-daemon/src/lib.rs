//! sshwatch daemon library.
//!
//! This library exposes internal modules for integration testing.
//! In production, `sshwatch-daemon` is used as a binary (main.rs).

pub mod cli;
pub mod io;
pub mod logging;
pub mod metrics_server;
pub mod orchestrator;

pub use io::{JsonLineSink, JsonLineTaskSource};
pub use orchestrator::{Orchestrator, ShutdownCause};

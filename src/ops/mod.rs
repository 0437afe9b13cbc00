//! High-level operations.
//!
//! This module contains the implementation of include-maven commands.

pub mod include;
pub mod run;

pub use include::{include_maven_builds, load_workspace, Inclusion, Workspace};
pub use run::{run_tasks, RunOptions, RunResult};

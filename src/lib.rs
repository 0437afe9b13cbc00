//! include-maven - Include multi-module Maven builds in a native build model
//!
//! Every module of an included Maven build becomes a project of the host's
//! [`BuildModel`](native::BuildModel): its dependencies land in named
//! configuration buckets, its artifacts are published as outgoing variants
//! and a task runs the Maven goals for that module alone.

pub mod core;
pub mod engine;
pub mod include;
pub mod native;
pub mod ops;
pub mod util;

/// Test utilities for include-maven unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides a scripted engine and module fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{Coordinate, Dependency, ForeignArtifact, ForeignModule, GroupArtifact, ModuleIndex};
pub use engine::{ForeignEngine, PomEngine};
pub use include::{GraphDiscoverer, IncludedBuild, IncludedBuildConfig, ProjectConfigurer};
pub use native::BuildModel;

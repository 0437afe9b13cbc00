//! Core data structures.
//!
//! This module contains the immutable foreign-side model:
//! - Coordinates (`group:artifact[:version]`)
//! - Dependencies with scopes and exclusions
//! - Artifacts and their handlers
//! - Module snapshots and the reactor index

pub mod artifact;
pub mod coordinate;
pub mod dependency;
pub mod index;
pub mod module;

pub use artifact::{ArtifactHandler, ArtifactKind, ForeignArtifact};
pub use coordinate::{Coordinate, GroupArtifact};
pub use dependency::{Dependency, Exclusion, Scope, UnknownScope};
pub use index::{DuplicateProjectError, ModuleIndex};
pub use module::{BuildLayout, ForeignModule, Plugin};

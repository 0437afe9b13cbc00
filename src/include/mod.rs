//! Inclusion of foreign multi-module builds into the native model.
//!
//! Including a build happens in three phases:
//!
//! 1. [`GraphDiscoverer`] builds the reactor once through the engine and
//!    freezes it in a [`ModuleIndex`](crate::core::ModuleIndex).
//! 2. Every module is registered as a native project at the path chosen by
//!    its build's [`IdentityMapper`]; the resulting [`IdentityMap`] is frozen.
//! 3. [`ProjectConfigurer`] turns each registered project into the native
//!    rendition of its module: dependency buckets ([`DependencyTranslator`]),
//!    outgoing variants ([`ArtifactPublisher`]) and tasks ([`tasks`]).

pub mod attributes;
pub mod build;
pub mod config;
pub mod configurer;
pub mod discover;
pub mod error;
pub mod identity;
pub mod publish;
pub mod tasks;
pub mod translate;

pub use build::IncludedBuild;
pub use config::{HostSettings, IncludedBuildConfig};
pub use configurer::ProjectConfigurer;
pub use discover::GraphDiscoverer;
pub use error::{ConfigureError, DiscoveryError, ExecutionError};
pub use identity::{IdentityMap, IdentityMapper};
pub use publish::ArtifactPublisher;
pub use translate::{Declaration, DependencyTranslator};

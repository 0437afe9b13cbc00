//! The foreign build engine.
//!
//! The translation core only talks to the engine through [`ForeignEngine`]:
//! model building for the root and for the whole reactor, dependency graph
//! construction, scoped component lookup and single-module goal execution.
//! [`PomEngine`] is the implementation that reads `pom.xml` descriptors and
//! runs goals through the `mvn` executable.

pub mod interpolate;
pub mod pom;
pub mod pom_engine;
pub mod session;
pub mod workspace;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::{Coordinate, ForeignModule};

pub use pom_engine::PomEngine;
pub use session::{RepositorySession, ScopedSession, Session, SessionScope};
pub use workspace::{
    ChainedWorkspaceReader, ComponentRegistry, LookupError, ReactorReader, WorkspaceReader,
};

/// Errors raised by the engine while building models or running goals.
#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    #[error("failed to read {}", path.display())]
    #[diagnostic(code(include_maven::engine::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    #[diagnostic(
        code(include_maven::engine::parse),
        help("check that the descriptor is well-formed XML")
    )]
    Parse { path: PathBuf, message: String },

    #[error("non-resolvable parent {parent} of {}", child.display())]
    #[diagnostic(
        code(include_maven::engine::missing_parent),
        help("set <relativePath> or install the parent into the local repository")
    )]
    MissingParent { parent: String, child: PathBuf },

    #[error("child module {} of {} does not exist", module.display(), parent.display())]
    #[diagnostic(code(include_maven::engine::missing_module))]
    MissingModule { module: PathBuf, parent: PathBuf },

    #[error("'{field}' is missing in {}", path.display())]
    #[diagnostic(code(include_maven::engine::missing_field))]
    MissingField { field: &'static str, path: PathBuf },

    #[error("goals {goals:?} failed for {module}: {message}")]
    #[diagnostic(code(include_maven::engine::goal_failed))]
    GoalFailed {
        module: String,
        goals: Vec<String>,
        message: String,
    },

    #[error("executable `{0}` not found in PATH")]
    #[diagnostic(
        code(include_maven::engine::executable_not_found),
        help("install Maven or add a Maven wrapper (mvnw) to the build's root directory")
    )]
    ExecutableNotFound(String),

    #[error("{0}")]
    Other(String),
}

/// Verbosity of the foreign engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum EngineLogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
    Disabled,
}

impl EngineLogLevel {
    /// Derive the engine verbosity from the host's verbosity.
    pub fn from_host(level: Option<tracing::Level>) -> Self {
        match level {
            Some(tracing::Level::TRACE) | Some(tracing::Level::DEBUG) => EngineLogLevel::Debug,
            Some(tracing::Level::INFO) => EngineLogLevel::Info,
            Some(tracing::Level::WARN) => EngineLogLevel::Warn,
            Some(tracing::Level::ERROR) => EngineLogLevel::Fatal,
            None => EngineLogLevel::Disabled,
        }
    }

    /// Parse the names accepted in configuration files.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Some(EngineLogLevel::Debug),
            "info" => Some(EngineLogLevel::Info),
            "warn" | "warning" => Some(EngineLogLevel::Warn),
            "error" => Some(EngineLogLevel::Error),
            "fatal" => Some(EngineLogLevel::Fatal),
            "disabled" | "off" => Some(EngineLogLevel::Disabled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineLogLevel::Debug => "debug",
            EngineLogLevel::Info => "info",
            EngineLogLevel::Warn => "warn",
            EngineLogLevel::Error => "error",
            EngineLogLevel::Fatal => "fatal",
            EngineLogLevel::Disabled => "disabled",
        }
    }
}

impl fmt::Display for EngineLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the engine needs to build models or run goals.
#[derive(Debug, Clone, Default)]
pub struct ExecutionRequest {
    pub pom: PathBuf,
    pub base_directory: PathBuf,
    pub goals: Vec<String>,
    pub recursive: bool,
    pub show_errors: bool,
    /// `group:artifact` keys of the modules to execute
    pub selected_projects: Vec<String>,
    pub active_profiles: Vec<String>,
    pub inactive_profiles: Vec<String>,
    pub user_properties: BTreeMap<String, String>,
    pub system_properties: BTreeMap<String, String>,
    pub local_repository: PathBuf,
    pub offline: bool,
    pub log_level: EngineLogLevel,
}

/// Severity of a problem reported while building the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemSeverity {
    Warning,
    Error,
    Fatal,
}

/// A problem reported by the graph builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelProblem {
    pub severity: ProblemSeverity,
    pub message: String,
}

impl ModelProblem {
    pub fn warning(message: impl Into<String>) -> Self {
        ModelProblem {
            severity: ProblemSeverity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ModelProblem {
            severity: ProblemSeverity::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity != ProblemSeverity::Warning
    }
}

impl fmt::Display for ModelProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            ProblemSeverity::Warning => "WARNING",
            ProblemSeverity::Error => "ERROR",
            ProblemSeverity::Fatal => "FATAL",
        };
        write!(f, "[{}] {}", label, self.message)
    }
}

/// Reactor modules in build order plus their in-reactor upstream edges.
#[derive(Debug, Clone, Default)]
pub struct ProjectDependencyGraph {
    sorted: Vec<Arc<ForeignModule>>,
    upstream: BTreeMap<Coordinate, Vec<Coordinate>>,
}

impl ProjectDependencyGraph {
    pub fn new(
        sorted: Vec<Arc<ForeignModule>>,
        upstream: BTreeMap<Coordinate, Vec<Coordinate>>,
    ) -> Self {
        ProjectDependencyGraph { sorted, upstream }
    }

    /// Modules ordered so that every module follows its upstream modules.
    pub fn sorted_projects(&self) -> &[Arc<ForeignModule>] {
        &self.sorted
    }

    /// Direct in-reactor upstream modules of `coordinate`.
    pub fn upstream_projects(&self, coordinate: &Coordinate) -> &[Coordinate] {
        self.upstream
            .get(coordinate)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Output of the graph builder.
#[derive(Debug, Default)]
pub struct GraphResult {
    pub problems: Vec<ModelProblem>,
    pub graph: Option<ProjectDependencyGraph>,
}

impl GraphResult {
    pub fn has_errors(&self) -> bool {
        self.problems.iter().any(ModelProblem::is_error)
    }
}

/// Exceptions collected while executing goals. Empty means success.
#[derive(Debug, Default)]
pub struct ExecutionResult {
    pub exceptions: Vec<EngineError>,
}

/// The foreign build engine as seen by the translation core.
///
/// One engine instance belongs to one included build and is never shared
/// between included builds.
pub trait ForeignEngine: Send + Sync {
    /// Create the repository session for `request`.
    fn new_repository_session(&self, request: &ExecutionRequest) -> RepositorySession;

    /// Build the model of the single module described by `pom`.
    fn build_module(
        &self,
        pom: &Path,
        request: &ExecutionRequest,
        repository: &RepositorySession,
    ) -> Result<ForeignModule, EngineError>;

    /// Build the models of `pom` and, if `recursive`, of all its modules in
    /// one pass.
    fn build_reactor(
        &self,
        pom: &Path,
        recursive: bool,
        request: &ExecutionRequest,
        repository: &RepositorySession,
    ) -> Result<Vec<ForeignModule>, EngineError>;

    /// Compute the dependency graph of the session's projects.
    fn build_dependency_graph(&self, session: &Session) -> GraphResult;

    /// Run the request's goals against the session's selected projects.
    fn execute_goals(&self, session: &ScopedSession<'_>) -> ExecutionResult;

    /// Component lookup.
    fn components(&self) -> &ComponentRegistry;

    /// Scope entered around every execution.
    fn session_scope(&self) -> &SessionScope;
}

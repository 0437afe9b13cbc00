//! Errors of the three phases of including a build.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::DuplicateProjectError;
use crate::engine::EngineError;
use crate::native::ModelError;

/// Fatal for the whole included build. Raised before any project of the
/// build is registered.
#[derive(Debug, Error, Diagnostic)]
pub enum DiscoveryError {
    #[error("failed to build the model of included Maven build '{build}'")]
    #[diagnostic(code(include_maven::discovery::model))]
    Model {
        build: String,
        #[source]
        #[diagnostic_source]
        source: EngineError,
    },

    #[error("Could not create local repository at {}", path.display())]
    #[diagnostic(
        code(include_maven::discovery::local_repository),
        help("set `local-repository` to a writable directory")
    )]
    LocalRepository {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("dependency graph of included Maven build '{build}' is invalid: {problem}")]
    #[diagnostic(code(include_maven::discovery::graph))]
    Graph { build: String, problem: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    DuplicateProject(#[from] DuplicateProjectError),

    #[error("failed to register the projects of included Maven build '{build}'")]
    #[diagnostic(code(include_maven::discovery::registration))]
    Registration {
        build: String,
        #[source]
        #[diagnostic_source]
        source: ModelError,
    },
}

/// Fatal for the configuration of a single module.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigureError {
    #[error("Unknown scope {scope} in dependency {dependency} in Maven project {module}")]
    #[diagnostic(
        code(include_maven::configure::unknown_scope),
        help("supported scopes are compile, runtime, provided and test")
    )]
    UnknownScope {
        scope: String,
        dependency: String,
        module: String,
    },

    #[error("failed to configure Maven project {module}")]
    #[diagnostic(code(include_maven::configure::model))]
    Model {
        module: String,
        #[source]
        #[diagnostic_source]
        source: ModelError,
    },
}

/// Fatal for one module build task.
///
/// Carries the first failure of the nested build, every further failure is
/// attached as suppressed.
#[derive(Debug, Error, Diagnostic)]
pub enum ExecutionError {
    #[error("Maven build of {module} failed{}", suppressed_note(.suppressed))]
    #[diagnostic(code(include_maven::execution::build_failure))]
    BuildFailure {
        module: String,
        #[source]
        cause: EngineError,
        #[related]
        suppressed: Vec<EngineError>,
    },
}

fn suppressed_note(suppressed: &[EngineError]) -> String {
    match suppressed.len() {
        0 => String::new(),
        n => format!(" ({} further failure(s) suppressed)", n),
    }
}

impl ExecutionError {
    /// Errors attached behind the first one.
    pub fn suppressed(&self) -> &[EngineError] {
        match self {
            ExecutionError::BuildFailure { suppressed, .. } => suppressed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_failure_message() {
        let err = ExecutionError::BuildFailure {
            module: "org.example:core".to_string(),
            cause: EngineError::Other("compilation failure".to_string()),
            suppressed: vec![EngineError::Other("test failure".to_string())],
        };
        assert_eq!(
            err.to_string(),
            "Maven build of org.example:core failed (1 further failure(s) suppressed)"
        );
        assert_eq!(err.suppressed().len(), 1);
        assert_eq!(
            std::error::Error::source(&err).map(|e| e.to_string()),
            Some("compilation failure".to_string())
        );
    }

    #[test]
    fn test_unknown_scope_names_module() {
        let err = ConfigureError::UnknownScope {
            scope: "system".to_string(),
            dependency: "com.sun:tools:1.8".to_string(),
            module: "org.example:core:1.0".to_string(),
        };
        assert!(err.to_string().contains("org.example:core:1.0"));
        assert!(err.to_string().contains("system"));
    }
}

//! User-friendly diagnostic messages.
//!
//! Every error reaching the user names its root cause and, where one is
//! known, how to fix it.

use std::fmt;
use std::path::PathBuf;

use crate::engine::EngineError;
use crate::include::{ConfigureError, DiscoveryError, ExecutionError};
use crate::native::ModelError;

/// Common suggestion messages.
pub mod suggestions {
    pub const NO_CONFIG: &str =
        "Create include-maven.toml with a [[build]] table naming the Maven build";

    pub const LIST_PROJECTS: &str = "Run `include-maven projects` to see every included project";

    pub const LIST_TASKS: &str = "Run `include-maven tasks <project>` to see its tasks";

    pub const BUILD_FAILED: &str = "Run `include-maven build --verbose` for more details";

    pub const UNIQUE_COORDINATES: &str =
        "Make <groupId>:<artifactId>:<version> unique for every module";

    pub const PROJECT_PATH: &str =
        "Set `project-path` (e.g. \":{build}:{groupId}.{artifactId}\") to keep paths distinct";
}

/// An error message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    /// Causes, outermost first
    pub context: Vec<String>,
    pub suggestions: Vec<String>,
    /// Related file
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Describe `error` and its causes, with suggestions for the errors
    /// this crate knows how to fix.
    pub fn from_error(error: &anyhow::Error) -> Self {
        let mut diag = Diagnostic::error(error.to_string());
        for cause in error.chain().skip(1) {
            diag = diag.with_context(cause.to_string());
        }

        for cause in error.chain() {
            if let Some(e) = cause.downcast_ref::<DiscoveryError>() {
                diag = match e {
                    DiscoveryError::DuplicateProject(dup) => {
                        let mut d = diag.with_suggestion(suggestions::UNIQUE_COORDINATES);
                        if let Some(file) = dup.collisions.values().flatten().next() {
                            d = d.with_location(file.clone());
                        }
                        d
                    }
                    DiscoveryError::LocalRepository { path, .. } => diag.with_location(path.clone()),
                    DiscoveryError::Registration { .. } => {
                        diag.with_suggestion(suggestions::PROJECT_PATH)
                    }
                    _ => diag,
                };
            } else if let Some(e) = cause.downcast_ref::<EngineError>() {
                diag = match e {
                    EngineError::Parse { path, .. } | EngineError::Io { path, .. } => {
                        diag.with_location(path.clone())
                    }
                    _ => diag,
                };
            } else if let Some(e) = cause.downcast_ref::<ModelError>() {
                diag = match e {
                    ModelError::UnknownProject(_) => diag.with_suggestion(suggestions::LIST_PROJECTS),
                    ModelError::UnknownTask(_) => diag.with_suggestion(suggestions::LIST_TASKS),
                    ModelError::DuplicateProject(_) => diag.with_suggestion(suggestions::PROJECT_PATH),
                    _ => diag,
                };
            } else if cause.downcast_ref::<ExecutionError>().is_some() {
                diag = diag.with_suggestion(suggestions::BUILD_FAILED);
            } else if let Some(ConfigureError::UnknownScope { .. }) =
                cause.downcast_ref::<ConfigureError>()
            {
                diag = diag
                    .with_suggestion("Change the scope to one of compile, runtime, provided or test");
            }
        }
        diag
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let label = if color { "\x1b[1;31merror\x1b[0m" } else { "error" };

        let mut output = format!("{}: {}\n", label, self.message);
        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }
        for ctx in &self.context {
            output.push_str(&format!("  caused by: {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help = if color { "\x1b[1;32mhelp\x1b[0m" } else { "help" };
            output.push_str(&format!("{}: consider:\n", help));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }
        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

//! The native build model.
//!
//! Projects with named configuration buckets, dependency declarations,
//! outgoing variants and tasks, plus the resolver and scheduler that turn
//! requested tasks into an ordered, parallel execution. Included builds
//! are translated into this model.

pub mod attributes;
pub mod configuration;
pub mod graph;
pub mod plugins;
pub mod project;
pub mod scheduler;
pub mod task;

use miette::Diagnostic;
use thiserror::Error;

pub use attributes::{AttributeValue, Attributes};
pub use configuration::{
    Capability, Configuration, DependencyDecl, DependencyTarget, ExcludeRule, ModuleNotation,
    OutgoingArtifact,
};
pub use graph::TaskGraph;
pub use plugins::SourceSet;
pub use project::{BuildModel, Project, ProjectPath, TaskPath};
pub use scheduler::{BuildOutcome, Scheduler, TaskEvent, TaskFailure, TaskState};
pub use task::{Task, TaskAction, TaskDependency};

/// Errors raised while building or querying the native model.
#[derive(Debug, Error, Diagnostic)]
pub enum ModelError {
    #[error("project '{0}' not found")]
    #[diagnostic(
        code(include_maven::model::unknown_project),
        help("run `include-maven projects` to list the available project paths")
    )]
    UnknownProject(ProjectPath),

    #[error("task '{0}' not found")]
    #[diagnostic(
        code(include_maven::model::unknown_task),
        help("run `include-maven tasks <project>` to list the tasks of a project")
    )]
    UnknownTask(String),

    #[error("configuration '{configuration}' not found in project '{project}'")]
    #[diagnostic(code(include_maven::model::unknown_configuration))]
    UnknownConfiguration {
        project: ProjectPath,
        configuration: String,
    },

    #[error("project '{0}' is already included")]
    #[diagnostic(
        code(include_maven::model::duplicate_project),
        help("customize the project path transform so every module maps to its own path")
    )]
    DuplicateProject(ProjectPath),

    #[error("task '{task}' is already registered in project '{project}'")]
    #[diagnostic(code(include_maven::model::duplicate_task))]
    DuplicateTask { project: ProjectPath, task: String },

    #[error("circular task dependency: {}", .0.join(" -> "))]
    #[diagnostic(code(include_maven::model::task_cycle))]
    TaskCycle(Vec<String>),

    #[error("invalid path '{0}'")]
    #[diagnostic(
        code(include_maven::model::invalid_path),
        help("paths are absolute and colon separated, e.g. `:build:module`")
    )]
    InvalidPath(String),

    #[error("failed to start the task worker pool")]
    #[diagnostic(code(include_maven::model::scheduler))]
    Scheduler(#[from] rayon::ThreadPoolBuildError),
}

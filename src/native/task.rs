//! Tasks and their declared dependencies.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::native::project::TaskPath;

/// Work performed when a task runs.
pub trait TaskAction: Send + Sync + fmt::Debug {
    fn execute(&self, task: &TaskPath) -> anyhow::Result<()>;
}

/// A declared dependency of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TaskDependency {
    /// A specific task.
    Task { path: TaskPath },
    /// The task named `task` in projects related through the project
    /// dependencies of `configuration`.
    ///
    /// With `use_depended_on` the related projects are the ones this project
    /// depends on; otherwise they are the projects depending on this one
    /// through their own bucket of the same name.
    FromProjectDependencies {
        configuration: String,
        use_depended_on: bool,
        task: String,
    },
}

impl TaskDependency {
    pub fn task(path: TaskPath) -> Self {
        TaskDependency::Task { path }
    }
}

/// A unit of work in a project.
#[derive(Clone, Serialize)]
pub struct Task {
    pub name: String,
    pub group: Option<String>,
    pub description: Option<String>,
    pub depends_on: Vec<TaskDependency>,
    /// Files whose change makes the task out of date
    pub inputs: Vec<PathBuf>,
    pub outputs: Vec<PathBuf>,
    #[serde(skip)]
    pub action: Option<Arc<dyn TaskAction>>,
}

impl Task {
    /// A lifecycle task without action.
    pub fn new(name: impl Into<String>) -> Self {
        Task {
            name: name.into(),
            group: None,
            description: None,
            depends_on: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            action: None,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_action(mut self, action: Arc<dyn TaskAction>) -> Self {
        self.action = Some(action);
        self
    }

    pub fn depends_on(&mut self, dependency: TaskDependency) -> &mut Self {
        if !self.depends_on.contains(&dependency) {
            self.depends_on.push(dependency);
        }
        self
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("depends_on", &self.depends_on)
            .field("has_action", &self.action.is_some())
            .finish()
    }
}

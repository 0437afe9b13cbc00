//! Projects of the native build model and their paths.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::native::configuration::{Configuration, DependencyDecl};
use crate::native::task::Task;
use crate::native::ModelError;

/// Colon separated project path, `:` being the root project.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectPath(String);

impl ProjectPath {
    pub const SEPARATOR: char = ':';

    pub fn root() -> Self {
        ProjectPath(":".to_string())
    }

    /// Parse an absolute path such as `:build:module`.
    pub fn parse(path: &str) -> Result<Self, ModelError> {
        if path == ":" {
            return Ok(ProjectPath::root());
        }
        let rest = path
            .strip_prefix(Self::SEPARATOR)
            .ok_or_else(|| ModelError::InvalidPath(path.to_string()))?;
        if rest.split(Self::SEPARATOR).any(str::is_empty) {
            return Err(ModelError::InvalidPath(path.to_string()));
        }
        Ok(ProjectPath(path.to_string()))
    }

    pub fn is_root(&self) -> bool {
        self.0 == ":"
    }

    /// Path of the direct child `name`.
    pub fn child(&self, name: &str) -> Self {
        if self.is_root() {
            ProjectPath(format!(":{}", name))
        } else {
            ProjectPath(format!("{}:{}", self.0, name))
        }
    }

    pub fn parent(&self) -> Option<ProjectPath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind(Self::SEPARATOR) {
            Some(0) => Some(ProjectPath::root()),
            Some(idx) => Some(ProjectPath(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Last segment, empty for the root.
    pub fn name(&self) -> &str {
        self.0
            .rsplit(Self::SEPARATOR)
            .next()
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A task of a project, rendered as `:project:task`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskPath {
    pub project: ProjectPath,
    pub task: String,
}

impl TaskPath {
    pub fn new(project: ProjectPath, task: impl Into<String>) -> Self {
        TaskPath {
            project,
            task: task.into(),
        }
    }

    /// Parse `:project:task`; `:task` names a task of the root project.
    pub fn parse(path: &str) -> Result<Self, ModelError> {
        let (project, task) = path
            .rsplit_once(ProjectPath::SEPARATOR)
            .ok_or_else(|| ModelError::InvalidPath(path.to_string()))?;
        if task.is_empty() {
            return Err(ModelError::InvalidPath(path.to_string()));
        }
        let project = if project.is_empty() {
            ProjectPath::root()
        } else {
            ProjectPath::parse(project)?
        };
        Ok(TaskPath::new(project, task))
    }
}

impl fmt::Display for TaskPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.project.is_root() {
            write!(f, ":{}", self.task)
        } else {
            write!(f, "{}:{}", self.project, self.task)
        }
    }
}

/// A native project.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub path: ProjectPath,
    pub dir: PathBuf,
    pub name: String,
    pub group: Option<String>,
    pub version: Option<String>,
    pub build_file_name: Option<String>,
    pub plugins: BTreeSet<String>,
    pub repositories: Vec<String>,
    pub configurations: BTreeMap<String, Configuration>,
    pub tasks: BTreeMap<String, Task>,
    /// Attribute names known to this project
    pub attribute_schema: BTreeSet<String>,
    /// Created only as the ancestor of an included project
    #[serde(skip)]
    implicit: bool,
}

impl Project {
    pub fn new(path: ProjectPath, dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Project {
            path,
            dir: dir.into(),
            name: name.into(),
            group: None,
            version: None,
            build_file_name: None,
            plugins: BTreeSet::new(),
            repositories: Vec::new(),
            configurations: BTreeMap::new(),
            tasks: BTreeMap::new(),
            attribute_schema: BTreeSet::new(),
            implicit: false,
        }
    }

    pub fn has_plugin(&self, id: &str) -> bool {
        self.plugins.contains(id)
    }

    /// Record `id` as applied. Returns `false` if it already was.
    pub fn apply_plugin(&mut self, id: &str) -> bool {
        self.plugins.insert(id.to_string())
    }

    pub fn configuration(&self, name: &str) -> Option<&Configuration> {
        self.configurations.get(name)
    }

    pub fn configuration_mut(&mut self, name: &str) -> Result<&mut Configuration, ModelError> {
        let path = &self.path;
        self.configurations
            .get_mut(name)
            .ok_or_else(|| ModelError::UnknownConfiguration {
                project: path.clone(),
                configuration: name.to_string(),
            })
    }

    /// The bucket `name`, created with default roles if missing.
    pub fn maybe_create_configuration(&mut self, name: &str) -> &mut Configuration {
        self.configurations
            .entry(name.to_string())
            .or_insert_with(|| Configuration::new(name))
    }

    /// Insert `configuration` unless one of that name exists already.
    pub fn add_configuration(&mut self, configuration: Configuration) -> &mut Configuration {
        self.configurations
            .entry(configuration.name.clone())
            .or_insert(configuration)
    }

    /// `name` followed by every bucket it extends, transitively, breadth
    /// first. Unknown names are skipped.
    pub fn extends_closure(&self, name: &str) -> Vec<&Configuration> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([name]);
        let mut closure = Vec::new();

        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            if let Some(configuration) = self.configurations.get(current) {
                closure.push(configuration);
                queue.extend(configuration.extends_from.iter().map(String::as_str));
            }
        }
        closure
    }

    /// Every dependency declared in `name` or a bucket it extends.
    pub fn all_dependencies(&self, name: &str) -> Vec<&DependencyDecl> {
        self.extends_closure(name)
            .into_iter()
            .flat_map(|c| c.dependencies.iter())
            .collect()
    }

    /// Register a task. Names are unique per project.
    pub fn register_task(&mut self, task: Task) -> Result<&mut Task, ModelError> {
        if self.tasks.contains_key(&task.name) {
            return Err(ModelError::DuplicateTask {
                project: self.path.clone(),
                task: task.name,
            });
        }
        let name = task.name.clone();
        Ok(self.tasks.entry(name).or_insert(task))
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    pub fn task_mut(&mut self, name: &str) -> Result<&mut Task, ModelError> {
        let path = &self.path;
        self.tasks
            .get_mut(name)
            .ok_or_else(|| ModelError::UnknownTask(TaskPath::new(path.clone(), name).to_string()))
    }
}

/// All projects of a native build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildModel {
    projects: BTreeMap<ProjectPath, Project>,
}

impl BuildModel {
    /// A model containing only the root project.
    pub fn new(root_dir: impl Into<PathBuf>, root_name: impl Into<String>) -> Self {
        let root = Project::new(ProjectPath::root(), root_dir, root_name);
        BuildModel {
            projects: BTreeMap::from([(ProjectPath::root(), root)]),
        }
    }

    pub fn root(&self) -> &Project {
        &self.projects[&ProjectPath::root()]
    }

    /// Include the project `path`. Missing ancestors are created on the way,
    /// located next to `dir`.
    pub fn include(
        &mut self,
        path: ProjectPath,
        dir: &Path,
        name: impl Into<String>,
    ) -> Result<&mut Project, ModelError> {
        let mut ancestor = path.parent();
        while let Some(current) = ancestor {
            if !self.projects.contains_key(&current) {
                let ancestor_dir = dir.parent().unwrap_or(dir).to_path_buf();
                let mut project = Project::new(current.clone(), ancestor_dir, current.name());
                project.implicit = true;
                self.projects.insert(current.clone(), project);
            }
            ancestor = current.parent();
        }

        let name = name.into();
        match self.projects.get(&path) {
            Some(existing) if !existing.implicit => {
                return Err(ModelError::DuplicateProject(path));
            }
            _ => {}
        }
        let project = Project::new(path.clone(), dir, name);
        self.projects.insert(path.clone(), project);
        self.project_mut(&path)
    }

    pub fn project(&self, path: &ProjectPath) -> Result<&Project, ModelError> {
        self.projects
            .get(path)
            .ok_or_else(|| ModelError::UnknownProject(path.clone()))
    }

    pub fn project_mut(&mut self, path: &ProjectPath) -> Result<&mut Project, ModelError> {
        self.projects
            .get_mut(path)
            .ok_or_else(|| ModelError::UnknownProject(path.clone()))
    }

    pub fn contains(&self, path: &ProjectPath) -> bool {
        self.projects.contains_key(path)
    }

    /// Projects ordered by path.
    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    pub fn task(&self, path: &TaskPath) -> Result<&Task, ModelError> {
        self.project(&path.project)?
            .task(&path.task)
            .ok_or_else(|| ModelError::UnknownTask(path.to_string()))
    }

    /// Resolve a task selector. An absolute `:project:task` names exactly one
    /// task, a bare name selects that task in every project having it.
    pub fn select_tasks(&self, selector: &str) -> Result<Vec<TaskPath>, ModelError> {
        if selector.starts_with(ProjectPath::SEPARATOR) {
            let path = TaskPath::parse(selector)?;
            self.task(&path)?;
            return Ok(vec![path]);
        }

        let selected: Vec<_> = self
            .projects
            .values()
            .filter(|p| p.task(selector).is_some())
            .map(|p| TaskPath::new(p.path.clone(), selector))
            .collect();
        if selected.is_empty() {
            return Err(ModelError::UnknownTask(selector.to_string()));
        }
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_path() {
        let p = ProjectPath::parse(":build:core").unwrap();
        assert_eq!(p.name(), "core");
        assert_eq!(p.parent(), Some(ProjectPath::parse(":build").unwrap()));
        assert_eq!(p.parent().unwrap().parent(), Some(ProjectPath::root()));
        assert_eq!(ProjectPath::root().parent(), None);
        assert_eq!(ProjectPath::root().child("a").as_str(), ":a");
        assert!(ProjectPath::parse("build").is_err());
        assert!(ProjectPath::parse(":a::b").is_err());
    }

    #[test]
    fn test_task_path() {
        let t = TaskPath::parse(":build:core:mavenBuild").unwrap();
        assert_eq!(t.project.as_str(), ":build:core");
        assert_eq!(t.task, "mavenBuild");
        assert_eq!(t.to_string(), ":build:core:mavenBuild");
        assert_eq!(TaskPath::parse(":build").unwrap().to_string(), ":build");
    }

    #[test]
    fn test_include_creates_ancestors() {
        let mut model = BuildModel::new("/w", "host");
        model
            .include(
                ProjectPath::parse(":mvn:core").unwrap(),
                Path::new("/w/mvn/core"),
                "core",
            )
            .unwrap();
        let ancestor = model.project(&ProjectPath::parse(":mvn").unwrap()).unwrap();
        assert_eq!(ancestor.dir, PathBuf::from("/w/mvn"));

        // An implicit ancestor may still be included explicitly.
        model
            .include(ProjectPath::parse(":mvn").unwrap(), Path::new("/w/mvn"), "parent")
            .unwrap();
        assert!(matches!(
            model.include(
                ProjectPath::parse(":mvn:core").unwrap(),
                Path::new("/w/mvn/core"),
                "core"
            ),
            Err(ModelError::DuplicateProject(_))
        ));
    }

    #[test]
    fn test_extends_closure() {
        let mut project = Project::new(ProjectPath::root(), "/w", "host");
        project.add_configuration(Configuration::bucket("api"));
        project
            .add_configuration(Configuration::bucket("implementation"))
            .extend_from(["api"]);
        project
            .add_configuration(Configuration::resolvable("runtimeClasspath"))
            .extend_from(["implementation", "runtimeOnly"]);

        let names: Vec<_> = project
            .extends_closure("runtimeClasspath")
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["runtimeClasspath", "implementation", "api"]);
    }

    #[test]
    fn test_duplicate_task() {
        let mut project = Project::new(ProjectPath::root(), "/w", "host");
        project.register_task(Task::new("build")).unwrap();
        assert!(matches!(
            project.register_task(Task::new("build")),
            Err(ModelError::DuplicateTask { .. })
        ));
    }
}

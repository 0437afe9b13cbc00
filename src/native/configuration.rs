//! Configuration buckets: dependency declarations and outgoing variants.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::native::attributes::Attributes;
use crate::native::project::{ProjectPath, TaskPath};

/// An external module reference, `group:name[:version[:classifier]]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleNotation {
    pub group: String,
    pub name: String,
    pub version: Option<String>,
    pub classifier: Option<String>,
}

impl ModuleNotation {
    pub fn new(group: impl Into<String>, name: impl Into<String>, version: Option<String>) -> Self {
        ModuleNotation {
            group: group.into(),
            name: name.into(),
            version,
            classifier: None,
        }
    }

    pub fn with_classifier(mut self, classifier: Option<String>) -> Self {
        self.classifier = classifier;
        self
    }
}

impl fmt::Display for ModuleNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.name)?;
        match (&self.version, &self.classifier) {
            (Some(v), Some(c)) => write!(f, ":{}:{}", v, c),
            (Some(v), None) => write!(f, ":{}", v),
            (None, Some(c)) => write!(f, "::{}", c),
            (None, None) => Ok(()),
        }
    }
}

/// What a dependency declaration points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DependencyTarget {
    Module(ModuleNotation),
    Project { path: ProjectPath },
}

impl fmt::Display for DependencyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyTarget::Module(m) => write!(f, "{}", m),
            DependencyTarget::Project { path } => write!(f, "project '{}'", path),
        }
    }
}

/// Exclusion of transitive dependencies. `None` matches anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExcludeRule {
    pub group: Option<String>,
    pub module: Option<String>,
}

impl fmt::Display for ExcludeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.group.as_deref().unwrap_or("*"),
            self.module.as_deref().unwrap_or("*")
        )
    }
}

/// A dependency declared in a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDecl {
    pub target: DependencyTarget,
    /// Only the target's constraints are imported
    pub platform: bool,
    pub transitive: bool,
    pub excludes: Vec<ExcludeRule>,
}

impl DependencyDecl {
    pub fn module(notation: ModuleNotation) -> Self {
        DependencyDecl {
            target: DependencyTarget::Module(notation),
            platform: false,
            transitive: true,
            excludes: Vec::new(),
        }
    }

    pub fn project(path: ProjectPath) -> Self {
        DependencyDecl {
            target: DependencyTarget::Project { path },
            platform: false,
            transitive: true,
            excludes: Vec::new(),
        }
    }

    /// Wrap as a platform dependency.
    pub fn into_platform(mut self) -> Self {
        self.platform = true;
        self
    }

    pub fn with_transitive(mut self, transitive: bool) -> Self {
        self.transitive = transitive;
        self
    }

    pub fn with_exclude(mut self, rule: ExcludeRule) -> Self {
        self.excludes.push(rule);
        self
    }

    /// The referenced project, for project dependencies.
    pub fn project_path(&self) -> Option<&ProjectPath> {
        match &self.target {
            DependencyTarget::Project { path } => Some(path),
            DependencyTarget::Module(_) => None,
        }
    }
}

impl fmt::Display for DependencyDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.platform {
            write!(f, "platform({})", self.target)?;
        } else {
            write!(f, "{}", self.target)?;
        }
        if !self.transitive {
            f.write_str(" (non-transitive)")?;
        }
        for rule in &self.excludes {
            write!(f, " exclude {}", rule)?;
        }
        Ok(())
    }
}

/// A file published through an outgoing bucket.
///
/// The file is produced by `built_by` and need not exist before that task
/// has run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingArtifact {
    pub name: String,
    pub extension: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub classifier: Option<String>,
    pub file: PathBuf,
    pub built_by: Option<TaskPath>,
}

impl OutgoingArtifact {
    /// Describe `file`, deriving name and extension from it.
    pub fn from_file(file: PathBuf, built_by: Option<TaskPath>) -> Self {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = file
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();

        OutgoingArtifact {
            name,
            type_: extension.clone(),
            extension,
            classifier: None,
            file,
            built_by,
        }
    }
}

/// Selector that lets consumers pick one of several variants of a project.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Capability {
    pub group: String,
    pub name: String,
    pub version: String,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.version)
    }
}

/// A named bucket of dependencies and outgoing artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub name: String,
    pub description: Option<String>,
    pub visible: bool,
    pub can_be_resolved: bool,
    pub can_be_consumed: bool,
    pub transitive: bool,
    pub extends_from: Vec<String>,
    pub dependencies: Vec<DependencyDecl>,
    pub constraints: Vec<ModuleNotation>,
    pub attributes: Attributes,
    pub artifacts: Vec<OutgoingArtifact>,
    pub capabilities: Vec<Capability>,
}

impl Configuration {
    /// A visible, resolvable and consumable bucket.
    pub fn new(name: impl Into<String>) -> Self {
        Configuration {
            name: name.into(),
            description: None,
            visible: true,
            can_be_resolved: true,
            can_be_consumed: true,
            transitive: true,
            extends_from: Vec::new(),
            dependencies: Vec::new(),
            constraints: Vec::new(),
            attributes: Attributes::new(),
            artifacts: Vec::new(),
            capabilities: Vec::new(),
        }
    }

    /// A bucket that only declares dependencies.
    pub fn bucket(name: impl Into<String>) -> Self {
        Configuration::new(name).with_roles(false, false)
    }

    /// A bucket that can be resolved but not consumed (classpaths).
    pub fn resolvable(name: impl Into<String>) -> Self {
        Configuration::new(name).with_roles(true, false)
    }

    /// A bucket that is offered to consumers.
    pub fn consumable(name: impl Into<String>) -> Self {
        Configuration::new(name).with_roles(false, true)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_roles(mut self, can_be_resolved: bool, can_be_consumed: bool) -> Self {
        self.can_be_resolved = can_be_resolved;
        self.can_be_consumed = can_be_consumed;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Add `names` to the buckets this one extends, keeping declaration order.
    pub fn extend_from<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if name != self.name && !self.extends_from.contains(&name) {
                self.extends_from.push(name);
            }
        }
        self
    }

    pub fn add_dependency(&mut self, dependency: DependencyDecl) {
        self.dependencies.push(dependency);
    }

    pub fn add_constraint(&mut self, constraint: ModuleNotation) {
        self.constraints.push(constraint);
    }

    pub fn add_artifact(&mut self, artifact: OutgoingArtifact) {
        self.artifacts.push(artifact);
    }

    pub fn add_capability(&mut self, capability: Capability) {
        if !self.capabilities.contains(&capability) {
            self.capabilities.push(capability);
        }
    }
}

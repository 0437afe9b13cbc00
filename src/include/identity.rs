//! Mapping of module coordinates to native project paths and names.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::core::GroupArtifact;
use crate::native::{ModelError, ProjectPath};

/// Function value computing a path or name for a module.
pub type Transform = Arc<dyn Fn(&GroupArtifact) -> String + Send + Sync>;

/// Assigns every module of an included build a native project path and name.
///
/// Both functions must be deterministic and map distinct modules of one
/// build to distinct paths. That is not checked here: including two modules
/// at the same path fails when the second one is registered.
#[derive(Clone)]
pub struct IdentityMapper {
    path: Transform,
    name: Transform,
}

impl IdentityMapper {
    /// The defaults: path `:<build>:<artifactId>`, name `<artifactId>`.
    pub fn for_build(build: &str) -> Self {
        let build = build.to_string();
        IdentityMapper {
            path: Arc::new(move |ga: &GroupArtifact| format!(":{}:{}", build, ga.artifact())),
            name: Arc::new(|ga: &GroupArtifact| ga.artifact().to_string()),
        }
    }

    /// Mapper driven by templates with `{build}`, `{groupId}` and
    /// `{artifactId}` placeholders. Missing templates keep the defaults.
    pub fn from_templates(build: &str, path: Option<&str>, name: Option<&str>) -> Self {
        let mut mapper = IdentityMapper::for_build(build);
        if let Some(template) = path {
            mapper = mapper.with_path(template_transform(build, template));
        }
        if let Some(template) = name {
            mapper = mapper.with_name(template_transform(build, template));
        }
        mapper
    }

    pub fn with_path<F>(mut self, f: F) -> Self
    where
        F: Fn(&GroupArtifact) -> String + Send + Sync + 'static,
    {
        self.path = Arc::new(f);
        self
    }

    pub fn with_name<F>(mut self, f: F) -> Self
    where
        F: Fn(&GroupArtifact) -> String + Send + Sync + 'static,
    {
        self.name = Arc::new(f);
        self
    }

    pub fn project_path(&self, ga: &GroupArtifact) -> Result<ProjectPath, ModelError> {
        ProjectPath::parse(&(self.path)(ga))
    }

    pub fn project_name(&self, ga: &GroupArtifact) -> String {
        (self.name)(ga)
    }
}

impl fmt::Debug for IdentityMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityMapper").finish_non_exhaustive()
    }
}

fn template_transform(
    build: &str,
    template: &str,
) -> impl Fn(&GroupArtifact) -> String + Send + Sync + 'static {
    let build = build.to_string();
    let template = template.to_string();
    move |ga: &GroupArtifact| {
        template
            .replace("{build}", &build)
            .replace("{groupId}", ga.group())
            .replace("{artifactId}", ga.artifact())
    }
}

/// Native project path of every included module, keyed by `group:artifact`.
///
/// Filled while the projects of all included builds are registered and
/// shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct IdentityMap {
    entries: BTreeMap<GroupArtifact, ProjectPath>,
}

impl IdentityMap {
    pub fn new() -> Self {
        IdentityMap::default()
    }

    pub fn insert(&mut self, ga: GroupArtifact, path: ProjectPath) {
        self.entries.insert(ga, path);
    }

    pub fn get(&self, ga: &GroupArtifact) -> Option<&ProjectPath> {
        self.entries.get(ga)
    }

    pub fn contains(&self, ga: &GroupArtifact) -> bool {
        self.entries.contains_key(ga)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupArtifact, &ProjectPath)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

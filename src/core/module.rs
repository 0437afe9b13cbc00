//! ForeignModule - read-only snapshot of one module of an included build.
//!
//! Modules are assembled once by the engine during discovery and are never
//! mutated afterwards. Everything the translation needs (parent chain,
//! plugin versions, attached artifacts) is resolved before the snapshot is
//! handed out, so there is no lazily populated state to observe.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::artifact::ForeignArtifact;
use crate::core::coordinate::{Coordinate, GroupArtifact};
use crate::core::dependency::Dependency;

/// Packaging of aggregator modules.
pub const POM_PACKAGING: &str = "pom";

/// A build plugin used by a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    group: String,
    artifact: String,
    version: Option<String>,
    goals: Vec<String>,
    dependencies: Vec<Dependency>,
}

impl Plugin {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: Option<String>,
    ) -> Self {
        Plugin {
            group: group.into(),
            artifact: artifact.into(),
            version,
            goals: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Add an execution goal bound by this plugin.
    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goals.push(goal.into());
        self
    }

    /// Add a dependency of the plugin itself.
    pub fn with_dependency(mut self, dep: Dependency) -> Self {
        self.dependencies.push(dep);
        self
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn goals(&self) -> &[String] {
        &self.goals
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn group_artifact(&self) -> GroupArtifact {
        GroupArtifact::new(self.group.clone(), self.artifact.clone())
    }
}

/// Output locations of a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildLayout {
    /// Build output directory (`target`)
    pub directory: PathBuf,
    /// Base name of the primary output, without extension
    pub final_name: String,
    /// Main source roots
    pub source_roots: Vec<PathBuf>,
    /// Test source roots
    pub test_source_roots: Vec<PathBuf>,
}

impl BuildLayout {
    /// Conventional layout below `base_dir`.
    pub fn conventional(base_dir: &Path, coordinate: &Coordinate) -> Self {
        BuildLayout {
            directory: base_dir.join("target"),
            final_name: format!("{}-{}", coordinate.artifact(), coordinate.version()),
            source_roots: vec![base_dir.join("src").join("main").join("java")],
            test_source_roots: vec![base_dir.join("src").join("test").join("java")],
        }
    }
}

/// Immutable snapshot of one foreign module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignModule {
    coordinate: Coordinate,
    packaging: String,
    name: Option<String>,
    descriptor: PathBuf,
    base_dir: PathBuf,
    parents: Vec<Coordinate>,
    dependencies: Vec<Dependency>,
    dependency_management: Vec<Dependency>,
    plugins: Vec<Plugin>,
    artifact: ForeignArtifact,
    attached_artifacts: Vec<ForeignArtifact>,
    build: BuildLayout,
    extension_realm: Option<String>,
}

impl ForeignModule {
    /// Create a module read from `descriptor`. The base directory is the
    /// descriptor's directory and the layout is the conventional one.
    pub fn new(coordinate: Coordinate, packaging: impl Into<String>, descriptor: PathBuf) -> Self {
        let packaging = packaging.into();
        let base_dir = descriptor
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let build = BuildLayout::conventional(&base_dir, &coordinate);
        let artifact = ForeignArtifact::new(coordinate.clone(), packaging.clone());

        ForeignModule {
            coordinate,
            packaging,
            name: None,
            descriptor,
            base_dir,
            parents: Vec::new(),
            dependencies: Vec::new(),
            dependency_management: Vec::new(),
            plugins: Vec::new(),
            artifact,
            attached_artifacts: Vec::new(),
            build,
            extension_realm: None,
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Set the parent chain, nearest parent first.
    pub fn with_parents(mut self, parents: Vec<Coordinate>) -> Self {
        self.parents = parents;
        self
    }

    pub fn with_dependency(mut self, dep: Dependency) -> Self {
        self.dependencies.push(dep);
        self
    }

    pub fn with_dependencies(mut self, deps: Vec<Dependency>) -> Self {
        self.dependencies = deps;
        self
    }

    pub fn with_dependency_management(mut self, deps: Vec<Dependency>) -> Self {
        self.dependency_management = deps;
        self
    }

    pub fn with_plugin(mut self, plugin: Plugin) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn with_attached_artifact(mut self, artifact: ForeignArtifact) -> Self {
        self.attached_artifacts.push(artifact);
        self
    }

    pub fn with_build(mut self, build: BuildLayout) -> Self {
        self.build = build;
        self
    }

    pub fn with_extension_realm(mut self, realm: Option<String>) -> Self {
        self.extension_realm = realm;
        self
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    pub fn group_artifact(&self) -> GroupArtifact {
        self.coordinate.group_artifact()
    }

    pub fn packaging(&self) -> &str {
        &self.packaging
    }

    /// Aggregator modules only carry a descriptor and are translated to
    /// platforms.
    pub fn is_aggregator(&self) -> bool {
        self.packaging == POM_PACKAGING
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The descriptor file this module was read from.
    pub fn descriptor(&self) -> &Path {
        &self.descriptor
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The immediate parent, if any.
    pub fn parent(&self) -> Option<&Coordinate> {
        self.parents.first()
    }

    /// Parent chain from the immediate parent up to the root.
    pub fn parents(&self) -> &[Coordinate] {
        &self.parents
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn dependency_management(&self) -> &[Dependency] {
        &self.dependency_management
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    /// The primary artifact.
    pub fn artifact(&self) -> &ForeignArtifact {
        &self.artifact
    }

    pub fn attached_artifacts(&self) -> &[ForeignArtifact] {
        &self.attached_artifacts
    }

    /// Primary artifact followed by every attached artifact.
    pub fn all_artifacts(&self) -> impl Iterator<Item = &ForeignArtifact> {
        std::iter::once(&self.artifact).chain(self.attached_artifacts.iter())
    }

    pub fn build(&self) -> &BuildLayout {
        &self.build
    }

    /// Name of the extension realm contributing components for this module.
    pub fn extension_realm(&self) -> Option<&str> {
        self.extension_realm.as_deref()
    }

    /// `<build dir>/<final name>.jar`
    pub fn jar_output_file(&self) -> PathBuf {
        self.build
            .directory
            .join(format!("{}.jar", self.build.final_name))
    }

    /// Location of `artifact` inside the build directory:
    /// `<final name>[-<classifier>].<extension>`.
    pub fn output_file(&self, artifact: &ForeignArtifact) -> PathBuf {
        let mut name = self.build.final_name.clone();
        if let Some(classifier) = artifact.classifier() {
            name.push('-');
            name.push_str(classifier);
        }
        name.push('.');
        name.push_str(artifact.extension());
        self.build.directory.join(name)
    }
}

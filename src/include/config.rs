//! Settings of one included build.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::GroupArtifact;
use crate::engine::pom_engine::POM_FILE;
use crate::engine::{EngineLogLevel, ExecutionRequest};
use crate::include::identity::IdentityMapper;
use crate::native::{ModelError, ProjectPath};

/// Goals run by a module build task unless configured otherwise.
pub const DEFAULT_GOALS: &[&str] = &["package"];

/// User properties set by [`IncludedBuildConfig::disable_tests`].
pub const DISABLE_TESTS_PROPERTIES: &[&str] = &[
    "skipTests",
    "maven.test.skip",
    "checkstyle.skip",
    "pmd.skip",
    "spotbugs.skip",
    "enforcer.skip",
    "jacoco.skip",
    "rat.skip",
    "license.skip",
    "spotless.check.skip",
    "maven.javadoc.skip",
    "animal.sniffer.skip",
];

/// Settings inherited from the host invocation.
#[derive(Debug, Clone, Copy)]
pub struct HostSettings {
    pub offline: bool,
    /// Host verbosity, `None` when logging is off
    pub log_level: Option<tracing::Level>,
}

impl Default for HostSettings {
    fn default() -> Self {
        HostSettings {
            offline: false,
            log_level: Some(tracing::Level::INFO),
        }
    }
}

/// Configuration of one included build.
#[derive(Debug, Clone)]
pub struct IncludedBuildConfig {
    name: String,
    root_directory: PathBuf,
    log_level: Option<EngineLogLevel>,
    profiles: Vec<String>,
    inactive_profiles: Vec<String>,
    user_properties: BTreeMap<String, String>,
    system_properties: BTreeMap<String, String>,
    goals: Vec<String>,
    build_file_name: Option<String>,
    identity: IdentityMapper,
    offline: bool,
    local_repository: Option<PathBuf>,
}

impl IncludedBuildConfig {
    pub fn new(name: impl Into<String>, root_directory: impl Into<PathBuf>) -> Self {
        let name = name.into();
        IncludedBuildConfig {
            identity: IdentityMapper::for_build(&name),
            name,
            root_directory: root_directory.into(),
            log_level: None,
            profiles: Vec::new(),
            inactive_profiles: Vec::new(),
            user_properties: BTreeMap::new(),
            system_properties: BTreeMap::new(),
            goals: DEFAULT_GOALS.iter().map(|g| g.to_string()).collect(),
            build_file_name: None,
            offline: false,
            local_repository: None,
        }
    }

    /// Engine verbosity. Defaults to one derived from the host's verbosity.
    pub fn with_log_level(mut self, level: EngineLogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    pub fn with_profiles(mut self, profiles: Vec<String>) -> Self {
        self.profiles = profiles;
        self
    }

    pub fn with_inactive_profiles(mut self, profiles: Vec<String>) -> Self {
        self.inactive_profiles = profiles;
        self
    }

    pub fn with_user_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.user_properties.insert(key.into(), value.into());
        self
    }

    pub fn with_system_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.system_properties.insert(key.into(), value.into());
        self
    }

    /// Goals (or phases) run for every module.
    pub fn with_goals(mut self, goals: Vec<String>) -> Self {
        self.goals = goals;
        self
    }

    pub fn with_build_file_name(mut self, name: impl Into<String>) -> Self {
        self.build_file_name = Some(name.into());
        self
    }

    /// Replace the `group:artifact` to project path function.
    pub fn with_project_path<F>(mut self, f: F) -> Self
    where
        F: Fn(&GroupArtifact) -> String + Send + Sync + 'static,
    {
        self.identity = self.identity.with_path(f);
        self
    }

    /// Replace the `group:artifact` to project name function.
    pub fn with_project_name<F>(mut self, f: F) -> Self
    where
        F: Fn(&GroupArtifact) -> String + Send + Sync + 'static,
    {
        self.identity = self.identity.with_name(f);
        self
    }

    pub fn with_identity_mapper(mut self, identity: IdentityMapper) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn with_local_repository(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_repository = Some(path.into());
        self
    }

    /// Skip tests and the usual static analysis and enforcement plugins.
    pub fn disable_tests(mut self) -> Self {
        for property in DISABLE_TESTS_PROPERTIES {
            self.user_properties
                .insert(property.to_string(), "true".to_string());
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    /// Root descriptor of the build.
    pub fn pom_file(&self) -> PathBuf {
        self.root_directory.join(POM_FILE)
    }

    pub fn goals(&self) -> &[String] {
        &self.goals
    }

    pub fn build_file_name(&self) -> Option<&str> {
        self.build_file_name.as_deref()
    }

    pub fn user_properties(&self) -> &BTreeMap<String, String> {
        &self.user_properties
    }

    pub fn identity(&self) -> &IdentityMapper {
        &self.identity
    }

    pub fn project_path(&self, ga: &GroupArtifact) -> Result<ProjectPath, ModelError> {
        self.identity.project_path(ga)
    }

    pub fn project_name(&self, ga: &GroupArtifact) -> String {
        self.identity.project_name(ga)
    }

    /// The configured local repository, `~/.m2/repository` by default.
    pub fn local_repository(&self) -> PathBuf {
        if let Some(ref path) = self.local_repository {
            return path.clone();
        }
        directories::BaseDirs::new()
            .map(|b| b.home_dir().join(".m2").join("repository"))
            .unwrap_or_else(|| self.root_directory.join(".m2").join("repository"))
    }

    /// The engine request used to discover the build.
    pub fn new_execution_request(&self, host: &HostSettings) -> ExecutionRequest {
        ExecutionRequest {
            pom: self.pom_file(),
            base_directory: self.root_directory.clone(),
            goals: self.goals.clone(),
            recursive: true,
            show_errors: true,
            selected_projects: Vec::new(),
            active_profiles: self.profiles.clone(),
            inactive_profiles: self.inactive_profiles.clone(),
            user_properties: self.user_properties.clone(),
            system_properties: self.system_properties.clone(),
            local_repository: self.local_repository(),
            offline: self.offline || host.offline,
            log_level: self
                .log_level
                .unwrap_or_else(|| EngineLogLevel::from_host(host.log_level)),
        }
    }
}

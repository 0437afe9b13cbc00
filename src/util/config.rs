//! Configuration file support.
//!
//! Included builds are declared in `include-maven.toml` at the root of the
//! host workspace, one `[[build]]` table per build:
//!
//! ```toml
//! [settings]
//! jobs = 4
//!
//! [[build]]
//! name = "maven"
//! root-directory = "maven"
//! profiles = ["ci"]
//! goals = ["install"]
//! disable-tests = true
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::EngineLogLevel;
use crate::include::{IdentityMapper, IncludedBuildConfig};

/// Name of the configuration file.
pub const CONFIG_FILE: &str = "include-maven.toml";

/// Contents of `include-maven.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IncludeConfig {
    /// Host settings
    pub settings: Settings,

    /// Included builds, in inclusion order
    #[serde(rename = "build")]
    pub builds: Vec<BuildEntry>,
}

/// Settings of the host invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Number of parallel tasks (None = number of CPUs)
    pub jobs: Option<usize>,

    /// Never access remote repositories
    pub offline: bool,
}

/// One `[[build]]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildEntry {
    /// Build name, the first segment of every project path of the build
    pub name: String,

    /// Directory of the root `pom.xml`, relative to the workspace root
    pub root_directory: PathBuf,

    /// Engine verbosity (debug, info, warn, error, fatal, disabled)
    pub log_level: Option<String>,

    pub profiles: Vec<String>,

    pub inactive_profiles: Vec<String>,

    pub user_properties: BTreeMap<String, String>,

    pub system_properties: BTreeMap<String, String>,

    /// Goals run by every module build task (default: `package`)
    pub goals: Option<Vec<String>>,

    pub build_file_name: Option<String>,

    /// Project path template, e.g. `:{build}:{groupId}.{artifactId}`
    pub project_path: Option<String>,

    /// Project name template, e.g. `{artifactId}`
    pub project_name: Option<String>,

    /// Skip tests and static analysis
    pub disable_tests: bool,

    pub offline: bool,

    pub local_repository: Option<PathBuf>,
}

impl BuildEntry {
    /// The build configuration, with relative directories resolved against
    /// `workspace_root`.
    pub fn to_build_config(&self, workspace_root: &Path) -> Result<IncludedBuildConfig> {
        if self.name.is_empty() {
            bail!("included build in {} has no name", CONFIG_FILE);
        }

        let mut config =
            IncludedBuildConfig::new(&self.name, workspace_root.join(&self.root_directory))
                .with_profiles(self.profiles.clone())
                .with_inactive_profiles(self.inactive_profiles.clone())
                .with_identity_mapper(IdentityMapper::from_templates(
                    &self.name,
                    self.project_path.as_deref(),
                    self.project_name.as_deref(),
                ))
                .with_offline(self.offline);

        if let Some(ref level) = self.log_level {
            let level = EngineLogLevel::parse(level).with_context(|| {
                format!("invalid log level `{}` for build '{}'", level, self.name)
            })?;
            config = config.with_log_level(level);
        }
        for (key, value) in &self.user_properties {
            config = config.with_user_property(key, value);
        }
        for (key, value) in &self.system_properties {
            config = config.with_system_property(key, value);
        }
        if let Some(ref goals) = self.goals {
            config = config.with_goals(goals.clone());
        }
        if let Some(ref name) = self.build_file_name {
            config = config.with_build_file_name(name);
        }
        if let Some(ref repo) = self.local_repository {
            config = config.with_local_repository(workspace_root.join(repo));
        }
        if self.disable_tests {
            config = config.disable_tests();
        }
        Ok(config)
    }
}

impl IncludeConfig {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Configurations of every included build.
    pub fn build_configs(&self, workspace_root: &Path) -> Result<Vec<IncludedBuildConfig>> {
        let mut seen = std::collections::BTreeSet::new();
        let mut configs = Vec::with_capacity(self.builds.len());
        for entry in &self.builds {
            if !seen.insert(entry.name.as_str()) {
                bail!("build '{}' is included twice", entry.name);
            }
            configs.push(entry.to_build_config(workspace_root)?);
        }
        Ok(configs)
    }
}

/// Path of the configuration file of the workspace at `root`.
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

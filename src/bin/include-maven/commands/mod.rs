//! Command implementations

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use include_maven::include::HostSettings;
use include_maven::ops::{load_workspace, Workspace};
use include_maven::util::config::{config_path, CONFIG_FILE};
use include_maven::util::diagnostic::suggestions;
use include_maven::util::shell::Status;
use include_maven::util::Shell;

pub mod build;
pub mod completions;
pub mod dependencies;
pub mod model;
pub mod projects;
pub mod tasks;

/// Global state shared by every command.
pub struct Context<'a> {
    directory: Option<PathBuf>,
    host: HostSettings,
    pub shell: &'a Shell,
}

impl<'a> Context<'a> {
    pub fn new(
        directory: Option<PathBuf>,
        offline: bool,
        verbose: bool,
        quiet: bool,
        shell: &'a Shell,
    ) -> Self {
        let log_level = if verbose {
            Some(tracing::Level::DEBUG)
        } else if quiet {
            Some(tracing::Level::ERROR)
        } else {
            Some(tracing::Level::INFO)
        };
        Context {
            directory,
            host: HostSettings { offline, log_level },
            shell,
        }
    }

    /// The workspace root: the given directory, or the nearest ancestor of
    /// the current directory containing the configuration file.
    pub fn root(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.directory {
            return include_maven::util::fs::absolute(dir);
        }
        let cwd = std::env::current_dir()?;
        match find_root(&cwd) {
            Some(root) => Ok(root.to_path_buf()),
            None => bail!(
                "could not find {} in {} or any parent directory\nhelp: {}",
                CONFIG_FILE,
                cwd.display(),
                suggestions::NO_CONFIG
            ),
        }
    }

    /// Include every configured build.
    pub fn load(&self) -> Result<Workspace> {
        let root = self.root()?;
        let workspace = load_workspace(&root, self.host)?;
        self.shell.status(
            Status::Configured,
            format!(
                "{} project(s) from {} Maven build(s)",
                workspace.identities.len(),
                workspace.builds.len()
            ),
        );
        Ok(workspace)
    }
}

fn find_root(start: &Path) -> Option<&Path> {
    start.ancestors().find(|dir| config_path(dir).is_file())
}

//! Workspace readers and component lookup.
//!
//! A workspace reader resolves artifacts from outside the local repository.
//! The reactor reader answers for modules of the included build itself so
//! that in-reactor dependencies never fall through to a cached copy.
//!
//! Extensions of the engine contribute extra readers through the
//! [`ComponentRegistry`], either globally (the core realm) or scoped to an
//! extension realm that only modules declaring that realm can see.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::core::{ForeignArtifact, GroupArtifact, ModuleIndex};

/// Failure to look up components.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no {role} components found in realm '{realm}'")]
    NotFound { role: &'static str, realm: String },
}

/// Resolves artifacts from a workspace.
pub trait WorkspaceReader: Send + Sync + fmt::Debug {
    /// Identity used to deduplicate readers.
    fn id(&self) -> &str;

    /// Locate the file of `artifact`, if this workspace knows it.
    fn find_artifact(&self, artifact: &ForeignArtifact) -> Option<PathBuf>;

    /// Versions of `ga` available in this workspace.
    fn find_versions(&self, ga: &GroupArtifact) -> Vec<String>;
}

/// Resolves artifacts of modules in the reactor.
#[derive(Debug)]
pub struct ReactorReader {
    index: Arc<ModuleIndex>,
}

impl ReactorReader {
    pub const ID: &'static str = "reactor";

    pub fn new(index: Arc<ModuleIndex>) -> Self {
        ReactorReader { index }
    }
}

impl WorkspaceReader for ReactorReader {
    fn id(&self) -> &str {
        Self::ID
    }

    fn find_artifact(&self, artifact: &ForeignArtifact) -> Option<PathBuf> {
        let module = self.index.get_exact(artifact.coordinate())?;

        if artifact.extension() == "pom" {
            return Some(module.descriptor().to_path_buf());
        }

        let packaged = module.output_file(artifact);
        if packaged.is_file() {
            return Some(packaged);
        }

        // Not packaged yet, the compiled classes stand in for the main jar.
        if artifact.extension() == "jar" && artifact.classifier().is_none() {
            let classes = module.build().directory.join("classes");
            if classes.is_dir() {
                return Some(classes);
            }
        }

        None
    }

    fn find_versions(&self, ga: &GroupArtifact) -> Vec<String> {
        self.index
            .get(ga)
            .map(|m| vec![m.coordinate().version().to_string()])
            .unwrap_or_default()
    }
}

/// Consults a list of readers in order.
#[derive(Debug)]
pub struct ChainedWorkspaceReader {
    id: String,
    readers: Vec<Arc<dyn WorkspaceReader>>,
}

impl ChainedWorkspaceReader {
    /// Chain `readers`, keeping only the first reader of every id.
    pub fn of(readers: impl IntoIterator<Item = Arc<dyn WorkspaceReader>>) -> Self {
        let mut seen = HashSet::new();
        let readers: Vec<_> = readers
            .into_iter()
            .filter(|r| seen.insert(r.id().to_string()))
            .collect();
        let id = readers
            .iter()
            .map(|r| r.id())
            .collect::<Vec<_>>()
            .join("+");

        ChainedWorkspaceReader { id, readers }
    }

    pub fn readers(&self) -> &[Arc<dyn WorkspaceReader>] {
        &self.readers
    }
}

impl WorkspaceReader for ChainedWorkspaceReader {
    fn id(&self) -> &str {
        &self.id
    }

    fn find_artifact(&self, artifact: &ForeignArtifact) -> Option<PathBuf> {
        self.readers.iter().find_map(|r| r.find_artifact(artifact))
    }

    fn find_versions(&self, ga: &GroupArtifact) -> Vec<String> {
        let mut versions: Vec<String> = Vec::new();
        for reader in &self.readers {
            for version in reader.find_versions(ga) {
                if !versions.contains(&version) {
                    versions.push(version);
                }
            }
        }
        versions
    }
}

/// Components contributed by engine extensions.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    workspace_readers: Vec<(Option<String>, Arc<dyn WorkspaceReader>)>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        ComponentRegistry::default()
    }

    /// Register a workspace reader. `None` registers it in the core realm,
    /// which every extension realm can see.
    pub fn with_workspace_reader(
        mut self,
        realm: Option<&str>,
        reader: Arc<dyn WorkspaceReader>,
    ) -> Self {
        self.workspace_readers
            .push((realm.map(str::to_string), reader));
        self
    }

    /// All workspace readers visible from `realm`.
    pub fn lookup_workspace_readers(
        &self,
        realm: &str,
    ) -> Result<Vec<Arc<dyn WorkspaceReader>>, LookupError> {
        let found: Vec<_> = self
            .workspace_readers
            .iter()
            .filter(|(r, _)| r.as_deref().map_or(true, |r| r == realm))
            .map(|(_, reader)| Arc::clone(reader))
            .collect();

        if found.is_empty() {
            return Err(LookupError::NotFound {
                role: "WorkspaceReader",
                realm: realm.to_string(),
            });
        }
        Ok(found)
    }
}

//! ModuleIndex - the frozen index of every module in a reactor.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::coordinate::{Coordinate, GroupArtifact};
use crate::core::module::ForeignModule;

/// Two or more reactor modules share a `group:artifact:version`.
#[derive(Debug, Error, Diagnostic)]
#[error(
    "two or more projects in the reactor have the same identifier, please make sure that \
     <groupId>:<artifactId>:<version> is unique for each project: {}",
    format_collisions(.collisions)
)]
#[diagnostic(
    code(include_maven::discovery::duplicate_project),
    help("rename one of the modules or give it a distinct version")
)]
pub struct DuplicateProjectError {
    /// Colliding descriptor files, keyed by `group:artifact:version`.
    pub collisions: BTreeMap<String, Vec<PathBuf>>,
}

fn format_collisions(collisions: &BTreeMap<String, Vec<PathBuf>>) -> String {
    collisions
        .iter()
        .map(|(key, files)| {
            let files: Vec<_> = files.iter().map(|f| f.display().to_string()).collect();
            format!("{} -> [{}]", key, files.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Index of reactor modules.
///
/// Built once from the discovered modules and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ModuleIndex {
    modules: Vec<Arc<ForeignModule>>,
    by_key: HashMap<String, usize>,
    by_group_artifact: HashMap<GroupArtifact, usize>,
}

impl ModuleIndex {
    /// Build the index, rejecting duplicate coordinates.
    ///
    /// Every collision is collected before failing so that the error names
    /// all colliding descriptors.
    pub fn build(
        modules: impl IntoIterator<Item = Arc<ForeignModule>>,
    ) -> Result<Self, DuplicateProjectError> {
        let mut index = ModuleIndex::default();
        let mut collisions: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

        for module in modules {
            let key = module.coordinate().key();
            if let Some(&existing) = index.by_key.get(&key) {
                collisions
                    .entry(key)
                    .or_insert_with(|| vec![index.modules[existing].descriptor().to_path_buf()])
                    .push(module.descriptor().to_path_buf());
                continue;
            }

            let pos = index.modules.len();
            let ga = module.group_artifact();
            if let Some(&other) = index.by_group_artifact.get(&ga) {
                tracing::warn!(
                    "Reactor contains {} in versions {} and {}, using the former",
                    ga,
                    index.modules[other].coordinate().version(),
                    module.coordinate().version()
                );
            } else {
                index.by_group_artifact.insert(ga, pos);
            }
            index.by_key.insert(key, pos);
            index.modules.push(module);
        }

        if !collisions.is_empty() {
            return Err(DuplicateProjectError { collisions });
        }

        Ok(index)
    }

    /// Look up a module by `group:artifact`.
    pub fn get(&self, ga: &GroupArtifact) -> Option<&Arc<ForeignModule>> {
        self.by_group_artifact.get(ga).map(|&i| &self.modules[i])
    }

    /// Look up a module by its full coordinate.
    pub fn get_exact(&self, coordinate: &Coordinate) -> Option<&Arc<ForeignModule>> {
        self.by_key.get(&coordinate.key()).map(|&i| &self.modules[i])
    }

    /// Look up a module by `group:artifact` and require a matching version.
    pub fn get_version(&self, ga: &GroupArtifact, version: Option<&str>) -> Option<&Arc<ForeignModule>> {
        self.get(ga)
            .filter(|m| version.is_some_and(|v| v == m.coordinate().version()))
    }

    pub fn contains(&self, ga: &GroupArtifact) -> bool {
        self.by_group_artifact.contains_key(ga)
    }

    /// Modules in the order they were indexed.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ForeignModule>> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

//! Discovery of an included build's reactor.
//!
//! Discovery runs once per included build, before any native project is
//! registered. It builds the root module, then the whole reactor in one
//! pass, indexes the modules, installs the workspace readers that make
//! in-reactor modules win over cached copies and computes the build order.
//! Any failure aborts the included build as a whole.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::core::{ForeignModule, ModuleIndex};
use crate::engine::{
    ChainedWorkspaceReader, ForeignEngine, ProblemSeverity, ReactorReader, Session,
    WorkspaceReader,
};
use crate::include::build::IncludedBuild;
use crate::include::config::{HostSettings, IncludedBuildConfig};
use crate::include::error::DiscoveryError;

/// Discovers the modules of one included build.
pub struct GraphDiscoverer {
    config: IncludedBuildConfig,
    host: HostSettings,
    engine: Arc<dyn ForeignEngine>,
}

impl GraphDiscoverer {
    /// `engine` must be owned by this build alone.
    pub fn new(config: IncludedBuildConfig, engine: Arc<dyn ForeignEngine>) -> Self {
        GraphDiscoverer {
            config,
            host: HostSettings::default(),
            engine,
        }
    }

    pub fn with_host_settings(mut self, host: HostSettings) -> Self {
        self.host = host;
        self
    }

    /// Run discovery.
    pub fn discover(self) -> Result<IncludedBuild, DiscoveryError> {
        let name = self.config.name().to_string();
        let pom = self.config.pom_file();
        tracing::info!(
            "Including Maven build named '{}' in '{}'",
            name,
            self.config.root_directory().display()
        );

        let request = self.config.new_execution_request(&self.host);
        validate_local_repository(&request.local_repository)?;

        let repository = self.engine.new_repository_session(&request);
        let model_error = |source| DiscoveryError::Model {
            build: name.clone(),
            source,
        };

        tracing::info!("Getting Maven build's '{}' root project ...", name);
        let root = self
            .engine
            .build_module(&pom, &request, &repository)
            .map_err(model_error)?;
        tracing::info!(
            "Included Maven build's '{}' root project is '{}'",
            name,
            root.group_artifact()
        );

        let mut session = Session::new(request.clone(), repository.clone());
        session.current_project = Some(Arc::new(root));

        let scope = self.engine.session_scope();
        let mut scoped = scope.enter(session);

        tracing::info!("Getting all projects of included Maven build '{}' ...", name);
        let projects: Vec<Arc<ForeignModule>> = self
            .engine
            .build_reactor(&pom, true, &request, &repository)
            .map_err(model_error)?
            .into_iter()
            .map(Arc::new)
            .collect();
        tracing::info!(
            "Got {} projects of included Maven build '{}'",
            projects.len(),
            name
        );

        let index = Arc::new(ModuleIndex::build(projects.iter().cloned())?);
        scoped.all_projects = projects.clone();
        scoped.projects = projects;
        scoped.project_index = Arc::clone(&index);

        let reader = workspace_reader(self.engine.as_ref(), &scoped, &index);
        scoped.repository = scoped.repository.clone().with_workspace_reader(reader);

        let result = self.engine.build_dependency_graph(&scoped);
        for problem in &result.problems {
            match problem.severity {
                ProblemSeverity::Warning => tracing::warn!("{}", problem),
                _ => tracing::error!("{}", problem),
            }
        }
        if result.has_errors() {
            let problem = result
                .problems
                .iter()
                .find(|p| p.is_error())
                .map(|p| p.message.clone())
                .unwrap_or_default();
            return Err(DiscoveryError::Graph {
                build: name,
                problem,
            });
        }
        if let Some(graph) = result.graph {
            scoped.projects = graph.sorted_projects().to_vec();
            scoped.dependency_graph = Some(Arc::new(graph));
        }

        // Prefer the reactor's instance of the root so both are the same value.
        let root = scoped
            .current_project
            .as_ref()
            .and_then(|r| index.get_exact(r.coordinate()))
            .cloned()
            .or_else(|| scoped.current_project.clone())
            .ok_or_else(|| DiscoveryError::Graph {
                build: name.clone(),
                problem: "no root project".to_string(),
            })?;
        scoped.current_project = Some(Arc::clone(&root));

        let mut reactor = vec![Arc::clone(&root)];
        reactor.extend(
            scoped
                .projects
                .iter()
                .filter(|m| m.coordinate() != root.coordinate())
                .cloned(),
        );

        let session = scoped.session().clone();
        drop(scoped);

        Ok(IncludedBuild::new(
            self.config,
            Arc::clone(&self.engine),
            root,
            reactor,
            index,
            session,
        ))
    }
}

/// Make sure the local repository exists and is a directory.
pub fn validate_local_repository(path: &Path) -> Result<(), DiscoveryError> {
    tracing::debug!("Using local repository at {}", path.display());
    let created = std::fs::create_dir_all(path);
    if !path.is_dir() {
        return Err(DiscoveryError::LocalRepository {
            path: path.to_path_buf(),
            source: created.err(),
        });
    }
    Ok(())
}

/// Workspace readers in order of precedence: the reactor, the repository
/// session's own reader, then readers contributed by the extension realms
/// of the session's projects. Each realm is scanned once.
fn workspace_reader(
    engine: &dyn ForeignEngine,
    session: &Session,
    index: &Arc<ModuleIndex>,
) -> Arc<dyn WorkspaceReader> {
    let mut readers: Vec<Arc<dyn WorkspaceReader>> =
        vec![Arc::new(ReactorReader::new(Arc::clone(index)))];

    if let Some(ref reader) = session.repository.workspace_reader {
        readers.push(Arc::clone(reader));
    }

    let mut scanned = HashSet::new();
    for realm in session.projects.iter().filter_map(|m| m.extension_realm()) {
        if !scanned.insert(realm) {
            continue;
        }
        match engine.components().lookup_workspace_readers(realm) {
            Ok(found) => readers.extend(found),
            Err(e) => tracing::warn!("Failed to lookup WorkspaceReader: {}", e),
        }
    }

    let chain = ChainedWorkspaceReader::of(readers);
    tracing::debug!("Workspace readers: {}", chain.id());
    Arc::new(chain)
}

//! Engine sessions and the scope entered around each execution.
//!
//! A [`Session`] is an explicit context value. It is passed to the engine
//! as a parameter instead of being looked up from ambient state, and every
//! execution happens inside a [`ScopedSession`] whose exit runs on drop, so
//! the scope is left on every path including failures and panics.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::core::{ForeignModule, ModuleIndex};
use crate::engine::workspace::WorkspaceReader;
use crate::engine::{ExecutionRequest, ProjectDependencyGraph};

/// Artifact resolution settings shared by everything in one included build.
#[derive(Debug, Clone)]
pub struct RepositorySession {
    pub local_repository: PathBuf,
    pub offline: bool,
    /// Consulted before the local repository
    pub workspace_reader: Option<Arc<dyn WorkspaceReader>>,
}

impl RepositorySession {
    pub fn new(local_repository: PathBuf, offline: bool) -> Self {
        RepositorySession {
            local_repository,
            offline,
            workspace_reader: None,
        }
    }

    pub fn with_workspace_reader(mut self, reader: Arc<dyn WorkspaceReader>) -> Self {
        self.workspace_reader = Some(reader);
        self
    }
}

/// State of one engine invocation.
#[derive(Debug, Clone)]
pub struct Session {
    pub request: ExecutionRequest,
    pub repository: RepositorySession,
    pub current_project: Option<Arc<ForeignModule>>,
    /// Projects the request operates on
    pub projects: Vec<Arc<ForeignModule>>,
    /// Every project of the reactor
    pub all_projects: Vec<Arc<ForeignModule>>,
    pub project_index: Arc<ModuleIndex>,
    pub dependency_graph: Option<Arc<ProjectDependencyGraph>>,
}

impl Session {
    pub fn new(request: ExecutionRequest, repository: RepositorySession) -> Self {
        Session {
            request,
            repository,
            current_project: None,
            projects: Vec::new(),
            all_projects: Vec::new(),
            project_index: Arc::new(ModuleIndex::default()),
            dependency_graph: None,
        }
    }

    /// A session for running `request` against `module` only, seeded with
    /// the reactor state of this (discovery) session.
    pub fn for_module(&self, request: ExecutionRequest, module: Arc<ForeignModule>) -> Session {
        Session {
            request,
            repository: self.repository.clone(),
            current_project: self.current_project.clone(),
            projects: vec![module],
            all_projects: self.all_projects.clone(),
            project_index: Arc::clone(&self.project_index),
            dependency_graph: self.dependency_graph.clone(),
        }
    }
}

/// Tracks entered sessions of one engine.
#[derive(Debug, Default)]
pub struct SessionScope {
    active: AtomicUsize,
}

impl SessionScope {
    pub fn new() -> Self {
        SessionScope::default()
    }

    /// Enter the scope seeded with `session`. The scope is exited when the
    /// returned guard is dropped.
    pub fn enter(&self, session: Session) -> ScopedSession<'_> {
        let depth = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("Entered session scope (active: {})", depth);
        ScopedSession {
            scope: self,
            session,
        }
    }

    /// Number of scopes currently entered.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

/// A session seeded into an entered [`SessionScope`].
#[derive(Debug)]
pub struct ScopedSession<'a> {
    scope: &'a SessionScope,
    session: Session,
}

impl ScopedSession<'_> {
    pub fn session(&self) -> &Session {
        &self.session
    }
}

impl std::ops::Deref for ScopedSession<'_> {
    type Target = Session;

    fn deref(&self) -> &Session {
        &self.session
    }
}

impl std::ops::DerefMut for ScopedSession<'_> {
    fn deref_mut(&mut self) -> &mut Session {
        &mut self.session
    }
}

impl Drop for ScopedSession<'_> {
    fn drop(&mut self) {
        let remaining = self.scope.active.fetch_sub(1, Ordering::SeqCst) - 1;
        tracing::debug!("Exited session scope (active: {})", remaining);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Coordinate;

    fn session() -> Session {
        Session::new(
            ExecutionRequest::default(),
            RepositorySession::new(PathBuf::from("/tmp/repo"), false),
        )
    }

    #[test]
    fn test_scope_exits_on_drop() {
        let scope = SessionScope::new();
        {
            let scoped = scope.enter(session());
            assert_eq!(scope.active(), 1);
            assert!(scoped.projects.is_empty());
        }
        assert_eq!(scope.active(), 0);
    }

    #[test]
    fn test_scope_exits_on_panic() {
        let scope = SessionScope::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _scoped = scope.enter(session());
            panic!("goal failed");
        }));
        assert!(result.is_err());
        assert_eq!(scope.active(), 0);
    }

    #[test]
    fn test_for_module_selects_single_project() {
        let a = Arc::new(ForeignModule::new(
            Coordinate::new("org.example", "a", "1.0"),
            "jar",
            PathBuf::from("/work/a/pom.xml"),
        ));
        let b = Arc::new(ForeignModule::new(
            Coordinate::new("org.example", "b", "1.0"),
            "jar",
            PathBuf::from("/work/b/pom.xml"),
        ));
        let mut discovery = session();
        discovery.projects = vec![Arc::clone(&a), Arc::clone(&b)];
        discovery.all_projects = discovery.projects.clone();

        let per_module = discovery.for_module(ExecutionRequest::default(), Arc::clone(&b));
        assert_eq!(per_module.projects.len(), 1);
        assert_eq!(per_module.projects[0].coordinate().artifact(), "b");
        assert_eq!(per_module.all_projects.len(), 2);
    }
}

//! Test utilities for include-maven unit tests.
//!
//! [`FakeEngine`] is a scripted [`ForeignEngine`]: it hands out the modules
//! it was given, builds the real dependency graph over them and records
//! every goal execution instead of running a build.
//!
//! # Example
//!
//! ```rust,ignore
//! use include_maven::test_support::{jar_module, FakeEngine};
//!
//! let engine = FakeEngine::new(root, vec![jar_module("core")])
//!     .with_goal_failure("org.example:core", "compilation failure");
//! ```

pub mod fixtures;

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::core::ForeignModule;
use crate::engine::pom_engine::build_graph;
use crate::engine::{
    ComponentRegistry, EngineError, ExecutionRequest, ExecutionResult, ForeignEngine, GraphResult,
    ModelProblem, RepositorySession, ScopedSession, Session, SessionScope,
};

pub use fixtures::*;

/// One recorded call of [`ForeignEngine::execute_goals`].
#[derive(Debug, Clone)]
pub struct ExecutionRecord {
    pub projects: Vec<String>,
    pub selected_projects: Vec<String>,
    pub goals: Vec<String>,
    pub recursive: bool,
    pub user_properties: BTreeMap<String, String>,
    /// Number of entered scopes while the goals ran
    pub active_scopes: usize,
}

/// Scripted engine for tests.
#[derive(Debug)]
pub struct FakeEngine {
    root: ForeignModule,
    modules: Vec<ForeignModule>,
    problems: Vec<ModelProblem>,
    model_error: Option<String>,
    failures: HashMap<String, Vec<String>>,
    components: ComponentRegistry,
    scope: SessionScope,
    executions: Mutex<Vec<ExecutionRecord>>,
}

impl FakeEngine {
    /// `root` is returned for the root descriptor, `modules` for the reactor.
    pub fn new(root: ForeignModule, modules: Vec<ForeignModule>) -> Self {
        FakeEngine {
            root,
            modules,
            problems: Vec::new(),
            model_error: None,
            failures: HashMap::new(),
            components: ComponentRegistry::new(),
            scope: SessionScope::new(),
            executions: Mutex::new(Vec::new()),
        }
    }

    /// Report `problem` from the graph builder.
    pub fn with_problem(mut self, problem: ModelProblem) -> Self {
        self.problems.push(problem);
        self
    }

    /// Fail model building with a parse error.
    pub fn with_model_error(mut self, message: impl Into<String>) -> Self {
        self.model_error = Some(message.into());
        self
    }

    /// Fail goal execution of the module `group:artifact` with `message`.
    /// Calling this repeatedly adds further failures.
    pub fn with_goal_failure(mut self, ga: &str, message: impl Into<String>) -> Self {
        self.failures
            .entry(ga.to_string())
            .or_default()
            .push(message.into());
        self
    }

    pub fn with_components(mut self, components: ComponentRegistry) -> Self {
        self.components = components;
        self
    }

    /// Every execution so far.
    pub fn executions(&self) -> Vec<ExecutionRecord> {
        self.executions.lock().unwrap().clone()
    }
}

impl ForeignEngine for FakeEngine {
    fn new_repository_session(&self, request: &ExecutionRequest) -> RepositorySession {
        RepositorySession::new(request.local_repository.clone(), request.offline)
    }

    fn build_module(
        &self,
        pom: &std::path::Path,
        _request: &ExecutionRequest,
        _repository: &RepositorySession,
    ) -> Result<ForeignModule, EngineError> {
        if let Some(ref message) = self.model_error {
            return Err(EngineError::Parse {
                path: pom.to_path_buf(),
                message: message.clone(),
            });
        }
        Ok(self.root.clone())
    }

    fn build_reactor(
        &self,
        _pom: &std::path::Path,
        _recursive: bool,
        _request: &ExecutionRequest,
        _repository: &RepositorySession,
    ) -> Result<Vec<ForeignModule>, EngineError> {
        Ok(self.modules.clone())
    }

    fn build_dependency_graph(&self, session: &Session) -> GraphResult {
        let mut result = build_graph(&session.projects);
        result.problems.extend(self.problems.iter().cloned());
        if result.has_errors() {
            result.graph = None;
        }
        result
    }

    fn execute_goals(&self, session: &ScopedSession<'_>) -> ExecutionResult {
        let projects: Vec<String> = session
            .projects
            .iter()
            .map(|m| m.group_artifact().to_string())
            .collect();

        self.executions.lock().unwrap().push(ExecutionRecord {
            projects: projects.clone(),
            selected_projects: session.request.selected_projects.clone(),
            goals: session.request.goals.clone(),
            recursive: session.request.recursive,
            user_properties: session.request.user_properties.clone(),
            active_scopes: self.scope.active(),
        });

        let mut result = ExecutionResult::default();
        for ga in &projects {
            for message in self.failures.get(ga).into_iter().flatten() {
                result.exceptions.push(EngineError::GoalFailed {
                    module: ga.clone(),
                    goals: session.request.goals.clone(),
                    message: message.clone(),
                });
            }
        }
        result
    }

    fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    fn session_scope(&self) -> &SessionScope {
        &self.scope
    }
}

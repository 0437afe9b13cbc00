//! Parallel task execution.
//!
//! Tasks run in waves: every task whose dependencies all succeeded is
//! started on the worker pool, then the next wave is computed from the
//! results. A failed task is never retried, and tasks depending on it are
//! left in [`TaskState::NotRun`].

use std::collections::BTreeMap;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::native::graph::TaskGraph;
use crate::native::project::{BuildModel, TaskPath};
use crate::native::ModelError;

/// Lifecycle of one task within a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    NotRun,
    Running,
    Succeeded,
    Failed,
}

/// Progress reported while the build runs.
///
/// Serialized as one JSON object per line for machine-readable output.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "reason")]
pub enum TaskEvent {
    #[serde(rename = "task-started")]
    TaskStarted { task: String },

    #[serde(rename = "task-finished")]
    TaskFinished {
        task: String,
        success: bool,
        duration_ms: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    #[serde(rename = "build-finished")]
    BuildFinished {
        success: bool,
        duration_ms: u64,
        tasks_run: usize,
    },
}

impl TaskEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// A task that failed, with its cause.
#[derive(Debug)]
pub struct TaskFailure {
    pub task: TaskPath,
    pub error: anyhow::Error,
}

/// Final states of a build.
#[derive(Debug)]
pub struct BuildOutcome {
    pub states: BTreeMap<TaskPath, TaskState>,
    pub failures: Vec<TaskFailure>,
}

impl BuildOutcome {
    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn state(&self, task: &TaskPath) -> TaskState {
        self.states.get(task).copied().unwrap_or(TaskState::NotRun)
    }
}

/// Runs a resolved task graph.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    jobs: Option<usize>,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler::default()
    }

    /// Limit the number of tasks running at once.
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Execute every task of `graph`.
    pub fn run<F>(
        &self,
        model: &BuildModel,
        graph: &TaskGraph,
        on_event: F,
    ) -> Result<BuildOutcome, ModelError>
    where
        F: Fn(&TaskEvent) + Sync,
    {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(jobs) = self.jobs {
            builder = builder.num_threads(jobs);
        }
        let pool = builder.build()?;

        let started = Instant::now();
        let mut states: BTreeMap<TaskPath, TaskState> = graph
            .order()
            .iter()
            .map(|t| (t.clone(), TaskState::NotRun))
            .collect();
        let mut failures = Vec::new();
        let mut tasks_run = 0;

        loop {
            let wave: Vec<&TaskPath> = graph
                .order()
                .iter()
                .filter(|t| states[*t] == TaskState::NotRun)
                .filter(|t| {
                    graph
                        .dependencies_of(t)
                        .iter()
                        .all(|d| states.get(d) == Some(&TaskState::Succeeded))
                })
                .collect();
            if wave.is_empty() {
                break;
            }

            for task in &wave {
                states.insert((*task).clone(), TaskState::Running);
            }
            tracing::debug!("Running {} task(s) in parallel", wave.len());

            let results: Vec<(&TaskPath, anyhow::Result<()>)> = pool.install(|| {
                wave.par_iter()
                    .map(|task| (*task, execute(model, task, &on_event)))
                    .collect()
            });

            for (task, result) in results {
                tasks_run += 1;
                match result {
                    Ok(()) => {
                        states.insert(task.clone(), TaskState::Succeeded);
                    }
                    Err(error) => {
                        tracing::error!("Task {} failed: {:#}", task, error);
                        states.insert(task.clone(), TaskState::Failed);
                        failures.push(TaskFailure {
                            task: task.clone(),
                            error,
                        });
                    }
                }
            }
        }

        on_event(&TaskEvent::BuildFinished {
            success: failures.is_empty(),
            duration_ms: started.elapsed().as_millis() as u64,
            tasks_run,
        });

        Ok(BuildOutcome { states, failures })
    }
}

fn execute<F>(model: &BuildModel, path: &TaskPath, on_event: &F) -> anyhow::Result<()>
where
    F: Fn(&TaskEvent) + Sync,
{
    let started = Instant::now();
    on_event(&TaskEvent::TaskStarted {
        task: path.to_string(),
    });

    let result = match model.task(path)?.action {
        Some(ref action) => action.execute(path),
        None => Ok(()),
    };

    on_event(&TaskEvent::TaskFinished {
        task: path.to_string(),
        success: result.is_ok(),
        duration_ms: started.elapsed().as_millis() as u64,
        error: result.as_ref().err().map(|e| format!("{:#}", e)),
    });
    result
}

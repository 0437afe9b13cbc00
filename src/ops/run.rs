//! Running tasks of the native model.

use anyhow::{bail, Result};

use crate::native::{BuildModel, BuildOutcome, Scheduler, TaskEvent, TaskGraph, TaskPath};

/// Options for running tasks.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Task selectors, `:project:task` or a bare task name
    pub tasks: Vec<String>,

    /// Number of parallel tasks (None = number of CPUs)
    pub jobs: Option<usize>,

    /// Print the execution plan without running anything
    pub dry_run: bool,
}

/// Result of [`run_tasks`].
#[derive(Debug)]
pub enum RunResult {
    Planned(Vec<TaskPath>),
    Ran(BuildOutcome),
}

/// Resolve the selected tasks and everything they depend on, then run them.
pub fn run_tasks<F>(model: &BuildModel, opts: &RunOptions, on_event: F) -> Result<RunResult>
where
    F: Fn(&TaskEvent) + Sync,
{
    if opts.tasks.is_empty() {
        bail!("no tasks selected\nhint: use `include-maven tasks` to see the available tasks");
    }

    let mut requested = Vec::new();
    for selector in &opts.tasks {
        for task in model.select_tasks(selector)? {
            if !requested.contains(&task) {
                requested.push(task);
            }
        }
    }

    let graph = TaskGraph::build(model, &requested)?;
    tracing::info!(
        "Selected {} task(s), {} to run",
        requested.len(),
        graph.len()
    );
    if opts.dry_run {
        return Ok(RunResult::Planned(graph.order().to_vec()));
    }

    let outcome = Scheduler::new()
        .with_jobs(opts.jobs)
        .run(model, &graph, on_event)?;
    Ok(RunResult::Ran(outcome))
}

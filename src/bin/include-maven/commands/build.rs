//! `include-maven build` command

use anyhow::{Context as _, Result};

use crate::cli::BuildArgs;
use crate::commands::Context;
use include_maven::ops::{run_tasks, RunOptions, RunResult};

pub fn execute(args: BuildArgs, ctx: &Context) -> Result<()> {
    let workspace = ctx.load()?;

    // Jobs: CLI > config > None (auto-detect)
    let jobs = args.jobs.or(workspace.config.settings.jobs);

    let mut opts = RunOptions {
        tasks: args.tasks,
        jobs,
        dry_run: true,
    };
    let RunResult::Planned(plan) = run_tasks(&workspace.model, &opts, |_| {})? else {
        return Ok(());
    };
    if args.dry_run {
        for task in &plan {
            println!("{}", task);
        }
        return Ok(());
    }

    opts.dry_run = false;
    ctx.shell.start_progress(plan.len());
    let result = run_tasks(&workspace.model, &opts, |event| ctx.shell.task_event(event))?;

    if let RunResult::Ran(outcome) = result {
        let mut failures = outcome.failures.into_iter();
        if let Some(failure) = failures.next() {
            for other in failures {
                ctx.shell
                    .warn(format!("task '{}' also failed: {:#}", other.task, other.error));
            }
            return Err(failure.error).with_context(|| format!("task '{}' failed", failure.task));
        }
    }
    Ok(())
}

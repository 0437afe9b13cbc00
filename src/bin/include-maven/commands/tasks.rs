//! `include-maven tasks` command

use anyhow::Result;

use crate::cli::TasksArgs;
use crate::commands::Context;
use include_maven::native::{Project, ProjectPath};
use include_maven::ops::{run_tasks, RunOptions, RunResult};

pub fn execute(args: TasksArgs, ctx: &Context) -> Result<()> {
    let workspace = ctx.load()?;
    let model = &workspace.model;

    // A lone project path lists the tasks of that project.
    if let [selector] = args.selectors.as_slice() {
        if let Ok(path) = ProjectPath::parse(selector) {
            if model.contains(&path) {
                print_tasks(model.project(&path)?);
                return Ok(());
            }
        }
    }

    if args.selectors.is_empty() {
        for project in model.projects().filter(|p| !p.tasks.is_empty()) {
            println!("{}", project.path);
            print_tasks(project);
        }
        return Ok(());
    }

    let opts = RunOptions {
        tasks: args.selectors,
        jobs: None,
        dry_run: true,
    };
    if let RunResult::Planned(order) = run_tasks(model, &opts, |_| {})? {
        for task in order {
            println!("{}", task);
        }
    }
    Ok(())
}

fn print_tasks(project: &Project) {
    for task in project.tasks.values() {
        let group = task.group.as_deref().unwrap_or("other");
        match task.description {
            Some(ref description) => println!("  {} ({}) - {}", task.name, group, description),
            None => println!("  {} ({})", task.name, group),
        }
    }
}

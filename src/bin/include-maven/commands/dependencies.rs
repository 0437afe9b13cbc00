//! `include-maven dependencies` command

use anyhow::{bail, Result};

use crate::cli::DependenciesArgs;
use crate::commands::Context;
use include_maven::native::{Configuration, ProjectPath};

pub fn execute(args: DependenciesArgs, ctx: &Context) -> Result<()> {
    let workspace = ctx.load()?;
    let path = ProjectPath::parse(&args.project)?;
    let project = workspace.model.project(&path)?;

    if let Some(ref name) = args.configuration {
        let Some(configuration) = project.configuration(name) else {
            bail!(
                "project '{}' has no configuration `{}`\navailable configurations: {}",
                path,
                name,
                project
                    .configurations
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        };
        print_configuration(configuration);
        return Ok(());
    }

    for configuration in project.configurations.values() {
        if args.all || has_content(configuration) {
            print_configuration(configuration);
        }
    }
    Ok(())
}

fn has_content(configuration: &Configuration) -> bool {
    !configuration.dependencies.is_empty()
        || !configuration.constraints.is_empty()
        || !configuration.artifacts.is_empty()
}

fn print_configuration(configuration: &Configuration) {
    match configuration.description {
        Some(ref description) => println!("{} - {}", configuration.name, description),
        None => println!("{}", configuration.name),
    }
    if !configuration.extends_from.is_empty() {
        println!("  extends {}", configuration.extends_from.join(", "));
    }
    for dependency in &configuration.dependencies {
        println!("  {}", dependency);
    }
    for constraint in &configuration.constraints {
        println!("  constraint {}", constraint);
    }
    for artifact in &configuration.artifacts {
        println!("  artifact {}", artifact.file.display());
    }
    for capability in &configuration.capabilities {
        println!("  capability {}", capability);
    }
}

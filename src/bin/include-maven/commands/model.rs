//! `include-maven model` command

use anyhow::{Context as _, Result};
use serde::Serialize;

use crate::cli::ModelArgs;
use crate::commands::Context;
use include_maven::native::ProjectPath;

pub fn execute(args: ModelArgs, ctx: &Context) -> Result<()> {
    let workspace = ctx.load()?;

    let json = match args.project {
        Some(ref project) => {
            let path = ProjectPath::parse(project)?;
            to_json(workspace.model.project(&path)?, args.pretty)
        }
        None => to_json(&workspace.model, args.pretty),
    }
    .context("failed to serialize the model")?;

    println!("{}", json);
    Ok(())
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

//! `include-maven projects` command

use anyhow::Result;

use crate::cli::ProjectsArgs;
use crate::commands::Context;

pub fn execute(args: ProjectsArgs, ctx: &Context) -> Result<()> {
    let workspace = ctx.load()?;

    for build in &workspace.builds {
        if args.build.as_deref().is_some_and(|b| b != build.name()) {
            continue;
        }

        if !ctx.shell.is_json() {
            println!("{} ({})", build.name(), build.config().root_directory().display());
        }
        for module in build.reactor() {
            let Some(path) = workspace.identities.get(&module.group_artifact()) else {
                continue;
            };
            if ctx.shell.is_json() {
                let line = serde_json::json!({
                    "reason": "project",
                    "build": build.name(),
                    "path": path.as_str(),
                    "coordinate": module.coordinate().to_string(),
                    "packaging": module.packaging(),
                    "descriptor": module.descriptor(),
                });
                println!("{}", line);
            } else {
                println!(
                    "  {} -> {} [{}]",
                    module.coordinate(),
                    path,
                    module.packaging()
                );
            }
        }
    }
    Ok(())
}

//! include-maven CLI - Include multi-module Maven builds as native projects

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use include_maven::util::diagnostic::{emit, Diagnostic};
use include_maven::util::Shell;

mod cli;
mod commands;

use cli::{Cli, Commands, MessageFormat};
use commands::Context;

fn main() {
    let cli = Cli::parse();
    let shell = Shell::from_flags(
        cli.quiet,
        cli.verbose,
        cli.color,
        cli.message_format == MessageFormat::Json,
    );

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("include_maven=debug")
    } else if cli.quiet || shell.is_json() {
        EnvFilter::new("include_maven=error")
    } else {
        EnvFilter::new("include_maven=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli, &shell) {
        if shell.is_json() {
            shell.error(format!("{:#}", e));
        } else {
            emit(&Diagnostic::from_error(&e), shell.use_color());
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    let ctx = Context::new(cli.directory, cli.offline, cli.verbose, cli.quiet, shell);

    match cli.command {
        Commands::Projects(args) => commands::projects::execute(args, &ctx),
        Commands::Dependencies(args) => commands::dependencies::execute(args, &ctx),
        Commands::Tasks(args) => commands::tasks::execute(args, &ctx),
        Commands::Build(args) => commands::build::execute(args, &ctx),
        Commands::Model(args) => commands::model::execute(args, &ctx),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell as CompletionShell;

use include_maven::util::shell::ColorChoice;

/// include-maven - Include multi-module Maven builds as native projects
#[derive(Parser)]
#[command(name = "include-maven")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Print errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto", value_parser = parse_color)]
    pub color: ColorChoice,

    /// Output format for messages
    #[arg(long, global = true, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    /// Workspace root containing include-maven.toml
    #[arg(short = 'C', long, global = true, env = "INCLUDE_MAVEN_ROOT")]
    pub directory: Option<PathBuf>,

    /// Never access remote repositories
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    Human,
    Json,
}

fn parse_color(s: &str) -> Result<ColorChoice, String> {
    s.parse()
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every included module and its project path
    Projects(ProjectsArgs),

    /// Show the translated dependency buckets of a project
    Dependencies(DependenciesArgs),

    /// Show the tasks of a project, or the execution order of tasks
    Tasks(TasksArgs),

    /// Run tasks and everything they depend on
    Build(BuildArgs),

    /// Dump the translated model as JSON
    Model(ModelArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ProjectsArgs {
    /// Only list the projects of this build
    #[arg(long)]
    pub build: Option<String>,
}

#[derive(Args)]
pub struct DependenciesArgs {
    /// Project path, e.g. `:maven:core`
    pub project: String,

    /// Only show this bucket
    #[arg(long)]
    pub configuration: Option<String>,

    /// Also show buckets without dependencies
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct TasksArgs {
    /// A project path (list its tasks) or task selectors (show execution order)
    pub selectors: Vec<String>,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Tasks to run
    #[arg(default_value = "build")]
    pub tasks: Vec<String>,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Show the execution plan without running it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ModelArgs {
    /// Only dump this project
    pub project: Option<String>,

    /// Pretty-print the JSON
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: CompletionShell,
}

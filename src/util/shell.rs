//! Centralized shell output and progress management.
//!
//! Commands report through a [`Shell`] instead of printing directly:
//! - status lines with a right-aligned, colored verb
//! - a task progress bar (via indicatif) while a build runs
//! - one JSON object per line in machine-readable mode
//!
//! Human and JSON output are mutually exclusive.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::native::TaskEvent;

/// Shell output mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellMode {
    Human {
        verbosity: Verbosity,
        color: ColorChoice,
    },
    Json,
}

impl Default for ShellMode {
    fn default() -> Self {
        ShellMode::Human {
            verbosity: Verbosity::Normal,
            color: ColorChoice::Auto,
        }
    }
}

/// Output verbosity level (Human mode only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// --quiet: errors only, no progress
    Quiet,
    #[default]
    Normal,
    /// --verbose: one line per task instead of a progress bar
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

/// Semantic status of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Including,
    Configured,
    Running,
    Finished,
    Failed,
    Warning,
    Error,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Including => "Including",
            Status::Configured => "Configured",
            Status::Running => "Running",
            Status::Finished => "Finished",
            Status::Failed => "Failed",
            Status::Warning => "Warning",
            Status::Error => "error",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Configured | Status::Finished => "\x1b[1;32m",
            Status::Including | Status::Running => "\x1b[1;36m",
            Status::Warning => "\x1b[1;33m",
            Status::Failed | Status::Error => "\x1b[1;31m",
        }
    }
}

const STATUS_WIDTH: usize = 12;

/// Central shell for all CLI output.
#[derive(Debug)]
pub struct Shell {
    mode: ShellMode,
    use_color: bool,
    /// Set while a progress bar owns the terminal
    progress: Mutex<Option<ProgressBar>>,
}

impl Shell {
    pub fn new(mode: ShellMode) -> Self {
        let use_color = match &mode {
            ShellMode::Json => false,
            ShellMode::Human { color, .. } => match color {
                ColorChoice::Auto => io::stderr().is_terminal(),
                ColorChoice::Always => true,
                ColorChoice::Never => false,
            },
        };

        Shell {
            mode,
            use_color,
            progress: Mutex::new(None),
        }
    }

    /// Create a shell from CLI flags. JSON mode takes precedence over
    /// quiet and verbose.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice, json: bool) -> Self {
        let mode = if json {
            ShellMode::Json
        } else {
            let verbosity = if quiet {
                Verbosity::Quiet
            } else if verbose {
                Verbosity::Verbose
            } else {
                Verbosity::Normal
            };
            ShellMode::Human { verbosity, color }
        };
        Shell::new(mode)
    }

    pub fn is_quiet(&self) -> bool {
        matches!(
            self.mode,
            ShellMode::Human {
                verbosity: Verbosity::Quiet,
                ..
            }
        )
    }

    pub fn is_verbose(&self) -> bool {
        matches!(
            self.mode,
            ShellMode::Human {
                verbosity: Verbosity::Verbose,
                ..
            }
        )
    }

    pub fn is_json(&self) -> bool {
        matches!(self.mode, ShellMode::Json)
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Print `{status:>12} {message}` to stderr.
    ///
    /// In quiet mode only errors are printed, in JSON mode nothing is.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_json() || (self.is_quiet() && status != Status::Error) {
            return;
        }
        let line = format!("{} {}", self.format_status(status), msg);
        match self.progress.lock().ok().and_then(|p| p.clone()) {
            Some(pb) => pb.println(line),
            None => eprintln!("{}", line),
        }
    }

    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    /// Print an error, as a JSON object in JSON mode.
    pub fn error(&self, msg: impl Display) {
        if self.is_json() {
            let event = serde_json::json!({
                "reason": "error",
                "message": msg.to_string()
            });
            println!("{}", event);
        } else {
            self.status(Status::Error, msg);
        }
    }

    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();
        if self.use_color {
            format!(
                "{}{:>width$}\x1b[0m",
                status.color_code(),
                text,
                width = STATUS_WIDTH
            )
        } else {
            format!("{:>width$}", text, width = STATUS_WIDTH)
        }
    }

    /// Start the progress bar of a build running `total` tasks.
    pub fn start_progress(&self, total: usize) {
        if self.is_quiet() || self.is_verbose() || self.is_json() || total < 2 {
            return;
        }
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("Building");
        if let Ok(mut slot) = self.progress.lock() {
            *slot = Some(pb);
        }
    }

    /// Report a scheduler event.
    pub fn task_event(&self, event: &TaskEvent) {
        if self.is_json() {
            println!("{}", event.to_json());
            let _ = io::stdout().flush();
            return;
        }

        match event {
            TaskEvent::TaskStarted { task } => {
                if self.is_verbose() {
                    self.status(Status::Running, task);
                }
            }
            TaskEvent::TaskFinished {
                task,
                success,
                error,
                ..
            } => {
                if !success {
                    let reason = error.as_deref().unwrap_or("unknown error");
                    self.status(Status::Failed, format!("{} ({})", task, reason));
                }
                if let Some(pb) = self.progress.lock().ok().and_then(|p| p.clone()) {
                    pb.inc(1);
                }
            }
            TaskEvent::BuildFinished {
                success,
                duration_ms,
                tasks_run,
            } => {
                if let Some(pb) = self.progress.lock().ok().and_then(|mut p| p.take()) {
                    pb.finish_and_clear();
                }
                let elapsed = format_duration(Duration::from_millis(*duration_ms));
                if *success {
                    self.status(
                        Status::Finished,
                        format!("{} task(s) in {}", tasks_run, elapsed),
                    );
                } else {
                    self.status(Status::Failed, format!("build after {}", elapsed));
                }
            }
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(ShellMode::default())
    }
}

/// Format a duration in a human-readable way.
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

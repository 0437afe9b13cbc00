//! Shared utilities

pub mod config;
pub mod diagnostic;
pub mod fs;
pub mod process;
pub mod shell;
pub mod text;

pub use config::IncludeConfig;
pub use diagnostic::Diagnostic;
pub use shell::Shell;

//! Shared types and helpers for CLI commands.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::config::Config;
use crate::services::hierarchy::DeviceTrees;
use crate::services::session::{Session, SessionOptions};

/// Process exit codes used by every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command succeeded
    Success = 0,
    /// Invalid input or a failed check
    ValidationError = 1,
    /// File system or serialization failure
    IoError = 2,
}

impl ExitCode {
    /// Numeric code passed to the OS.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Error returned by command handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    /// Exit code the process ends with
    pub kind: ExitCode,
    /// Message printed to stderr
    pub message: String,
}

impl CliError {
    /// Invalid input or failed check (exit code 1).
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ExitCode::ValidationError,
            message: message.into(),
        }
    }

    /// File system or serialization failure (exit code 2).
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: ExitCode::IoError,
            message: message.into(),
        }
    }

    /// Exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        self.kind
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for command handlers.
pub type CliResult<T> = Result<T, CliError>;

/// Loads the application config, mapping failures to validation errors.
pub fn load_config() -> CliResult<Config> {
    Config::load().map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))
}

/// Builds a session from the config, optionally overriding the option-tree source.
///
/// An explicit `option_trees` path must exist; the configured default
/// profile falls back to the built-in trees when unreadable.
pub fn load_session(option_trees: Option<&Path>) -> CliResult<Session> {
    let config = load_config()?;

    match option_trees {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::io(format!(
                    "Option tree file not found: {}",
                    path.display()
                )));
            }
            let trees = DeviceTrees::load_or_fallback(Some(path));
            Ok(Session::new(trees, SessionOptions::from_config(&config)))
        }
        None => Ok(Session::from_config(&config)),
    }
}

/// Prints a value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;
    println!("{json}");
    Ok(())
}

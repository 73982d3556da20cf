//! CLI command handlers for JoyMapper.
//!
//! Headless, scriptable access to option trees, curves and profiles for
//! automation and testing.

pub mod common;
pub mod config;
pub mod curve;
pub mod export;
pub mod import;
pub mod tree;

// Re-export types used by main.rs and tests
pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use curve::CurveArgs;
pub use export::{ExportArgs, ExportFormat};
pub use import::ImportArgs;
pub use tree::TreeArgs;

//! Export command for turning a profile into sync payloads or action-map XML.

use crate::cli::common::{load_session, CliError, CliResult};
use crate::parser::actionmaps::{controls_to_actionmaps, generate_options_xml};
use crate::services::ProfileService;
use clap::{Args, ValueEnum};
use std::fs;
use std::path::PathBuf;

/// Output format for exported profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Flat option lists per device instance (JSON)
    Flat,
    /// `<options>` blocks for the game's actionmaps.xml
    Actionmaps,
}

/// Export a profile as flat lists or action-map options
#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Profile file (.sccontrols)
    #[arg(value_name = "PROFILE")]
    pub profile: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Flat)]
    pub format: ExportFormat,

    /// Write to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Option tree source used to resolve option paths
    #[arg(long, value_name = "FILE")]
    pub option_trees: Option<PathBuf>,
}

impl ExportArgs {
    /// Execute the export command
    pub fn execute(&self) -> CliResult<()> {
        let profile = ProfileService::load(&self.profile)
            .map_err(|e| CliError::io(format!("Failed to load profile: {e:#}")))?;

        let content = match self.format {
            ExportFormat::Flat => {
                let mut session = load_session(self.option_trees.as_deref())?;
                ProfileService::apply(&mut session, &profile);
                let mut json = serde_json::to_string_pretty(&session.to_flat_groups())
                    .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;
                json.push('\n');
                json
            }
            ExportFormat::Actionmaps => controls_to_actionmaps(&profile)
                .iter()
                .map(generate_options_xml)
                .collect::<String>(),
        };

        match &self.output {
            Some(path) => {
                fs::write(path, content)
                    .map_err(|e| CliError::io(format!("Failed to write output file: {e}")))?;
                println!("Exported {} to {}", profile.profile_name, path.display());
            }
            None => print!("{content}"),
        }

        Ok(())
    }
}

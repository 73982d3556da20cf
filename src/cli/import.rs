//! Import command for reading device options out of actionmaps.xml.

use crate::cli::common::{load_config, load_session, print_json, CliError, CliResult};
use crate::parser::actionmaps::{actionmaps_to_flat_groups, parse_actionmaps_options};
use crate::services::ProfileService;
use clap::Args;
use std::fs;
use std::path::PathBuf;

/// Import device options from an actionmaps.xml into a profile
#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    /// actionmaps.xml to read
    #[arg(value_name = "FILE")]
    pub actionmaps: PathBuf,

    /// Profile name
    #[arg(short, long)]
    pub name: String,

    /// Profile file to write (defaults to <profiles_dir>/<name>.sccontrols)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the imported flat lists instead of saving a profile
    #[arg(long)]
    pub flat: bool,

    /// Option tree source used to resolve option paths
    #[arg(long, value_name = "FILE")]
    pub option_trees: Option<PathBuf>,
}

impl ImportArgs {
    /// Execute the import command
    pub fn execute(&self) -> CliResult<()> {
        if self.name.trim().is_empty() {
            return Err(CliError::validation("Profile name must not be empty"));
        }

        let xml = fs::read_to_string(&self.actionmaps).map_err(|e| {
            CliError::io(format!("Failed to read {}: {e}", self.actionmaps.display()))
        })?;
        let devices = parse_actionmaps_options(&xml)
            .map_err(|e| CliError::validation(format!("Invalid actionmaps file: {e:#}")))?;
        let groups = actionmaps_to_flat_groups(&devices);

        let mut session = load_session(self.option_trees.as_deref())?;
        session.apply_flat_groups(&groups);

        if self.flat {
            return print_json(&session.to_flat_groups());
        }

        let path = match &self.output {
            Some(path) => path.clone(),
            None => {
                let dir = load_config()?
                    .profiles_dir()
                    .map_err(|e| CliError::io(format!("{e:#}")))?;
                ProfileService::path_for(&dir, &self.name)
            }
        };

        ProfileService::save_session(&mut session, &self.name, &path)
            .map_err(|e| CliError::io(format!("Failed to save profile: {e:#}")))?;

        println!(
            "Imported {} device instance(s) into {}",
            groups.len(),
            path.display()
        );
        Ok(())
    }
}

//! Configuration management CLI commands.

use crate::cli::common::{load_config, print_json, CliError, CliResult};
use crate::config::Config;
use clap::{Args, Subcommand};

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Set a configuration value
    Set(ConfigSetArgs),
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Set a configuration value
#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// Dotted key: paths.default_profile, paths.profiles_dir, sync.debounce_ms,
    /// or display.show_curves_section
    #[arg(value_name = "KEY")]
    key: String,

    /// New value; an empty string clears a path
    #[arg(value_name = "VALUE")]
    value: String,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(),
            ConfigCommand::Set(args) => args.execute(),
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_config()?;

        if self.json {
            print_json(&config)
        } else {
            output_human_readable(&config);
            Ok(())
        }
    }
}

impl ConfigSetArgs {
    /// Execute set command
    pub fn execute(&self) -> CliResult<()> {
        let mut config = Config::load().unwrap_or_default();

        config
            .set_value(&self.key, &self.value)
            .map_err(|e| CliError::validation(format!("{e:#}")))?;

        config
            .save()
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;

        println!("Configuration updated successfully.");
        Ok(())
    }
}

fn output_human_readable(config: &Config) {
    println!("JoyMapper Configuration");
    println!("=======================");
    println!();

    println!("Paths:");
    match &config.paths.default_profile {
        Some(path) => println!("  Default Profile: {}", path.display()),
        None => println!("  Default Profile: (built-in option trees)"),
    }
    match config.profiles_dir() {
        Ok(dir) => println!("  Profiles Directory: {}", dir.display()),
        Err(_) => println!("  Profiles Directory: (unavailable)"),
    }
    println!();

    println!("Sync:");
    println!("  Debounce: {} ms", config.sync.debounce_ms);
    println!();

    println!("Display:");
    println!("  Show Curves Section: {}", config.display.show_curves_section);
    println!();
}

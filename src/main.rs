//! JoyMapper - axis inversion and response-curve editor
//!
//! Inspects the game's option trees, evaluates response curves, and converts
//! profiles between `.sccontrols`, flat sync lists and `actionmaps.xml`.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use joymapper::cli::{ConfigArgs, CurveArgs, ExportArgs, ImportArgs, TreeArgs};
use joymapper::constants::APP_BINARY_NAME;

/// JoyMapper - axis inversion and response-curve editor
#[derive(Parser, Debug)]
#[command(name = APP_BINARY_NAME, author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the option tree of a device class
    Tree(TreeArgs),
    /// Evaluate an exponent or response curve
    Curve(CurveArgs),
    /// Export a profile as flat lists or action-map options
    Export(ExportArgs),
    /// Import device options from an actionmaps.xml
    Import(ImportArgs),
    /// Show or change configuration
    Config(ConfigArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match &cli.command {
        Command::Tree(args) => args.execute(),
        Command::Curve(args) => args.execute(),
        Command::Export(args) => args.execute(),
        Command::Import(args) => args.execute(),
        Command::Config(args) => args.execute(),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e.message);
            std::process::ExitCode::from(e.exit_code().code())
        }
    }
}

//! cloud-patrol CLI tool.
//!
//! Usage:
//! ```bash
//! cloud-patrol check [OPTIONS] [TREE]
//! cloud-patrol list-policies
//! ```
//!
//! Exit codes: `0` clean, `1` violations found, `2` fatal error.

use anyhow::Result;
use clap::builder::FalseyValueParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Compliance audits for declarative cloud resource trees
#[derive(Parser)]
#[command(name = "cloud-patrol")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit a resource tree
    Check {
        /// Resource tree to audit
        #[arg(default_value = "resources.toml")]
        tree: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Annotate resources for a host environment instead of printing
        /// the grouped report
        #[arg(long, env = "CLOUD_PATROL_HOST", value_parser = FalseyValueParser::new())]
        host: bool,

        /// Disable ANSI colors
        #[arg(long, env = "NO_COLOR", value_parser = FalseyValueParser::new())]
        no_color: bool,
    },

    /// List available policies and presets
    ListPolicies {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Output format for reports and listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::from(1),
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(2)
        }
    }
}

/// Runs the selected command; `Ok(true)` means violations were found.
fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Check {
            tree,
            format,
            host,
            no_color,
        } => {
            let options = commands::check::CheckOptions {
                format,
                host,
                color: !no_color && format == OutputFormat::Text,
            };
            commands::check::run(&tree, cli.config.as_deref(), &options)
        }
        Commands::ListPolicies { format } => {
            commands::list_policies::run(format)?;
            Ok(false)
        }
    }
}

//! CLI parse: clap types for clusterconf. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// clusterconf - render cluster agent configuration and notify its service
#[derive(Parser)]
#[command(name = "clusterconf")]
#[command(about = "Render cluster agent configuration and notify its service on change")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (settings are read from <workspace>/config/)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Settings file path (overrides default settings loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the rendered agent config to stdout
    Render {
        /// Pretty-print regardless of settings
        #[arg(long)]
        pretty: bool,
        /// Indent width for pretty output (implies --pretty)
        #[arg(long)]
        indent: Option<usize>,
    },
    /// Show derived fields (data dir, RPC port, RPC address) and host facts
    Derive {
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Write the config file and notify the service if it changed
    Apply {
        /// Report what would change without writing or notifying
        #[arg(long)]
        dry_run: bool,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Validate settings
    Validate,
}

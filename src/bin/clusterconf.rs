//! clusterconf CLI Binary
//!
//! Command-line interface for rendering cluster agent configuration.

use clap::Parser;
use clusterconf::cli::{Cli, RunContext};
use clusterconf::config::ConfigLoader;
use clusterconf::logging::{init_logging, LogOverrides, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    // Build logging config from CLI args, env vars, and settings file
    let logging_config = build_logging_config(&cli);
    let overrides = build_log_overrides(&cli);

    if let Err(e) = init_logging(Some(&logging_config), &overrides) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("clusterconf starting");

    let context = match RunContext::new(cli.workspace.clone(), cli.config.clone()) {
        Ok(ctx) => {
            info!("Settings loaded");
            ctx
        }
        Err(e) => {
            error!("Error loading settings: {}", e);
            eprintln!("{}", clusterconf::cli::map_error(&e));
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => {
            info!("Command completed successfully");
            println!("{}", output);
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", clusterconf::cli::map_error(&e));
            process::exit(1);
        }
    }
}

/// Build logging configuration from CLI args and settings file.
/// Precedence: CLI flags override settings file override defaults.
/// Logging stays off unless --verbose or --log-level is given.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    if !cli.verbose && cli.log_level.is_none() {
        return LoggingConfig {
            level: "off".to_string(),
            ..LoggingConfig::default()
        };
    }

    let mut config = if let Some(ref config_path) = cli.config {
        ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    } else {
        ConfigLoader::load(&cli.workspace)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    };

    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }

    config
}

/// Logging values taken from CLI flags, which beat the CLUSTERCONF_LOG* variables.
fn build_log_overrides(cli: &Cli) -> LogOverrides {
    LogOverrides {
        level: cli
            .log_level
            .clone()
            .or_else(|| cli.verbose.then(|| "debug".to_string())),
        format: cli.log_format.clone(),
        output: cli.log_output.clone(),
    }
}

//! CLI command-name contract for logging.

use crate::cli::parse::Commands;

/// Command name string for log spans (e.g. "render", "apply").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Render { .. } => "render",
        Commands::Derive { .. } => "derive",
        Commands::Apply { .. } => "apply",
        Commands::Validate => "validate",
    }
}

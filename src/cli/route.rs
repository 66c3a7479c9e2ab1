//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::parse::{Commands, OutputFormat};
use crate::cli::presentation::{
    format_derived_json, format_derived_text, format_report_json, format_report_text,
    format_validation_ok,
};
use crate::cli::command_name;
use crate::config::{ConfigLoader, ProvisionConfig};
use crate::error::ApiError;
use crate::facts::{FactsProvider, SystemFacts};
use crate::provision::Provisioner;
use crate::render::{render, RenderOptions, MAX_INDENT};
use crate::resolver::resolve;
use crate::service::{ServiceManager, SystemdService};
use std::path::PathBuf;
use tracing::{debug, info_span};

/// Runtime context for CLI execution: loaded settings plus the host collaborators.
pub struct RunContext {
    settings: ProvisionConfig,
    facts: Box<dyn FactsProvider>,
    service: Box<dyn ServiceManager>,
}

impl RunContext {
    /// Create run context from workspace root and optional settings path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let settings = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Ok(Self::with_collaborators(
            settings,
            Box::new(SystemFacts::new()),
            Box::new(SystemdService::new()),
        ))
    }

    /// Build a context from already-loaded settings and explicit collaborators.
    pub fn with_collaborators(
        settings: ProvisionConfig,
        facts: Box<dyn FactsProvider>,
        service: Box<dyn ServiceManager>,
    ) -> Self {
        Self {
            settings,
            facts,
            service,
        }
    }

    pub fn settings(&self) -> &ProvisionConfig {
        &self.settings
    }

    /// Execute a command and return its stdout text.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let span = info_span!("command", name = command_name(command));
        let _enter = span.enter();
        debug!("Dispatching command");

        match command {
            Commands::Render { pretty, indent } => self.handle_render(*pretty, *indent),
            Commands::Derive { format } => self.handle_derive(*format),
            Commands::Apply { dry_run, format } => self.handle_apply(*dry_run, *format),
            Commands::Validate => self.handle_validate(),
        }
    }

    fn handle_render(&self, pretty: bool, indent: Option<usize>) -> Result<String, ApiError> {
        self.validated()?;
        if let Some(width) = indent.filter(|w| *w > MAX_INDENT) {
            return Err(ApiError::ValidationFailed(vec![format!(
                "--indent: {} exceeds maximum of {}",
                width, MAX_INDENT
            )]));
        }
        let defaults = self.settings.render_options();
        let options = RenderOptions {
            pretty: pretty || indent.is_some() || defaults.pretty,
            indent: indent.unwrap_or(defaults.indent),
        };
        let resolved = resolve(&self.settings.config_defaults, &self.settings.config_hash);
        let rendered = render(&resolved, &options)?;
        Ok(rendered.trim_end_matches('\n').to_string())
    }

    fn handle_derive(&self, format: OutputFormat) -> Result<String, ApiError> {
        let resolution = self.provisioner().resolve(&self.settings)?;
        match format {
            OutputFormat::Text => Ok(format_derived_text(&resolution)),
            OutputFormat::Json => Ok(format_derived_json(&resolution)?),
        }
    }

    fn handle_apply(&self, dry_run: bool, format: OutputFormat) -> Result<String, ApiError> {
        let report = self.provisioner().run(&self.settings, dry_run)?;
        match format {
            OutputFormat::Text => Ok(format_report_text(&report)),
            OutputFormat::Json => Ok(format_report_json(&report)?),
        }
    }

    fn handle_validate(&self) -> Result<String, ApiError> {
        self.validated()?;
        Ok(format_validation_ok(&self.settings))
    }

    fn validated(&self) -> Result<(), ApiError> {
        self.settings.validate().map_err(|errors| {
            ApiError::ValidationFailed(errors.iter().map(|e| e.to_string()).collect())
        })
    }

    fn provisioner(&self) -> Provisioner<'_> {
        Provisioner::new(self.facts.as_ref(), self.service.as_ref())
    }
}

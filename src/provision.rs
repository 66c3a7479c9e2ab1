//! Provisioning pipeline
//!
//! One run is a fixed sequence of stages; each must succeed before the next starts:
//!
//! ```text
//! gather facts -> resolve -> derive -> prepare data dir -> write config -> notify service
//! ```
//!
//! Nothing is cached between runs. Every run recomputes from the settings it is given,
//! and the only state carried over is the config file on disk.

use crate::config::ProvisionConfig;
use crate::download::download_url;
use crate::error::ApiError;
use crate::facts::{FactsProvider, HostFacts, PinnedFacts};
use crate::render::{self, WriteOutcome};
use crate::resolver::{derive_fields, resolve, DerivedFields, ResolvedConfig};
use crate::service::{ServiceAction, ServiceManager};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    GatherFacts,
    Resolve,
    Derive,
    PrepareDataDir,
    WriteConfig,
    NotifyService,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::GatherFacts => "gather_facts",
            Stage::Resolve => "resolve",
            Stage::Derive => "derive",
            Stage::PrepareDataDir => "prepare_data_dir",
            Stage::WriteConfig => "write_config",
            Stage::NotifyService => "notify_service",
        }
    }
}

/// Outcome of one provisioning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub dry_run: bool,
    pub config_path: PathBuf,
    /// Stages that ran, in order. Skipped stages are absent.
    pub stages: Vec<Stage>,
    pub facts: HostFacts,
    pub derived: DerivedFields,
    pub download_url: String,
    pub data_dir_created: bool,
    /// In a dry run, what a real run would have done to the file.
    pub write: WriteOutcome,
    /// Notification sent (or, in a dry run, that would be sent).
    pub notified: Option<ServiceAction>,
}

/// Everything computed before any side effect.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub facts: HostFacts,
    pub resolved: ResolvedConfig,
    pub derived: DerivedFields,
    pub download_url: String,
}

/// Runs the pipeline against a facts provider and a service manager.
pub struct Provisioner<'a> {
    facts: &'a dyn FactsProvider,
    service: &'a dyn ServiceManager,
}

impl<'a> Provisioner<'a> {
    pub fn new(facts: &'a dyn FactsProvider, service: &'a dyn ServiceManager) -> Self {
        Self { facts, service }
    }

    /// Gather facts, merge the maps and derive fields. No side effects beyond fact lookups.
    pub fn resolve(&self, settings: &ProvisionConfig) -> Result<Resolution, ApiError> {
        let pinned = PinnedFacts::new(&settings.facts, self.facts);
        let facts = HostFacts::gather(&pinned)?;

        let resolved = resolve(&settings.config_defaults, &settings.config_hash);
        debug!(keys = resolved.as_map().len(), "Resolved configuration");

        let derived = derive_fields(&resolved, &facts);
        debug!(
            rpc_port = derived.rpc_port,
            rpc_addr = %derived.rpc_addr,
            data_dir = ?derived.data_dir,
            "Derived fields"
        );

        let download_url = download_url(
            &settings.download_url_base,
            &settings.package_name,
            &settings.version,
            &facts,
            &settings.download_extension,
        );

        Ok(Resolution {
            facts,
            resolved,
            derived,
            download_url,
        })
    }

    /// Execute every stage in order. With `dry_run`, nothing is written and the service
    /// is not contacted; the report describes what would happen.
    pub fn run(&self, settings: &ProvisionConfig, dry_run: bool) -> Result<RunReport, ApiError> {
        let span = info_span!("provision", dry_run, service = %settings.service_name);
        let _enter = span.enter();

        settings.validate().map_err(|errors| {
            ApiError::ValidationFailed(errors.iter().map(|e| e.to_string()).collect())
        })?;

        let started_at = Utc::now();
        let mut stages = Vec::new();

        let Resolution {
            facts,
            resolved,
            derived,
            download_url,
        } = self.resolve(settings)?;
        stages.extend([Stage::GatherFacts, Stage::Resolve, Stage::Derive]);

        let mut data_dir_created = false;
        if settings.manage_data_dir {
            if let Some(ref data_dir) = derived.data_dir {
                let dir = Path::new(data_dir);
                data_dir_created = if dry_run {
                    !dir.is_dir()
                } else {
                    render::ensure_dir(dir)?
                };
                stages.push(Stage::PrepareDataDir);
            } else {
                debug!("manage_data_dir set but no data_dir in resolved config; skipping");
            }
        }

        let config_path = settings.config_path();
        let content = render::render(&resolved, &settings.render_options())?;
        let write = if dry_run {
            preview_outcome(&config_path, &content)?
        } else {
            let mode = render::parse_mode(&settings.config_mode)?;
            render::write_if_changed(&config_path, &content, Some(mode))?
        };
        stages.push(Stage::WriteConfig);

        let notified = match settings.notify_action() {
            Some(action) if write.changed() => {
                if !dry_run {
                    self.service.notify(&settings.service_name, action)?;
                }
                stages.push(Stage::NotifyService);
                Some(action)
            }
            Some(_) => {
                debug!("Config unchanged; service not notified");
                None
            }
            None => {
                if write.changed() {
                    warn!(
                        service = %settings.service_name,
                        "Config changed but service notification is disabled"
                    );
                }
                None
            }
        };

        info!(
            config_path = %config_path.display(),
            write = write.as_str(),
            notified = ?notified,
            "Provisioning run complete"
        );

        Ok(RunReport {
            started_at,
            dry_run,
            config_path,
            stages,
            facts,
            derived,
            download_url,
            data_dir_created,
            write,
            notified,
        })
    }
}

/// What `write_if_changed` would report, without writing.
fn preview_outcome(path: &Path, content: &str) -> Result<WriteOutcome, ApiError> {
    match fs::read(path) {
        Ok(bytes) if bytes == content.as_bytes() => Ok(WriteOutcome::Unchanged),
        Ok(_) => Ok(WriteOutcome::Updated),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(WriteOutcome::Created),
        Err(e) => Err(ApiError::StorageError(e.into())),
    }
}

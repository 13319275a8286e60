use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::config::SwitchConfig;
use crate::contract::model::{
    DiscoveryStrategy, LicenseRecord, RunOptions, RunResult, RunStatus, SwitchRequest,
    UserRecord,
};
use crate::domain::catalog::LicenseCatalog;
use crate::domain::discovery::DiscoveryEngine;
use crate::domain::error::DomainError;
use crate::domain::executor::{SwitchExecutor, SwitchOutcome};
use crate::domain::phase::{PhaseTracker, RunPhase};
use crate::domain::ports::{ConfirmPort, DirectoryPort, ExportBatch, ExportPort};
use crate::domain::report;
use crate::domain::sampler;
use crate::domain::validator::{self, ResolvedSwitch};

/// Tunables the service needs from the module config.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub delay: Duration,
    pub page_size: u32,
    pub max_test_users: usize,
    pub export_dir: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from(&SwitchConfig::default())
    }
}

impl From<&SwitchConfig> for ServiceConfig {
    fn from(cfg: &SwitchConfig) -> Self {
        Self {
            delay: cfg.delay,
            page_size: cfg.effective_page_size(),
            max_test_users: cfg.max_test_users,
            export_dir: cfg.export_dir.clone(),
        }
    }
}

/// Domain service driving one license switch run through its phases.
pub struct Service {
    directory: Arc<dyn DirectoryPort>,
    exporter: Arc<dyn ExportPort>,
    confirm: Arc<dyn ConfirmPort>,
    config: ServiceConfig,
}

impl Service {
    pub fn new(
        directory: Arc<dyn DirectoryPort>,
        exporter: Arc<dyn ExportPort>,
        confirm: Arc<dyn ConfirmPort>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            directory,
            exporter,
            confirm,
            config,
        }
    }

    #[instrument(name = "license_switch.service.list_licenses", skip(self))]
    pub async fn list_licenses(&self) -> Result<Vec<LicenseRecord>, DomainError> {
        self.connect().await?;
        let catalog = LicenseCatalog::fetch(self.directory.as_ref()).await?;
        Ok(catalog.into_records())
    }

    #[instrument(
        name = "license_switch.service.run",
        skip(self, request, options),
        fields(
            source = %request.source(),
            destination = %request.destination(),
            preview = options.preview,
            test_mode = options.test_mode
        )
    )]
    pub async fn run(
        &self,
        request: SwitchRequest,
        options: RunOptions,
    ) -> Result<RunResult, DomainError> {
        let started = Instant::now();
        let mut phase = PhaseTracker::new();

        self.connect().await?;
        phase.advance(RunPhase::Connected);

        let catalog = LicenseCatalog::fetch(self.directory.as_ref()).await?;
        phase.advance(RunPhase::CatalogFetched);

        let switch = validator::validate(&catalog, &request)?;
        info!(%switch, "licenses validated");
        phase.advance(RunPhase::Validated);

        let discovery = DiscoveryEngine::new(self.directory.clone(), self.config.page_size)
            .discover(&switch.source)
            .await?;
        phase.advance(RunPhase::Discovered);

        let mut result = RunResult {
            status: RunStatus::Completed,
            source_license: switch.source.sku_name.clone(),
            destination_license: switch.destination.sku_name.clone(),
            total_discovered: discovery.users.len(),
            total_processed: 0,
            success_count: 0,
            failure_count: 0,
            failures: Vec::new(),
            export_file_path: None,
            discovery_strategy: Some(discovery.strategy),
            search_duration: discovery.elapsed,
            total_duration: Duration::ZERO,
        };

        if discovery.users.is_empty() {
            info!(sku = %switch.source.sku_name, "no users hold the source license");
            result.status = RunStatus::NoUsers;
            return Ok(self.finish(result, &mut phase, started));
        }

        let users = if options.test_mode {
            let cap = self.test_cap(&options);
            let sample = sampler::sample(discovery.users, cap);
            info!(
                discovered = sample.original_count,
                sampled = sample.sampled_count(),
                "test mode: processing a subset of users"
            );
            phase.advance(RunPhase::Sampled);
            sample.items
        } else {
            discovery.users
        };

        let exported_at = Utc::now();
        result.export_file_path = self.export(&users, &switch, &options, exported_at);
        phase.advance(RunPhase::Exported);

        if options.preview {
            info!("preview mode: no assignments will be changed");
        } else if !self.confirmed(&users, &switch, discovery.strategy)? {
            info!("operator declined; nothing was changed");
            result.status = RunStatus::Cancelled;
            return Ok(self.finish(result, &mut phase, started));
        }

        phase.advance(RunPhase::Switching);
        let outcome = SwitchExecutor::new(self.directory.clone(), self.config.delay, options.preview)
            .execute(&users, &switch)
            .await;
        apply_outcome(&mut result, outcome);
        if options.preview {
            result.status = RunStatus::Simulated;
        }

        Ok(self.finish(result, &mut phase, started))
    }

    async fn connect(&self) -> Result<(), DomainError> {
        self.directory
            .connect()
            .await
            .map_err(|e| DomainError::authentication_failed(format!("{e:#}")))
    }

    fn test_cap(&self, options: &RunOptions) -> usize {
        if options.max_test_users == 0 {
            self.config.max_test_users
        } else {
            options.max_test_users
        }
    }

    /// A failed export is only a warning; the run continues without an audit file.
    fn export(
        &self,
        users: &[UserRecord],
        switch: &ResolvedSwitch,
        options: &RunOptions,
        exported_at: DateTime<Utc>,
    ) -> Option<PathBuf> {
        let path = options.export_path.clone().unwrap_or_else(|| {
            default_export_path(&self.config.export_dir, &switch.source.sku_name, exported_at)
        });

        let batch = ExportBatch {
            path: &path,
            users,
            license_name: &switch.source.sku_name,
            exported_at,
        };
        match self.exporter.export(batch) {
            Ok(rows) => {
                info!(rows, path = %path.display(), "exported affected users");
                Some(path)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %format!("{e:#}"), "could not write export file, continuing without it");
                None
            }
        }
    }

    fn confirmed(
        &self,
        users: &[UserRecord],
        switch: &ResolvedSwitch,
        strategy: DiscoveryStrategy,
    ) -> Result<bool, DomainError> {
        let prompt = format!(
            "Switch {} user(s) from {} to {} (found via {})?",
            users.len(),
            switch.source.sku_name,
            switch.destination.sku_name,
            strategy
        );
        self.confirm
            .confirm(&prompt)
            .map_err(|e| DomainError::confirmation_unavailable(format!("{e:#}")))
    }

    fn finish(&self, mut result: RunResult, phase: &mut PhaseTracker, started: Instant) -> RunResult {
        result.total_duration = started.elapsed();
        phase.advance(RunPhase::Reported);
        report::log_summary(&result);
        debug!(phase = %phase.current(), "run finished");
        result
    }
}

fn apply_outcome(result: &mut RunResult, outcome: SwitchOutcome) {
    result.total_processed = outcome.processed;
    result.success_count = outcome.succeeded;
    result.failure_count = outcome.failed();
    result.failures = outcome.failures;
}

/// `<dir>/LicenseSwitch_<sku>_<yyyyMMdd_HHmmss>.csv`
pub fn default_export_path(dir: &std::path::Path, sku_name: &str, at: DateTime<Utc>) -> PathBuf {
    let safe: String = sku_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    dir.join(format!(
        "LicenseSwitch_{}_{}.csv",
        safe,
        at.format("%Y%m%d_%H%M%S")
    ))
}

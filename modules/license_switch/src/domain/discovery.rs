use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use odata_core::PageRequest;
use tracing::{debug, info, instrument, warn};

use crate::contract::model::{DiscoveryStrategy, LicenseRecord, UserRecord};
use crate::domain::error::DomainError;
use crate::domain::ports::DirectoryPort;

/// Users holding the source license, in the order the directory returned them.
#[derive(Debug, Clone)]
pub struct Discovery {
    pub users: Vec<UserRecord>,
    pub strategy: DiscoveryStrategy,
    pub elapsed: Duration,
}

/// Finds every user that holds a given SKU.
///
/// The server-side filter is tried first and its result is re-checked locally.
/// Any error there switches to a paged scan over all licensed users.
pub struct DiscoveryEngine {
    directory: Arc<dyn DirectoryPort>,
    page_size: u32,
}

impl DiscoveryEngine {
    pub fn new(directory: Arc<dyn DirectoryPort>, page_size: u32) -> Self {
        Self {
            directory,
            page_size,
        }
    }

    #[instrument(
        name = "license_switch.discovery",
        skip(self, source),
        fields(sku_id = %source.sku_id, sku_name = %source.sku_name)
    )]
    pub async fn discover(&self, source: &LicenseRecord) -> Result<Discovery, DomainError> {
        let started = Instant::now();

        let primary = match self.server_filtered(&source.sku_id).await {
            Ok(users) => {
                return Ok(self.finish(users, DiscoveryStrategy::ServerFilter, started));
            }
            Err(e) => {
                let reason = format!("{e:#}");
                warn!(error = %reason, "server-side filter failed, scanning licensed users");
                reason
            }
        };

        match self.scan_licensed_users(&source.sku_id).await {
            Ok(users) => Ok(self.finish(users, DiscoveryStrategy::LicensedUserScan, started)),
            Err(e) => Err(DomainError::discovery_failed(primary, format!("{e:#}"))),
        }
    }

    fn finish(
        &self,
        users: Vec<UserRecord>,
        strategy: DiscoveryStrategy,
        started: Instant,
    ) -> Discovery {
        let elapsed = started.elapsed();
        info!(
            users = users.len(),
            strategy = %strategy,
            elapsed_ms = elapsed.as_millis() as u64,
            "discovery finished"
        );
        Discovery {
            users,
            strategy,
            elapsed,
        }
    }

    async fn server_filtered(&self, sku_id: &str) -> anyhow::Result<Vec<UserRecord>> {
        let filtered = self
            .directory
            .list_users_with_license(sku_id, self.page_size)
            .await?;
        let returned = filtered.users.len();

        let users: Vec<UserRecord> = filtered
            .users
            .into_iter()
            .filter(|u| u.holds_license(sku_id))
            .collect();

        if users.len() != returned {
            warn!(
                returned,
                validated = users.len(),
                "server filter returned users without the license; keeping the validated subset"
            );
        }
        if let Some(reported) = filtered.server_count {
            if reported != users.len() as u64 {
                warn!(
                    reported,
                    validated = users.len(),
                    "server-reported count differs from locally validated count"
                );
            }
        }
        Ok(users)
    }

    async fn scan_licensed_users(&self, sku_id: &str) -> anyhow::Result<Vec<UserRecord>> {
        let mut users = Vec::new();
        let mut pages = 0usize;
        let mut followed: HashSet<String> = HashSet::new();
        let mut request = Some(PageRequest::first(u64::from(self.page_size)));

        while let Some(req) = request {
            let page = self.directory.list_licensed_users(req).await?;
            pages += 1;
            debug!(page = pages, size = page.items.len(), "scanned page of licensed users");
            request = PageRequest::after(&page);
            if let Some(cursor) = request.as_ref().and_then(|r| r.cursor.as_deref()) {
                if !followed.insert(cursor.to_owned()) {
                    anyhow::bail!("directory repeated a paging cursor after {pages} pages");
                }
            }
            users.extend(page.items.into_iter().filter(|u| u.holds_license(sku_id)));
        }

        debug!(pages, matched = users.len(), "licensed-user scan complete");
        Ok(users)
    }
}

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use odata_core::{Page, PageInfo, PageRequest};

use license_switch::contract::model::{LicenseRecord, UserRecord};
use license_switch::domain::ports::{ExportBatch, ExportPort, FilteredUsers, DirectoryPort};
use license_switch::domain::service::{Service, ServiceConfig};
use license_switch::infra::confirm::AutoConfirm;

pub const SKU_A: &str = "6fd2c87f-b296-42f0-b197-1e91e994b900";
pub const SKU_B: &str = "c7df2760-2c81-4ef7-b578-5b5392b571df";

pub fn sku(id: &str, name: &str, total: u32, consumed: u32) -> LicenseRecord {
    LicenseRecord {
        sku_id: id.to_string(),
        sku_name: name.to_string(),
        total_units: total,
        consumed_units: consumed,
    }
}

pub fn user(id: &str, licenses: &[&str]) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        display_name: format!("User {id}"),
        principal_name: format!("{id}@contoso.com"),
        assigned_license_ids: licenses.iter().map(|s| s.to_string()).collect(),
        usage_location: Some("US".to_string()),
    }
}

/// A (10/3) and B (10/2), both with spare units.
pub fn roomy_catalog() -> Vec<LicenseRecord> {
    vec![sku(SKU_A, "A", 10, 3), sku(SKU_B, "B", 10, 2)]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchCall {
    pub user_id: String,
    pub remove: String,
    pub add: String,
}

/// In-memory tenant directory.
#[derive(Default)]
pub struct FakeDirectory {
    pub skus: Vec<LicenseRecord>,
    /// Server-side filter answer; `None` makes the filter fail.
    pub filtered: Option<FilteredUsers>,
    /// Pages of the licensed-user scan; `None` makes the scan fail.
    pub licensed_pages: Option<Vec<Vec<UserRecord>>>,
    /// Every scan page points back at the first page.
    pub looping_cursor: bool,
    pub fail_connect: bool,
    pub fail_catalog: bool,
    pub failing_users: HashSet<String>,
    pub switch_calls: Mutex<Vec<SwitchCall>>,
    pub scan_requests: Mutex<Vec<PageRequest>>,
}

impl FakeDirectory {
    pub fn with_users(skus: Vec<LicenseRecord>, users: Vec<UserRecord>) -> Self {
        let count = users.len() as u64;
        Self {
            skus,
            filtered: Some(FilteredUsers {
                users,
                server_count: Some(count),
            }),
            ..Default::default()
        }
    }

    pub fn switch_calls(&self) -> Vec<SwitchCall> {
        self.switch_calls.lock().unwrap().clone()
    }

    pub fn scan_requests(&self) -> Vec<PageRequest> {
        self.scan_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DirectoryPort for FakeDirectory {
    async fn connect(&self) -> anyhow::Result<()> {
        if self.fail_connect {
            anyhow::bail!("AADSTS7000215: Invalid client secret provided");
        }
        Ok(())
    }

    async fn list_subscribed_skus(&self) -> anyhow::Result<Vec<LicenseRecord>> {
        if self.fail_catalog {
            anyhow::bail!("503 Service Unavailable");
        }
        Ok(self.skus.clone())
    }

    async fn list_users_with_license(
        &self,
        _sku_id: &str,
        _page_size: u32,
    ) -> anyhow::Result<FilteredUsers> {
        self.filtered
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Request_UnsupportedQuery: unsupported filter"))
    }

    async fn list_licensed_users(&self, page: PageRequest) -> anyhow::Result<Page<UserRecord>> {
        self.scan_requests.lock().unwrap().push(page.clone());
        let pages = self
            .licensed_pages
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("scan timed out"))?;

        let idx: usize = match &page.cursor {
            None => 0,
            Some(c) => c.parse()?,
        };
        let items = pages.get(idx).cloned().unwrap_or_default();
        let next_cursor = if self.looping_cursor {
            Some("0".to_string())
        } else {
            (idx + 1 < pages.len()).then(|| (idx + 1).to_string())
        };
        Ok(Page::new(
            items,
            PageInfo {
                next_cursor,
                limit: page.limit,
            },
        ))
    }

    async fn switch_license(
        &self,
        user_id: &str,
        remove_sku: &str,
        add_sku: &str,
    ) -> anyhow::Result<()> {
        self.switch_calls.lock().unwrap().push(SwitchCall {
            user_id: user_id.to_string(),
            remove: remove_sku.to_string(),
            add: add_sku.to_string(),
        });
        if self.failing_users.contains(user_id) {
            anyhow::bail!("License assignment failed because service plans require a usage location");
        }
        Ok(())
    }
}

/// Records exported rows instead of writing a file.
#[derive(Default)]
pub struct RecordingExporter {
    pub fail: bool,
    pub exported: Mutex<Vec<Vec<String>>>,
}

impl RecordingExporter {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn exports(&self) -> Vec<Vec<String>> {
        self.exported.lock().unwrap().clone()
    }
}

impl ExportPort for RecordingExporter {
    fn export(&self, batch: ExportBatch<'_>) -> anyhow::Result<usize> {
        if self.fail {
            anyhow::bail!("permission denied: {}", batch.path.display());
        }
        let ids: Vec<String> = batch.users.iter().map(|u| u.id.clone()).collect();
        let n = ids.len();
        self.exported.lock().unwrap().push(ids);
        Ok(n)
    }
}

pub fn test_config() -> ServiceConfig {
    with_delay(std::time::Duration::ZERO)
}

pub fn with_delay(delay: std::time::Duration) -> ServiceConfig {
    ServiceConfig {
        delay,
        page_size: 999,
        max_test_users: 5,
        export_dir: std::env::temp_dir(),
    }
}

pub fn service(
    directory: Arc<FakeDirectory>,
    exporter: Arc<RecordingExporter>,
    answer: bool,
) -> Service {
    Service::new(directory, exporter, Arc::new(AutoConfirm(answer)), test_config())
}

use async_trait::async_trait;
use odata_core::{Page, PageRequest};

use crate::contract::model::{LicenseRecord, UserRecord};

/// Result of a server-side filtered user query.
#[derive(Debug, Clone, Default)]
pub struct FilteredUsers {
    pub users: Vec<UserRecord>,
    /// Match count the service reported for the filter, when it reports one.
    pub server_count: Option<u64>,
}

/// Port for the remote directory: everything the workflow reads from or
/// changes in the tenant. Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait DirectoryPort: Send + Sync {
    /// Authenticate against the tenant.
    async fn connect(&self) -> anyhow::Result<()>;

    /// All subscribed SKUs with unit counts.
    async fn list_subscribed_skus(&self) -> anyhow::Result<Vec<LicenseRecord>>;

    /// Every page of users the service matches for `sku_id`, under relaxed consistency.
    async fn list_users_with_license(
        &self,
        sku_id: &str,
        page_size: u32,
    ) -> anyhow::Result<FilteredUsers>;

    /// One page of users that hold at least one license.
    async fn list_licensed_users(&self, page: PageRequest) -> anyhow::Result<Page<UserRecord>>;

    /// Remove `remove_sku` and add `add_sku` on one user in a single call.
    async fn switch_license(
        &self,
        user_id: &str,
        remove_sku: &str,
        add_sku: &str,
    ) -> anyhow::Result<()>;
}

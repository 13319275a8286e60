use async_trait::async_trait;

use crate::contract::{
    error::LicenseSwitchError,
    model::{LicenseRecord, RunOptions, RunResult, SwitchRequest},
};

/// Public API of the license switch workflow
#[async_trait]
pub trait LicenseSwitchApi: Send + Sync {
    /// Fetch the tenant's subscribed SKUs with their unit counts
    async fn list_licenses(&self) -> Result<Vec<LicenseRecord>, LicenseSwitchError>;

    /// Move every user holding the source license onto the destination license
    async fn switch_licenses(
        &self,
        request: SwitchRequest,
        options: RunOptions,
    ) -> Result<RunResult, LicenseSwitchError>;
}

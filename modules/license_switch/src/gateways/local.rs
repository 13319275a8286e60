use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::LicenseSwitchApi,
    error::LicenseSwitchError,
    model::{LicenseRecord, RunOptions, RunResult, SwitchRequest},
};
use crate::domain::service::Service;

/// Local implementation of the LicenseSwitchApi trait that delegates to the domain service
pub struct LicenseSwitchLocalClient {
    service: Arc<Service>,
}

impl LicenseSwitchLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl LicenseSwitchApi for LicenseSwitchLocalClient {
    async fn list_licenses(&self) -> Result<Vec<LicenseRecord>, LicenseSwitchError> {
        self.service
            .list_licenses()
            .await
            .map_err(LicenseSwitchError::from)
    }

    async fn switch_licenses(
        &self,
        request: SwitchRequest,
        options: RunOptions,
    ) -> Result<RunResult, LicenseSwitchError> {
        self.service
            .run(request, options)
            .await
            .map_err(LicenseSwitchError::from)
    }
}

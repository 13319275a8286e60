use tracing::{debug, instrument};

use crate::contract::model::{LicenseIdentifier, LicenseRecord};
use crate::domain::error::DomainError;
use crate::domain::ports::DirectoryPort;

/// The tenant's subscribed SKUs, fetched once per run and never modified.
#[derive(Debug, Clone, Default)]
pub struct LicenseCatalog {
    records: Vec<LicenseRecord>,
}

impl LicenseCatalog {
    pub fn new(records: Vec<LicenseRecord>) -> Self {
        Self { records }
    }

    /// Fetch the catalog. Any remote failure is fatal for the run; a partial
    /// catalog is never returned.
    #[instrument(name = "license_switch.catalog.fetch", skip(directory))]
    pub async fn fetch(directory: &dyn DirectoryPort) -> Result<Self, DomainError> {
        let records = directory
            .list_subscribed_skus()
            .await
            .map_err(|e| DomainError::catalog_unavailable(format!("{e:#}")))?;
        debug!(skus = records.len(), "fetched license catalog");
        Ok(Self::new(records))
    }

    /// Linear scan for the first record matching the identifier.
    ///
    /// Names and ids are compared ASCII case-insensitively. Uniqueness is not
    /// verified; with duplicates the first entry wins.
    pub fn resolve(&self, ident: &LicenseIdentifier) -> Option<&LicenseRecord> {
        self.records.iter().find(|r| match ident {
            LicenseIdentifier::ByName(name) => r.sku_name.eq_ignore_ascii_case(name.trim()),
            LicenseIdentifier::ById(id) => r.sku_id.eq_ignore_ascii_case(id.trim()),
        })
    }

    pub fn records(&self) -> &[LicenseRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<LicenseRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

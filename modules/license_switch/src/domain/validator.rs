use std::fmt;

use crate::contract::model::{LicenseRecord, SwitchRequest};
use crate::domain::catalog::LicenseCatalog;
use crate::domain::error::DomainError;

/// Source and destination resolved against the catalog and cleared for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSwitch {
    pub source: LicenseRecord,
    pub destination: LicenseRecord,
}

impl fmt::Display for ResolvedSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) -> {} ({}, {} available)",
            self.source.sku_name,
            self.source.sku_id,
            self.destination.sku_name,
            self.destination.sku_id,
            self.destination.available_units()
        )
    }
}

/// Both ends must exist and the destination must have spare units.
/// The source's utilization is never checked.
pub fn validate(
    catalog: &LicenseCatalog,
    request: &SwitchRequest,
) -> Result<ResolvedSwitch, DomainError> {
    let source = catalog.resolve(request.source()).ok_or_else(|| {
        DomainError::license_not_found("source", request.kind(), request.source().value())
    })?;
    let destination = catalog.resolve(request.destination()).ok_or_else(|| {
        DomainError::license_not_found(
            "destination",
            request.kind(),
            request.destination().value(),
        )
    })?;

    let available = destination.available_units();
    if available <= 0 {
        return Err(DomainError::insufficient_capacity(
            destination.sku_name.clone(),
            available,
        ));
    }

    Ok(ResolvedSwitch {
        source: source.clone(),
        destination: destination.clone(),
    })
}

use thiserror::Error;

use crate::contract::model::IdentifierKind;

/// Conditions that end a run before any user is changed.
#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("authentication against the tenant failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("could not fetch the license catalog: {message}")]
    CatalogUnavailable { message: String },

    #[error("{role} license with {kind} '{value}' not found in the tenant")]
    LicenseNotFound {
        role: &'static str,
        kind: IdentifierKind,
        value: String,
    },

    #[error("destination license '{sku_name}' has no available units ({available} available)")]
    InsufficientCapacity { sku_name: String, available: i64 },

    #[error("both discovery strategies failed (filter: {primary}; scan: {fallback})")]
    DiscoveryFailed { primary: String, fallback: String },

    #[error("could not obtain confirmation: {message}")]
    ConfirmationUnavailable { message: String },
}

impl DomainError {
    pub fn authentication_failed(message: impl Into<String>) -> Self {
        Self::AuthenticationFailed {
            message: message.into(),
        }
    }

    pub fn catalog_unavailable(message: impl Into<String>) -> Self {
        Self::CatalogUnavailable {
            message: message.into(),
        }
    }

    pub fn license_not_found(role: &'static str, kind: IdentifierKind, value: impl Into<String>) -> Self {
        Self::LicenseNotFound {
            role,
            kind,
            value: value.into(),
        }
    }

    pub fn insufficient_capacity(sku_name: impl Into<String>, available: i64) -> Self {
        Self::InsufficientCapacity {
            sku_name: sku_name.into(),
            available,
        }
    }

    pub fn discovery_failed(primary: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self::DiscoveryFailed {
            primary: primary.into(),
            fallback: fallback.into(),
        }
    }

    pub fn confirmation_unavailable(message: impl Into<String>) -> Self {
        Self::ConfirmationUnavailable {
            message: message.into(),
        }
    }
}

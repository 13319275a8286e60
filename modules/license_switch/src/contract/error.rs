use thiserror::Error;

/// Errors that are safe to expose to callers of the contract
#[derive(Error, Debug, Clone)]
pub enum LicenseSwitchError {
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("License catalog unavailable: {message}")]
    CatalogUnavailable { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("User discovery failed: {message}")]
    Discovery { message: String },

    #[error("Confirmation unavailable: {message}")]
    Confirmation { message: String },
}

impl LicenseSwitchError {
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn catalog_unavailable(message: impl Into<String>) -> Self {
        Self::CatalogUnavailable {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn discovery(message: impl Into<String>) -> Self {
        Self::Discovery {
            message: message.into(),
        }
    }

    pub fn confirmation(message: impl Into<String>) -> Self {
        Self::Confirmation {
            message: message.into(),
        }
    }
}

impl From<crate::domain::error::DomainError> for LicenseSwitchError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            AuthenticationFailed { message } => Self::authentication(message),
            CatalogUnavailable { message } => Self::catalog_unavailable(message),
            e @ LicenseNotFound { .. } => Self::validation(e.to_string()),
            e @ InsufficientCapacity { .. } => Self::validation(e.to_string()),
            e @ DiscoveryFailed { .. } => Self::discovery(e.to_string()),
            ConfirmationUnavailable { message } => Self::confirmation(message),
        }
    }
}

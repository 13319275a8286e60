use thiserror::Error;

pub type GraphResult<T> = Result<T, GraphError>;

/// Failures talking to Microsoft Graph or its token endpoint.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("authentication error: {0}")]
    Auth(String),

    /// Non-success response; `code` comes from the OData error body when present.
    #[error("graph API error ({status}): {code} - {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot build filter: {0}")]
    InvalidFilter(#[from] odata_core::Error),
}

impl GraphError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GraphError::Api { status, .. } => Some(*status),
            GraphError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_errors_carry_no_status() {
        let err = GraphError::from(odata_core::Error::InvalidGuid("ENTERPRISEPACK".into()));
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "cannot build filter: not a GUID literal: ENTERPRISEPACK");
    }

    #[test]
    fn api_errors_report_their_status() {
        let err = GraphError::Api {
            status: 403,
            code: "Authorization_RequestDenied".into(),
            message: "Insufficient privileges".into(),
        };
        assert_eq!(err.status(), Some(403));
    }
}

//! Client-side request correlation.
//!
//! Microsoft Graph (and most Azure front doors) echo a caller supplied
//! `client-request-id` back in responses and in their own diagnostics, so
//! stamping one on every outgoing request lets a failed call be traced on
//! both sides.

use http::{HeaderMap, HeaderName, HeaderValue};
use uuid::Uuid;

/// Correlation header understood by Microsoft Graph.
pub const CLIENT_REQUEST_ID: &str = "client-request-id";

/// Insert a fresh correlation id unless the caller already set one.
/// Returns the id that ends up on the request.
pub fn ensure_request_id(headers: &mut HeaderMap) -> String {
    if let Some(existing) = headers.get(CLIENT_REQUEST_ID).and_then(|v| v.to_str().ok()) {
        return existing.to_string();
    }

    let id = Uuid::new_v4().to_string();
    if let Ok(value) = HeaderValue::from_str(&id) {
        headers.insert(HeaderName::from_static(CLIENT_REQUEST_ID), value);
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inserts_uuid_when_missing() {
        let mut headers = HeaderMap::new();
        let id = ensure_request_id(&mut headers);

        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(headers.get(CLIENT_REQUEST_ID).unwrap(), id.as_str());
    }

    #[test]
    fn test_keeps_caller_supplied_id() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(CLIENT_REQUEST_ID),
            HeaderValue::from_static("fixed-id"),
        );

        assert_eq!(ensure_request_id(&mut headers), "fixed-id");
        assert_eq!(headers.len(), 1);
    }
}

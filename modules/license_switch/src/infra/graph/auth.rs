//! Client-credentials tokens for Microsoft Graph.

use chrono::{DateTime, Duration, Utc};
use modkit::TracedClient;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::infra::graph::error::{GraphError, GraphResult};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_expired(&self, grace: Duration) -> bool {
        Utc::now() + grace >= self.expires_at
    }
}

/// App credentials registered in the tenant.
#[derive(Debug, Clone)]
pub struct AppCredentials {
    pub tenant: String,
    pub client_id: String,
    pub client_secret: SecretString,
}

/// Caches one app-only token and refreshes it shortly before it expires.
#[derive(Debug)]
pub struct TokenProvider {
    http: TracedClient,
    credentials: AppCredentials,
    token_url: String,
    scope: String,
    cached: RwLock<Option<CachedToken>>,
    grace: Duration,
}

impl TokenProvider {
    pub fn new(http: TracedClient, credentials: AppCredentials, authority: &str, endpoint: &str) -> Self {
        let token_url = format!(
            "{}/{}/oauth2/v2.0/token",
            authority.trim_end_matches('/'),
            credentials.tenant
        );
        let scope = format!("{}/.default", endpoint.trim_end_matches('/'));
        Self {
            http,
            credentials,
            token_url,
            scope,
            cached: RwLock::new(None),
            grace: Duration::minutes(5),
        }
    }

    /// A valid access token, fetched on first use or when close to expiry.
    #[instrument(name = "graph.token", skip(self), fields(tenant = %self.credentials.tenant))]
    pub async fn token(&self) -> GraphResult<String> {
        {
            let cache = self.cached.read().await;
            if let Some(token) = cache.as_ref() {
                if !token.is_expired(self.grace) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        debug!("requesting access token");
        let fresh = self.acquire().await?;
        let access_token = fresh.access_token.clone();
        *self.cached.write().await = Some(fresh);
        Ok(access_token)
    }

    /// Drop the cached token so the next call authenticates again.
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }

    async fn acquire(&self) -> GraphResult<CachedToken> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.expose_secret()),
            ("scope", self.scope.as_str()),
        ];

        let req = self
            .http
            .request(reqwest::Method::POST, &self.token_url)
            .form(&params)
            .build()
            .map_err(|e| GraphError::Auth(format!("token request could not be built: {e}")))?;
        let response = self
            .http
            .execute(req)
            .await
            .map_err(|e| GraphError::Auth(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::Auth(format!(
                "token endpoint returned {status}: {}",
                token_error_description(&body)
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| GraphError::Auth(format!("unreadable token response: {e}")))?;
        let expires_at = Utc::now() + Duration::seconds(token.expires_in);
        debug!(expires_at = %expires_at.format("%Y-%m-%d %H:%M:%S UTC"), "acquired access token");

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at,
        })
    }
}

/// The identity platform answers with `{"error": "...", "error_description": "..."}`.
fn token_error_description(body: &str) -> String {
    #[derive(Deserialize)]
    struct TokenError {
        error: String,
        #[serde(default)]
        error_description: Option<String>,
    }

    match serde_json::from_str::<TokenError>(body) {
        Ok(e) => match e.error_description {
            Some(desc) => format!("{}: {}", e.error, desc.lines().next().unwrap_or_default()),
            None => e.error,
        },
        Err(_) => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_token_expiry_respects_grace() {
        let token = CachedToken {
            access_token: "t".into(),
            expires_at: Utc::now() + Duration::minutes(10),
        };
        assert!(!token.is_expired(Duration::minutes(5)));
        assert!(token.is_expired(Duration::minutes(15)));
    }

    #[test]
    fn token_error_body_is_summarised() {
        let body = r#"{"error":"invalid_client","error_description":"AADSTS7000215: Invalid client secret.\r\nTrace ID: x"}"#;
        assert_eq!(
            token_error_description(body),
            "invalid_client: AADSTS7000215: Invalid client secret."
        );
        assert_eq!(token_error_description("oops"), "oops");
    }
}

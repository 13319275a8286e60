use std::sync::Arc;

use modkit::TracedClient;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::instrument;

use crate::infra::graph::auth::TokenProvider;
use crate::infra::graph::dto::ODataError;
use crate::infra::graph::error::{GraphError, GraphResult};

const CONSISTENCY_LEVEL: &str = "ConsistencyLevel";

/// Authenticated JSON calls against one Graph API version.
#[derive(Debug)]
pub struct GraphClient {
    http: TracedClient,
    tokens: Arc<TokenProvider>,
    base_url: String,
}

impl GraphClient {
    pub fn new(http: TracedClient, tokens: Arc<TokenProvider>, endpoint: &str, api_version: &str) -> Self {
        Self {
            http,
            tokens,
            base_url: format!("{}/{}", endpoint.trim_end_matches('/'), api_version),
        }
    }

    /// `https://graph.microsoft.com/v1.0`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &TokenProvider {
        &self.tokens
    }

    /// GET a JSON document. `eventual` asks for relaxed consistency, which
    /// advanced queries such as `$count` and lambda filters require.
    #[instrument(name = "graph.get", skip(self, url))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, eventual: bool) -> GraphResult<T> {
        let token = self.tokens.token().await?;
        let mut builder = self
            .http
            .request(reqwest::Method::GET, url)
            .bearer_auth(token);
        if eventual {
            builder = builder.header(CONSISTENCY_LEVEL, "eventual");
        }
        let response = self.http.execute(builder.build()?).await?;
        let response = check(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// POST a JSON body; the response body is not needed.
    #[instrument(name = "graph.post", skip(self, url, body))]
    pub async fn post_json<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> GraphResult<()> {
        let token = self.tokens.token().await?;
        let req = self
            .http
            .request(reqwest::Method::POST, url)
            .bearer_auth(token)
            .json(body)
            .build()?;
        let response = self.http.execute(req).await?;
        check(response).await?;
        Ok(())
    }
}

async fn check(response: reqwest::Response) -> GraphResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ODataError>(&body) {
        Ok(err) => (err.error.code, err.error.message),
        Err(_) => (
            status.canonical_reason().unwrap_or("Unknown").to_string(),
            body,
        ),
    };
    Err(GraphError::Api {
        status: status.as_u16(),
        code,
        message,
    })
}

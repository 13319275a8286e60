use std::sync::Arc;

use async_trait::async_trait;
use modkit::TracedClient;
use odata_core::ast::{CompareOperator, Expr, Value};
use odata_core::{ODataQuery, Page, PageInfo, PageRequest};
use secrecy::SecretString;
use tracing::{debug, instrument};

use crate::config::{GraphConfig, MAX_PAGE_SIZE};
use crate::contract::model::{LicenseRecord, UserRecord};
use crate::domain::ports::{DirectoryPort, FilteredUsers};
use crate::infra::graph::auth::{AppCredentials, TokenProvider};
use crate::infra::graph::client::GraphClient;
use crate::infra::graph::dto::{AssignLicenseBody, GraphCollection, GraphUser, SubscribedSku};
use crate::infra::graph::error::GraphResult;

const USER_SELECT: &str = "id,displayName,userPrincipalName,assignedLicenses,usageLocation";

/// The tenant directory as seen through Microsoft Graph.
pub struct GraphDirectory {
    client: GraphClient,
}

impl GraphDirectory {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    pub fn from_config(cfg: &GraphConfig) -> anyhow::Result<Self> {
        let http = TracedClient::with_timeout(cfg.timeout)?;
        let credentials = AppCredentials {
            tenant: cfg.tenant.clone(),
            client_id: cfg.client_id.clone(),
            client_secret: SecretString::from(cfg.client_secret.clone()),
        };
        let tokens = Arc::new(TokenProvider::new(
            http.clone(),
            credentials,
            &cfg.authority,
            &cfg.endpoint,
        ));
        Ok(Self::new(GraphClient::new(
            http,
            tokens,
            &cfg.endpoint,
            &cfg.api_version,
        )))
    }

    fn users_url(&self, filter: &str, top: u64) -> String {
        format!(
            "{}/users?$filter={}&$count=true&$top={}&$select={}",
            self.client.base_url(),
            urlencoding::encode(filter),
            top.clamp(1, u64::from(MAX_PAGE_SIZE)),
            USER_SELECT
        )
    }

    async fn fetch_users(&self, url: &str) -> GraphResult<GraphCollection<GraphUser>> {
        self.client.get_json(url, true).await
    }
}

/// `assignedLicenses/any(x:x/skuId eq <guid>)`
pub fn license_filter(sku_id: &str) -> Result<String, odata_core::Error> {
    let predicate = Expr::compare(
        Expr::ident("x/skuId"),
        CompareOperator::Eq,
        Expr::value(Value::guid(sku_id)?),
    );
    let query = ODataQuery::some(Expr::any("assignedLicenses", "x", predicate));
    Ok(query.to_filter_string().unwrap_or_default())
}

/// `assignedLicenses/$count ne 0`
pub fn licensed_users_filter() -> String {
    Expr::compare(
        Expr::ident("assignedLicenses/$count"),
        CompareOperator::Ne,
        Expr::value(Value::Number(0)),
    )
    .to_string()
}

#[async_trait]
impl DirectoryPort for GraphDirectory {
    async fn connect(&self) -> anyhow::Result<()> {
        self.client.tokens().invalidate().await;
        self.client.tokens().token().await?;
        debug!("connected to Microsoft Graph");
        Ok(())
    }

    #[instrument(name = "graph.subscribed_skus", skip(self))]
    async fn list_subscribed_skus(&self) -> anyhow::Result<Vec<LicenseRecord>> {
        let mut url = Some(format!("{}/subscribedSkus", self.client.base_url()));
        let mut records = Vec::new();
        while let Some(next) = url {
            let page: GraphCollection<SubscribedSku> = self.client.get_json(&next, false).await?;
            records.extend(page.value.into_iter().map(LicenseRecord::from));
            url = page.next_link;
        }
        Ok(records)
    }

    #[instrument(name = "graph.users_with_license", skip(self))]
    async fn list_users_with_license(
        &self,
        sku_id: &str,
        page_size: u32,
    ) -> anyhow::Result<FilteredUsers> {
        let filter = license_filter(sku_id)?;
        let mut url = Some(self.users_url(&filter, u64::from(page_size)));
        let mut result = FilteredUsers::default();
        let mut first = true;

        while let Some(next) = url {
            let page = self.fetch_users(&next).await?;
            if first {
                result.server_count = page.count;
                first = false;
            }
            debug!(size = page.value.len(), "filtered users page");
            result
                .users
                .extend(page.value.into_iter().map(UserRecord::from));
            url = page.next_link;
        }
        Ok(result)
    }

    #[instrument(name = "graph.licensed_users", skip(self, page), fields(continued = page.cursor.is_some()))]
    async fn list_licensed_users(&self, page: PageRequest) -> anyhow::Result<Page<UserRecord>> {
        let url = match page.cursor {
            Some(cursor) => cursor,
            None => self.users_url(&licensed_users_filter(), page.limit),
        };
        let collection = self.fetch_users(&url).await?;
        let items = collection.value.into_iter().map(UserRecord::from).collect();
        Ok(Page::new(
            items,
            PageInfo {
                next_cursor: collection.next_link,
                limit: page.limit,
            },
        ))
    }

    #[instrument(name = "graph.assign_license", skip(self))]
    async fn switch_license(
        &self,
        user_id: &str,
        remove_sku: &str,
        add_sku: &str,
    ) -> anyhow::Result<()> {
        let url = format!(
            "{}/users/{}/assignLicense",
            self.client.base_url(),
            urlencoding::encode(user_id)
        );
        self.client
            .post_json(&url, &AssignLicenseBody::swap(remove_sku, add_sku))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn license_filter_renders_lambda() {
        assert_eq!(
            license_filter("6FD2C87F-B296-42F0-B197-1E91E994B900").unwrap(),
            "assignedLicenses/any(x:x/skuId eq 6fd2c87f-b296-42f0-b197-1e91e994b900)"
        );
    }

    #[test]
    fn license_filter_rejects_non_guid() {
        assert!(license_filter("ENTERPRISEPACK").is_err());
    }

    #[test]
    fn licensed_filter() {
        assert_eq!(licensed_users_filter(), "assignedLicenses/$count ne 0");
    }
}

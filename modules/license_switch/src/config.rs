use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Key of this module's section in the application config bag.
pub const MODULE_NAME: &str = "license_switch";

/// Largest `$top` the users endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 999;

/// Configuration for the license_switch module
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LicenseSwitchConfig {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub switch: SwitchConfig,
}

/// Connection settings for Microsoft Graph (app-only, client credentials).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphConfig {
    /// Tenant id or verified domain.
    #[serde(default)]
    pub tenant: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_authority")]
    pub authority: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwitchConfig {
    /// Pause after every user, keeps the run under the service throttling limits.
    #[serde(default = "default_delay", with = "humantime_serde")]
    pub delay: Duration,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_max_test_users")]
    pub max_test_users: usize,
    /// Adds a `UsageLocation` column to the audit export.
    #[serde(default)]
    pub include_usage_location: bool,
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            tenant: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            authority: default_authority(),
            endpoint: default_endpoint(),
            api_version: default_api_version(),
            timeout: default_timeout(),
        }
    }
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            delay: default_delay(),
            page_size: default_page_size(),
            max_test_users: default_max_test_users(),
            include_usage_location: false,
            export_dir: default_export_dir(),
        }
    }
}

impl SwitchConfig {
    /// Page size clamped to what the service accepts.
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

impl LicenseSwitchConfig {
    /// Check that everything needed to reach the tenant is present.
    pub fn validate(&self) -> anyhow::Result<()> {
        let missing: Vec<&str> = [
            ("graph.tenant", &self.graph.tenant),
            ("graph.client_id", &self.graph.client_id),
            ("graph.client_secret", &self.graph.client_secret),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect();

        if !missing.is_empty() {
            anyhow::bail!(
                "missing required settings in modules.{MODULE_NAME}: {}",
                missing.join(", ")
            );
        }
        url::Url::parse(&self.graph.authority)
            .map_err(|e| anyhow::anyhow!("graph.authority is not a URL: {e}"))?;
        url::Url::parse(&self.graph.endpoint)
            .map_err(|e| anyhow::anyhow!("graph.endpoint is not a URL: {e}"))?;
        if self.switch.max_test_users == 0 {
            anyhow::bail!("switch.max_test_users must be at least 1");
        }
        Ok(())
    }
}

fn default_authority() -> String {
    "https://login.microsoftonline.com".to_string()
}

fn default_endpoint() -> String {
    "https://graph.microsoft.com".to_string()
}

fn default_api_version() -> String {
    "v1.0".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_delay() -> Duration {
    Duration::from_millis(500)
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

fn default_max_test_users() -> usize {
    5
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

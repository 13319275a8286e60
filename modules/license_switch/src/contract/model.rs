use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::contract::error::LicenseSwitchError;

/// One purchased subscription SKU in the tenant, as fetched at the start of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    pub sku_id: String,
    /// Part number, e.g. `ENTERPRISEPACK`.
    pub sku_name: String,
    pub total_units: u32,
    pub consumed_units: u32,
}

impl LicenseRecord {
    /// Spare units. Negative when the tenant is over-assigned.
    pub fn available_units(&self) -> i64 {
        i64::from(self.total_units) - i64::from(self.consumed_units)
    }

    /// Spare units floored at zero, for display.
    pub fn available_units_display(&self) -> u32 {
        self.total_units.saturating_sub(self.consumed_units)
    }
}

/// Point-in-time snapshot of one directory principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub display_name: String,
    pub principal_name: String,
    pub assigned_license_ids: Vec<String>,
    pub usage_location: Option<String>,
}

impl UserRecord {
    /// SKU ids are GUIDs; compare them case-insensitively.
    pub fn holds_license(&self, sku_id: &str) -> bool {
        self.assigned_license_ids
            .iter()
            .any(|id| id.eq_ignore_ascii_case(sku_id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKind {
    Name,
    Id,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierKind::Name => f.write_str("name"),
            IdentifierKind::Id => f.write_str("id"),
        }
    }
}

/// How the operator addressed a license: by part number or by SKU id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LicenseIdentifier {
    ByName(String),
    ById(String),
}

impl LicenseIdentifier {
    pub fn kind(&self) -> IdentifierKind {
        match self {
            LicenseIdentifier::ByName(_) => IdentifierKind::Name,
            LicenseIdentifier::ById(_) => IdentifierKind::Id,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            LicenseIdentifier::ByName(v) | LicenseIdentifier::ById(v) => v,
        }
    }
}

impl fmt::Display for LicenseIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind(), self.value())
    }
}

/// Source and destination of one run. Both ends always use the same
/// identifier kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchRequest {
    source: LicenseIdentifier,
    destination: LicenseIdentifier,
}

impl SwitchRequest {
    pub fn new(
        source: LicenseIdentifier,
        destination: LicenseIdentifier,
    ) -> Result<Self, LicenseSwitchError> {
        if source.kind() != destination.kind() {
            return Err(LicenseSwitchError::validation(format!(
                "source is addressed by {} but destination by {}; use names or ids for both",
                source.kind(),
                destination.kind()
            )));
        }
        for ident in [&source, &destination] {
            if ident.value().trim().is_empty() {
                return Err(LicenseSwitchError::validation(format!(
                    "license {} must not be empty",
                    ident.kind()
                )));
            }
        }
        Ok(Self {
            source,
            destination,
        })
    }

    pub fn by_name(
        source: impl Into<String>,
        destination: impl Into<String>,
    ) -> Result<Self, LicenseSwitchError> {
        Self::new(
            LicenseIdentifier::ByName(source.into()),
            LicenseIdentifier::ByName(destination.into()),
        )
    }

    pub fn by_id(
        source: impl Into<String>,
        destination: impl Into<String>,
    ) -> Result<Self, LicenseSwitchError> {
        Self::new(
            LicenseIdentifier::ById(source.into()),
            LicenseIdentifier::ById(destination.into()),
        )
    }

    pub fn source(&self) -> &LicenseIdentifier {
        &self.source
    }

    pub fn destination(&self) -> &LicenseIdentifier {
        &self.destination
    }

    pub fn kind(&self) -> IdentifierKind {
        self.source.kind()
    }
}

/// Per-run switches chosen by the operator.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Read-only run: export and report, but issue no assignment changes.
    pub preview: bool,
    /// Process only the first `max_test_users` discovered users.
    pub test_mode: bool,
    pub max_test_users: usize,
    /// Audit file location; a timestamped name in the export directory when unset.
    pub export_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryStrategy {
    /// Server-side `assignedLicenses/any(...)` query.
    ServerFilter,
    /// Paged scan of licensed users filtered locally.
    LicensedUserScan,
}

impl fmt::Display for DiscoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryStrategy::ServerFilter => f.write_str("server-side filter"),
            DiscoveryStrategy::LicensedUserScan => f.write_str("licensed-user scan"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    /// Preview run; nothing was changed.
    Simulated,
    /// No user holds the source license.
    NoUsers,
    /// The operator declined the confirmation prompt.
    Cancelled,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Completed => f.write_str("completed"),
            RunStatus::Simulated => f.write_str("simulated (preview)"),
            RunStatus::NoUsers => f.write_str("no users hold the source license"),
            RunStatus::Cancelled => f.write_str("cancelled by operator"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchFailure {
    pub user_id: String,
    pub principal_name: String,
    pub reason: String,
}

/// Outcome of one run, built in memory for the final report.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub status: RunStatus,
    pub source_license: String,
    pub destination_license: String,
    pub total_discovered: usize,
    pub total_processed: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub failures: Vec<SwitchFailure>,
    /// `None` when nothing was exported or the export could not be written.
    pub export_file_path: Option<PathBuf>,
    pub discovery_strategy: Option<DiscoveryStrategy>,
    pub search_duration: Duration,
    pub total_duration: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn license(total: u32, consumed: u32) -> LicenseRecord {
        LicenseRecord {
            sku_id: "id".into(),
            sku_name: "NAME".into(),
            total_units: total,
            consumed_units: consumed,
        }
    }

    #[test]
    fn available_units_can_go_negative_but_display_floors() {
        assert_eq!(license(100, 40).available_units(), 60);
        assert_eq!(license(50, 50).available_units(), 0);
        assert_eq!(license(5, 8).available_units(), -3);
        assert_eq!(license(5, 8).available_units_display(), 0);
    }

    #[test]
    fn holds_license_ignores_guid_case() {
        let user = UserRecord {
            id: "u1".into(),
            display_name: "Ada".into(),
            principal_name: "ada@contoso.com".into(),
            assigned_license_ids: vec!["6FD2C87F-B296-42F0-B197-1E91E994B900".into()],
            usage_location: None,
        };
        assert!(user.holds_license("6fd2c87f-b296-42f0-b197-1e91e994b900"));
        assert!(!user.holds_license("c7df2760-2c81-4ef7-b578-5b5392b571df"));
    }

    #[test]
    fn switch_request_rejects_mixed_kinds() {
        let err = SwitchRequest::new(
            LicenseIdentifier::ByName("ENTERPRISEPACK".into()),
            LicenseIdentifier::ById("c7df2760-2c81-4ef7-b578-5b5392b571df".into()),
        )
        .unwrap_err();
        assert!(matches!(err, LicenseSwitchError::Validation { .. }));
        assert!(err.to_string().contains("names or ids"));
    }

    #[test]
    fn switch_request_rejects_blank_identifiers() {
        assert!(SwitchRequest::by_name("  ", "SPE_E5").is_err());
        assert!(SwitchRequest::by_id("abc", "").is_err());
    }

    #[test]
    fn switch_request_keeps_single_kind() {
        let req = SwitchRequest::by_id("a", "b").unwrap();
        assert_eq!(req.kind(), IdentifierKind::Id);
        assert_eq!(req.source().value(), "a");
        assert_eq!(req.destination().value(), "b");
        assert_eq!(req.source().to_string(), "id 'a'");
    }
}

use chrono::{DateTime, Utc};
use std::path::Path;

use crate::contract::model::UserRecord;

/// Everything one audit export needs.
#[derive(Debug, Clone, Copy)]
pub struct ExportBatch<'a> {
    pub path: &'a Path,
    pub users: &'a [UserRecord],
    pub license_name: &'a str,
    pub exported_at: DateTime<Utc>,
}

/// Writes the audit record of affected users before anything is changed.
pub trait ExportPort: Send + Sync {
    /// Returns the number of rows written.
    fn export(&self, batch: ExportBatch<'_>) -> anyhow::Result<usize>;
}

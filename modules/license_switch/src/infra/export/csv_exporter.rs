//! Audit export of the users a run touches.
//!
//! Columns: `DisplayName,UserPrincipalName,UserId,CurrentLicense,ExportDate`,
//! with `UsageLocation` before `CurrentLicense` when enabled.

use anyhow::Context;
use serde::Serialize;
use std::fs;

use crate::contract::model::UserRecord;
use crate::domain::ports::{ExportBatch, ExportPort};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ExportRow<'a> {
    display_name: &'a str,
    user_principal_name: &'a str,
    user_id: &'a str,
    current_license: &'a str,
    export_date: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ExportRowWithLocation<'a> {
    display_name: &'a str,
    user_principal_name: &'a str,
    user_id: &'a str,
    usage_location: &'a str,
    current_license: &'a str,
    export_date: &'a str,
}

/// Writes one CSV row per user.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter {
    include_usage_location: bool,
}

impl CsvExporter {
    pub fn new(include_usage_location: bool) -> Self {
        Self {
            include_usage_location,
        }
    }

    fn write_rows<W: std::io::Write>(
        &self,
        writer: &mut csv::Writer<W>,
        users: &[UserRecord],
        license: &str,
        date: &str,
    ) -> csv::Result<()> {
        for user in users {
            if self.include_usage_location {
                writer.serialize(ExportRowWithLocation {
                    display_name: &user.display_name,
                    user_principal_name: &user.principal_name,
                    user_id: &user.id,
                    usage_location: user.usage_location.as_deref().unwrap_or_default(),
                    current_license: license,
                    export_date: date,
                })?;
            } else {
                writer.serialize(ExportRow {
                    display_name: &user.display_name,
                    user_principal_name: &user.principal_name,
                    user_id: &user.id,
                    current_license: license,
                    export_date: date,
                })?;
            }
        }
        Ok(())
    }

    fn header(&self) -> &'static [&'static str] {
        if self.include_usage_location {
            &[
                "DisplayName",
                "UserPrincipalName",
                "UserId",
                "UsageLocation",
                "CurrentLicense",
                "ExportDate",
            ]
        } else {
            &[
                "DisplayName",
                "UserPrincipalName",
                "UserId",
                "CurrentLicense",
                "ExportDate",
            ]
        }
    }
}

impl ExportPort for CsvExporter {
    fn export(&self, batch: ExportBatch<'_>) -> anyhow::Result<usize> {
        if let Some(parent) = batch.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("cannot create directory {}", parent.display()))?;
        }

        // header written explicitly so an empty batch still yields a valid file
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(batch.path)
            .with_context(|| format!("cannot create {}", batch.path.display()))?;
        writer.write_record(self.header())?;

        let date = batch.exported_at.format(DATE_FORMAT).to_string();
        self.write_rows(&mut writer, batch.users, batch.license_name, &date)?;
        writer
            .flush()
            .with_context(|| format!("cannot write {}", batch.path.display()))?;
        Ok(batch.users.len())
    }
}

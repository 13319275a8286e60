use std::fmt;
use std::time::Duration;

use tracing::{info, warn};

use crate::contract::model::{LicenseRecord, RunResult, RunStatus};

/// Human-readable end-of-run summary.
pub struct Summary<'a>(pub &'a RunResult);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        writeln!(f, "License switch summary")?;
        writeln!(f, "  status:           {}", r.status)?;
        writeln!(
            f,
            "  licenses:         {} -> {}",
            r.source_license, r.destination_license
        )?;
        if let Some(strategy) = r.discovery_strategy {
            writeln!(f, "  discovery:        {strategy}")?;
        }
        writeln!(f, "  users discovered: {}", r.total_discovered)?;
        writeln!(f, "  users processed:  {}", r.total_processed)?;
        writeln!(f, "  successful:       {}", r.success_count)?;
        writeln!(f, "  failed:           {}", r.failure_count)?;
        match &r.export_file_path {
            Some(path) => writeln!(f, "  export file:      {}", path.display())?,
            None => writeln!(f, "  export file:      (none)")?,
        }
        writeln!(f, "  search time:      {}", seconds(r.search_duration))?;
        write!(f, "  total time:       {}", seconds(r.total_duration))?;

        if !r.failures.is_empty() {
            writeln!(f)?;
            write!(f, "Failed users:")?;
            for failure in &r.failures {
                write!(
                    f,
                    "\n  {} ({}): {}",
                    failure.principal_name, failure.user_id, failure.reason
                )?;
            }
        }
        Ok(())
    }
}

/// Same figures as [`Summary`], as one structured log event.
pub fn log_summary(result: &RunResult) {
    info!(
        status = %result.status,
        source = %result.source_license,
        destination = %result.destination_license,
        discovered = result.total_discovered,
        processed = result.total_processed,
        succeeded = result.success_count,
        failed = result.failure_count,
        export = ?result.export_file_path,
        search_ms = result.search_duration.as_millis() as u64,
        total_ms = result.total_duration.as_millis() as u64,
        "run summary"
    );
    if result.status == RunStatus::Completed && result.failure_count > 0 {
        warn!(failed = result.failure_count, "some users could not be switched");
    }
}

/// Fixed-width table of the subscribed SKUs.
pub struct CatalogTable<'a>(pub &'a [LicenseRecord]);

impl fmt::Display for CatalogTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name_width = self
            .0
            .iter()
            .map(|r| r.sku_name.len())
            .max()
            .unwrap_or(0)
            .max("SKU".len());

        write!(
            f,
            "{:<name_width$}  {:<36}  {:>8}  {:>8}  {:>9}",
            "SKU", "SKU ID", "TOTAL", "CONSUMED", "AVAILABLE"
        )?;
        for r in self.0 {
            write!(
                f,
                "\n{:<name_width$}  {:<36}  {:>8}  {:>8}  {:>9}",
                r.sku_name,
                r.sku_id,
                r.total_units,
                r.consumed_units,
                r.available_units_display()
            )?;
        }
        Ok(())
    }
}

fn seconds(d: Duration) -> String {
    format!("{:.2}s", d.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::{DiscoveryStrategy, SwitchFailure};
    use std::path::PathBuf;

    fn result() -> RunResult {
        RunResult {
            status: RunStatus::Completed,
            source_license: "ENTERPRISEPACK".into(),
            destination_license: "ENTERPRISEPREMIUM".into(),
            total_discovered: 3,
            total_processed: 2,
            success_count: 1,
            failure_count: 1,
            failures: vec![SwitchFailure {
                user_id: "u2".into(),
                principal_name: "bob@contoso.com".into(),
                reason: "usage location missing".into(),
            }],
            export_file_path: Some(PathBuf::from("out.csv")),
            discovery_strategy: Some(DiscoveryStrategy::ServerFilter),
            search_duration: Duration::from_millis(1250),
            total_duration: Duration::from_secs(3),
        }
    }

    #[test]
    fn summary_lists_counts_and_failures() {
        let text = Summary(&result()).to_string();
        assert!(text.contains("users discovered: 3"));
        assert!(text.contains("users processed:  2"));
        assert!(text.contains("export file:      out.csv"));
        assert!(text.contains("search time:      1.25s"));
        assert!(text.contains("bob@contoso.com (u2): usage location missing"));
    }

    #[test]
    fn summary_without_export() {
        let mut r = result();
        r.export_file_path = None;
        r.failures.clear();
        assert!(Summary(&r).to_string().contains("(none)"));
    }

    #[test]
    fn catalog_table_floors_available() {
        let rows = [LicenseRecord {
            sku_id: "c7df2760-2c81-4ef7-b578-5b5392b571df".into(),
            sku_name: "ENTERPRISEPREMIUM".into(),
            total_units: 5,
            consumed_units: 8,
        }];
        let text = CatalogTable(&rows).to_string();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("SKU"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("ENTERPRISEPREMIUM"));
        assert!(row.trim_end().ends_with(" 0"));
    }
}

use chrono::{TimeZone, Utc};
use std::fs;

use license_switch::contract::model::UserRecord;
use license_switch::domain::ports::{ExportBatch, ExportPort};
use license_switch::infra::export::CsvExporter;

fn users() -> Vec<UserRecord> {
    vec![
        UserRecord {
            id: "u1".into(),
            display_name: "Müller, Jürgen".into(),
            principal_name: "jm@contoso.com".into(),
            assigned_license_ids: vec![],
            usage_location: Some("DE".into()),
        },
        UserRecord {
            id: "u2".into(),
            display_name: "Ada".into(),
            principal_name: "ada@contoso.com".into(),
            assigned_license_ids: vec![],
            usage_location: None,
        },
    ]
}

#[test]
fn writes_header_and_one_row_per_user() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/out.csv");
    let users = users();
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 13, 4, 5).unwrap();

    let rows = CsvExporter::new(false)
        .export(ExportBatch {
            path: &path,
            users: &users,
            license_name: "ENTERPRISEPACK",
            exported_at: at,
        })
        .unwrap();
    assert_eq!(rows, 2);

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "DisplayName,UserPrincipalName,UserId,CurrentLicense,ExportDate"
    );
    assert_eq!(
        lines[1],
        "\"Müller, Jürgen\",jm@contoso.com,u1,ENTERPRISEPACK,2024-05-01 13:04:05"
    );
    assert_eq!(lines.len(), 3);
}

#[test]
fn usage_location_column_is_optional() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let users = users();

    CsvExporter::new(true)
        .export(ExportBatch {
            path: &path,
            users: &users,
            license_name: "ENTERPRISEPACK",
            exported_at: Utc::now(),
        })
        .unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(
        header,
        vec![
            "DisplayName",
            "UserPrincipalName",
            "UserId",
            "UsageLocation",
            "CurrentLicense",
            "ExportDate"
        ]
    );
    let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(&records[0][3], "DE");
    assert_eq!(&records[1][3], "");
}

#[test]
fn empty_batch_still_has_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");

    let rows = CsvExporter::default()
        .export(ExportBatch {
            path: &path,
            users: &[],
            license_name: "X",
            exported_at: Utc::now(),
        })
        .unwrap();

    assert_eq!(rows, 0);
    assert!(fs::read_to_string(&path).unwrap().starts_with("DisplayName,"));
}

#[test]
fn unwritable_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    // a directory cannot be opened as the output file
    let err = CsvExporter::default()
        .export(ExportBatch {
            path: dir.path(),
            users: &users(),
            license_name: "X",
            exported_at: Utc::now(),
        })
        .unwrap_err();
    assert!(err.to_string().contains("cannot create"));
}

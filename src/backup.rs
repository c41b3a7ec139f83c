// 💾 Backup & Restore
//
// Export: a ZIP with the raw JSON dump plus a static HTML summary anyone can
// open without the app. Restore: replaces every table from a JSON dump (or the
// first .json inside a ZIP) in one transaction, keeping row ids.

use crate::db::clear_all;
use crate::entities::appraisal::{insert_appraisal, list_all_appraisals, Appraisal};
use crate::entities::asset::{insert_asset, list_all_beneficiaries, list_assets, upsert_beneficiary, Asset, Beneficiary};
use crate::entities::person::{insert_person, list_people, Person};
use crate::entities::planning::{insert_milestone, insert_task, list_milestones, list_tasks, Milestone, Task};
use crate::entities::property::{
    insert_bill, insert_location, insert_structure, insert_vendor, list_all_bills, list_all_locations,
    list_all_structures, list_all_vendors, AssetVendor, LocationPoint, PropertyStructure, RecurringBill,
};
use crate::format::{escape_html, format_currency};
use crate::summary::NetWorthSummary;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{Cursor, Read, Write};
use thiserror::Error;
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const BACKUP_VERSION: &str = "1.0";

// ============================================================================
// BACKUP DOCUMENT
// ============================================================================

/// The JSON dump. Arrays missing from older backups restore as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupData {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub appraisals: Vec<Appraisal>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub structures: Vec<PropertyStructure>,
    #[serde(default)]
    pub locations: Vec<LocationPoint>,
    #[serde(default)]
    pub bills: Vec<RecurringBill>,
    #[serde(default)]
    pub vendors: Vec<AssetVendor>,
    #[serde(default)]
    pub beneficiaries: Vec<Beneficiary>,
}

/// Snapshot every table
pub fn collect(conn: &Connection, now: NaiveDateTime) -> Result<BackupData> {
    Ok(BackupData {
        version: BACKUP_VERSION.to_string(),
        timestamp: now.format("%Y-%m-%dT%H:%M:%S").to_string(),
        people: list_people(conn)?,
        assets: list_assets(conn)?,
        appraisals: list_all_appraisals(conn)?,
        milestones: list_milestones(conn)?,
        tasks: list_tasks(conn)?,
        structures: list_all_structures(conn)?,
        locations: list_all_locations(conn)?,
        bills: list_all_bills(conn)?,
        vendors: list_all_vendors(conn)?,
        beneficiaries: list_all_beneficiaries(conn)?,
    })
}

// ============================================================================
// EXPORT
// ============================================================================

pub fn json_file_name(now: NaiveDateTime) -> String {
    format!("estate_data_{}.json", now.format("%Y%m%d"))
}

pub fn readme_file_name(now: NaiveDateTime) -> String {
    format!("READ_ME_{}.html", now.format("%Y%m%d"))
}

/// Static human-readable summary shipped next to the JSON
pub fn readme_html(data: &BackupData, json_sha256: &str) -> String {
    let summary = NetWorthSummary::from_assets(&data.assets);

    let people: String = data
        .people
        .iter()
        .map(|p| {
            format!(
                "<li>{} ({})</li>",
                escape_html(&p.name),
                escape_html(p.role_label())
            )
        })
        .collect();

    let assets: String = data
        .assets
        .iter()
        .map(|a| {
            format!(
                "<li>{} {} - {} - {}{}</li>",
                a.icon(),
                escape_html(&a.name),
                escape_html(if a.asset_type.is_empty() { "Unknown" } else { a.asset_type.as_str() }),
                format_currency(a.value_estimated),
                if a.is_in_trust { " (in trust)" } else { "" }
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Estate Backup {ts}</title></head>
<body>
    <h1>Estate Data Backup</h1>
    <p>Generated: {ts}</p>
    <p>Net worth: <strong>{net}</strong> (assets {assets_total}, liabilities {liabilities_total})</p>
    <hr>
    <h2>People</h2>
    <ul>{people}</ul>
    <h2>Assets</h2>
    <ul>{assets}</ul>
    <hr>
    <p><small>{appraisals} valuations, {milestones} milestones, {tasks} tasks, {bills} bills.
    SHA-256 of the data file: <code>{sha}</code></small></p>
</body>
</html>
"#,
        ts = escape_html(&data.timestamp),
        net = format_currency(summary.net_worth),
        assets_total = format_currency(summary.total_assets),
        liabilities_total = format_currency(summary.total_liabilities),
        people = people,
        assets = assets,
        appraisals = data.appraisals.len(),
        milestones = data.milestones.len(),
        tasks = data.tasks.len(),
        bills = data.bills.len(),
        sha = json_sha256,
    )
}

/// Build the backup ZIP in memory
pub fn export_zip(conn: &Connection, now: NaiveDateTime) -> Result<Vec<u8>> {
    let data = collect(conn, now)?;
    let json = serde_json::to_string_pretty(&data)?;
    let sha = format!("{:x}", Sha256::digest(json.as_bytes()));
    let html = readme_html(&data, &sha);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer.start_file(json_file_name(now), options)?;
    writer.write_all(json.as_bytes())?;
    writer.start_file(readme_file_name(now), options)?;
    writer.write_all(html.as_bytes())?;

    let bytes = writer.finish()?.into_inner();
    info!(
        people = data.people.len(),
        assets = data.assets.len(),
        appraisals = data.appraisals.len(),
        size = bytes.len(),
        "backup exported"
    );
    Ok(bytes)
}

// ============================================================================
// RESTORE
// ============================================================================

#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("Could not find valid JSON data in file.")]
    NoJsonData,

    #[error("Restore failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RestoreStats {
    pub people: usize,
    pub assets: usize,
    pub appraisals: usize,
    pub milestones: usize,
    pub tasks: usize,
    pub structures: usize,
    pub locations: usize,
    pub bills: usize,
    pub vendors: usize,
    pub beneficiaries: usize,
}

impl RestoreStats {
    pub fn summary(&self) -> String {
        format!(
            "Restored {} people, {} assets, {} valuations, {} milestones, {} tasks",
            self.people, self.assets, self.appraisals, self.milestones, self.tasks
        )
    }
}

/// Pull the JSON payload out of an uploaded file by name:
/// `.json` as-is, `.zip` → first `*.json` entry, anything else → None
pub fn extract_json(file_name: &str, bytes: &[u8]) -> Result<Option<Vec<u8>>> {
    let lower = file_name.to_ascii_lowercase();

    if lower.ends_with(".json") {
        return Ok(Some(bytes.to_vec()));
    }
    if !lower.ends_with(".zip") {
        return Ok(None);
    }

    let mut archive = ZipArchive::new(Cursor::new(bytes)).context("Not a valid ZIP archive")?;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.name().to_ascii_lowercase().ends_with(".json") {
            let mut content = Vec::new();
            entry.read_to_end(&mut content)?;
            return Ok(Some(content));
        }
    }
    Ok(None)
}

/// Replace the whole database with a JSON dump; all-or-nothing
pub fn restore_from_json(conn: &Connection, json: &[u8]) -> Result<RestoreStats> {
    let data: BackupData = serde_json::from_slice(json).context("Invalid backup JSON")?;

    let tx = conn.unchecked_transaction()?;
    clear_all(&tx)?;

    // Parents before children
    for p in &data.people {
        insert_person(&tx, p).with_context(|| format!("person {}", p.id))?;
    }
    for a in &data.assets {
        insert_asset(&tx, a).with_context(|| format!("asset {}", a.id))?;
    }
    for ap in &data.appraisals {
        insert_appraisal(&tx, ap).with_context(|| format!("appraisal {}", ap.id))?;
    }
    for m in &data.milestones {
        insert_milestone(&tx, m)?;
    }
    for t in &data.tasks {
        insert_task(&tx, t)?;
    }
    for s in &data.structures {
        insert_structure(&tx, s)?;
    }
    for l in &data.locations {
        insert_location(&tx, l)?;
    }
    for b in &data.bills {
        insert_bill(&tx, b)?;
    }
    for v in &data.vendors {
        insert_vendor(&tx, v)?;
    }
    for b in &data.beneficiaries {
        upsert_beneficiary(&tx, b)?;
    }

    tx.commit()?;

    let stats = RestoreStats {
        people: data.people.len(),
        assets: data.assets.len(),
        appraisals: data.appraisals.len(),
        milestones: data.milestones.len(),
        tasks: data.tasks.len(),
        structures: data.structures.len(),
        locations: data.locations.len(),
        bills: data.bills.len(),
        vendors: data.vendors.len(),
        beneficiaries: data.beneficiaries.len(),
    };
    info!(version = %data.version, "{}", stats.summary());
    Ok(stats)
}

/// Restore from an uploaded file, mapping failures to user-facing messages
pub fn restore_file(conn: &Connection, file_name: &str, bytes: &[u8]) -> Result<RestoreStats, RestoreError> {
    let json = match extract_json(file_name, bytes) {
        Ok(Some(json)) => json,
        Ok(None) => return Err(RestoreError::NoJsonData),
        Err(e) => {
            warn!(file_name, error = %e, "unreadable backup upload");
            return Err(RestoreError::Failed(e.to_string()));
        }
    };

    restore_from_json(conn, &json).map_err(|e| {
        warn!(file_name, error = %format!("{:#}", e), "restore rolled back");
        RestoreError::Failed(format!("{:#}", e))
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{count_rows, open_in_memory, TABLES};
    use crate::entities::asset::{get_asset, AssetType};
    use crate::entities::person::get_person;
    use crate::reconciliation::ValuationEngine;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 10, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn populated() -> Connection {
        let conn = open_in_memory().unwrap();
        let mut jane = Person::new("Jane <Doe>", Some("Trustor"));
        jane.id = 5;
        insert_person(&conn, &jane).unwrap();

        let mut house = Asset::new("House", AssetType::RealEstate, 600000.0);
        house.id = 10;
        house.owner_id = Some(5);
        insert_asset(&conn, &house).unwrap();
        ValuationEngine::new()
            .record(
                &conn,
                &Appraisal::new(10, NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(), 400000.0, "Purchase"),
            )
            .unwrap();
        insert_task(&conn, &Task::new("Call lawyer", None)).unwrap();
        insert_milestone(&conn, &Milestone::new("Estate Plan Signed", None)).unwrap();
        upsert_beneficiary(
            &conn,
            &Beneficiary {
                asset_id: 10,
                person_id: 5,
                percentage: 100.0,
            },
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_zip_contains_json_and_readme() {
        let conn = populated();
        let bytes = export_zip(&conn, now()).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names, vec!["estate_data_20241001.json", "READ_ME_20241001.html"]);

        let mut html = String::new();
        archive.by_index(1).unwrap().read_to_string(&mut html).unwrap();
        assert!(html.contains("Jane &lt;Doe&gt; (Trustor)"));
        assert!(html.contains("$400,000"));
        assert!(html.contains("SHA-256"));

        let json = extract_json("estate_backup.zip", &bytes).unwrap().unwrap();
        let data: BackupData = serde_json::from_slice(&json).unwrap();
        assert_eq!(data.version, "1.0");
        assert_eq!(data.timestamp, "2024-10-01T09:30:00");
        assert_eq!(data.appraisals.len(), 1);
    }

    #[test]
    fn test_restore_roundtrip_preserves_ids() {
        let source = populated();
        let bytes = export_zip(&source, now()).unwrap();

        let target = open_in_memory().unwrap();
        insert_person(&target, &Person::new("Stale", None)).unwrap();

        let stats = restore_file(&target, "backup.zip", &bytes).unwrap();
        assert_eq!(stats.people, 1);
        assert_eq!(stats.tasks, 1);

        let jane = get_person(&target, 5).unwrap().unwrap();
        assert_eq!(jane.name, "Jane <Doe>");
        let house = get_asset(&target, 10).unwrap().unwrap();
        assert_eq!(house.owner_id, Some(5));
        assert_eq!(house.purchase_price(), Some(400000.0));
        assert_eq!(count_rows(&target, "asset_beneficiary").unwrap(), 1);
        assert_eq!(count_rows(&target, "person").unwrap(), 1, "stale rows replaced");
    }

    #[test]
    fn test_restore_legacy_json() {
        let conn = open_in_memory().unwrap();
        let legacy = br#"{
            "version": "1.0",
            "timestamp": "2024-03-01T12:00:00.123456",
            "people": [{"id": 1, "name": "Trustor (Example)", "role": "Trustor",
                        "email": null, "phone": null, "attributes": {"notes": "The Grantor"}}],
            "assets": [{"id": 1, "name": "Example House", "asset_type": "Property",
                        "is_in_trust": true, "owner_id": 1, "value_estimated": 500000.0, "attributes": null}],
            "milestones": [{"id": 1, "title": "Trust Funded", "date_event": "2024-01-15T00:00:00",
                            "description": null, "is_completed": false}],
            "tasks": []
        }"#;

        let stats = restore_file(&conn, "estate_data_20240301.json", legacy).unwrap();
        assert_eq!(stats.assets, 1);
        assert_eq!(stats.appraisals, 0);

        let milestones = list_milestones(&conn).unwrap();
        assert_eq!(milestones[0].date_event, NaiveDate::from_ymd_opt(2024, 1, 15));
    }

    #[test]
    fn test_unsupported_and_empty_uploads() {
        let conn = populated();

        let err = restore_file(&conn, "notes.txt", b"hello").unwrap_err();
        assert_eq!(err.to_string(), "Could not find valid JSON data in file.");

        // ZIP without a JSON entry
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file("photo.jpg", SimpleFileOptions::default()).unwrap();
        writer.write_all(b"jpeg").unwrap();
        let zip = writer.finish().unwrap().into_inner();
        assert!(matches!(restore_file(&conn, "b.zip", &zip), Err(RestoreError::NoJsonData)));
    }

    #[test]
    fn test_failed_restore_rolls_back() {
        let conn = populated();
        let before: Vec<i64> = TABLES.iter().map(|t| count_rows(&conn, t).unwrap()).collect();

        let err = restore_file(&conn, "bad.json", b"{not json").unwrap_err();
        assert!(err.to_string().starts_with("Restore failed: "));

        // Appraisal pointing at an asset that is not in the dump
        let dangling = br#"{"people": [], "assets": [],
            "appraisals": [{"id": 1, "asset_id": 99, "date": "2024-01-01", "value": 1.0, "source": "x"}]}"#;
        assert!(matches!(restore_file(&conn, "d.json", dangling), Err(RestoreError::Failed(_))));

        let after: Vec<i64> = TABLES.iter().map(|t| count_rows(&conn, t).unwrap()).collect();
        assert_eq!(before, after);

        assert!(matches!(
            restore_file(&conn, "broken.zip", b"PK not really"),
            Err(RestoreError::Failed(_))
        ));
    }
}

// 📜 Appraisal Entity - one dated valuation of one asset
//
// Ordering key is (date, id): same-day records fall back to insertion order.
// Mutations that must keep the asset's value in sync go through
// reconciliation::ValuationEngine, not these raw functions.

use crate::format::de_date;
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

/// Source label of the record mirrored into purchase_date / purchase_price
pub const PURCHASE_SOURCE: &str = "Purchase";

/// Source label used for the value captured when an asset is created
pub const INITIAL_ENTRY_SOURCE: &str = "Initial Entry";

/// Source label used when an asset edit changes its value
pub const MANUAL_UPDATE_SOURCE: &str = "Manual Update";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appraisal {
    #[serde(default)]
    pub id: i64,
    pub asset_id: i64,
    #[serde(deserialize_with = "de_date")]
    pub date: NaiveDate,
    pub value: f64,
    pub source: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Appraisal {
    pub fn new(asset_id: i64, date: NaiveDate, value: f64, source: impl Into<String>) -> Self {
        Appraisal {
            id: 0,
            asset_id,
            date,
            value,
            source: source.into(),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn is_purchase(&self) -> bool {
        self.source == PURCHASE_SOURCE
    }
}

// ============================================================================
// PERSISTENCE
// ============================================================================

const APPRAISAL_COLUMNS: &str = "id, asset_id, date, value, source, notes";

fn appraisal_from_row(row: &Row) -> rusqlite::Result<Appraisal> {
    Ok(Appraisal {
        id: row.get(0)?,
        asset_id: row.get(1)?,
        date: row.get(2)?,
        value: row.get(3)?,
        source: row.get(4)?,
        notes: row.get(5)?,
    })
}

/// Insert an appraisal; a non-zero `id` is preserved (restore)
pub fn insert_appraisal(conn: &Connection, appraisal: &Appraisal) -> Result<i64> {
    conn.execute(
        "INSERT INTO appraisal (id, asset_id, date, value, source, notes)
         VALUES (NULLIF(?1, 0), ?2, ?3, ?4, ?5, ?6)",
        params![
            appraisal.id,
            appraisal.asset_id,
            appraisal.date,
            appraisal.value,
            appraisal.source,
            appraisal.notes,
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

pub fn get_appraisal(conn: &Connection, id: i64) -> Result<Option<Appraisal>> {
    let appraisal = conn
        .query_row(
            &format!("SELECT {} FROM appraisal WHERE id = ?1", APPRAISAL_COLUMNS),
            [id],
            appraisal_from_row,
        )
        .optional()?;

    Ok(appraisal)
}

/// Valuation history of one asset, oldest first
pub fn list_appraisals_for_asset(conn: &Connection, asset_id: i64) -> Result<Vec<Appraisal>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM appraisal WHERE asset_id = ?1 ORDER BY date, id",
        APPRAISAL_COLUMNS
    ))?;

    let appraisals = stmt
        .query_map([asset_id], appraisal_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(appraisals)
}

/// Every appraisal grouped by asset, oldest first
pub fn list_all_appraisals(conn: &Connection) -> Result<Vec<Appraisal>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM appraisal ORDER BY asset_id, date, id",
        APPRAISAL_COLUMNS
    ))?;

    let appraisals = stmt
        .query_map([], appraisal_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(appraisals)
}

pub fn update_appraisal(conn: &Connection, appraisal: &Appraisal) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE appraisal SET date = ?1, value = ?2, source = ?3, notes = ?4 WHERE id = ?5",
        params![
            appraisal.date,
            appraisal.value,
            appraisal.source,
            appraisal.notes,
            appraisal.id,
        ],
    )?;

    Ok(changed > 0)
}

pub fn delete_appraisal(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM appraisal WHERE id = ?1", [id])?;
    Ok(changed > 0)
}

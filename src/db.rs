use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Free-form attribute map stored as a JSON column
/// ("Gate Code", "VIN", "purchase_date", ...)
pub type Attributes = Map<String, Value>;

/// Every table, children first (safe deletion order)
pub const TABLES: [&str; 10] = [
    "asset_beneficiary",
    "asset_vendor",
    "recurring_bill",
    "location_point",
    "property_structure",
    "appraisal",
    "task",
    "milestone",
    "asset",
    "person",
];

/// Open (or create) the estate database at `path` and make sure the schema exists
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database at {}", path.display()))?;
    setup_database(&conn)?;
    debug!(path = %path.display(), "database opened");
    Ok(conn)
}

/// In-memory database with the full schema (tests, dry runs)
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    setup_database(&conn)?;
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL for crash recovery; in-memory databases silently stay in "memory" mode
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    debug!(journal_mode = %mode, "schema setup");

    // ==========================================================================
    // People & Assets
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS person (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            role TEXT,
            email TEXT,
            phone TEXT,
            attributes TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS asset (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            asset_type TEXT,
            is_in_trust INTEGER NOT NULL DEFAULT 1,
            owner_id INTEGER REFERENCES person(id) ON DELETE SET NULL,
            value_estimated REAL NOT NULL DEFAULT 0.0,
            attributes TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS asset_beneficiary (
            asset_id INTEGER NOT NULL REFERENCES asset(id) ON DELETE CASCADE,
            person_id INTEGER NOT NULL REFERENCES person(id) ON DELETE CASCADE,
            percentage REAL NOT NULL DEFAULT 50.0,
            PRIMARY KEY (asset_id, person_id)
        )",
        [],
    )?;

    // ==========================================================================
    // Valuation history
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS appraisal (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            asset_id INTEGER NOT NULL REFERENCES asset(id) ON DELETE CASCADE,
            date TEXT NOT NULL,
            value REAL NOT NULL,
            source TEXT NOT NULL,
            notes TEXT
        )",
        [],
    )?;

    // ==========================================================================
    // Planning
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS milestone (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            date_event TEXT,
            description TEXT,
            is_completed INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS task (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'Pending',
            due_date TEXT,
            is_recurring INTEGER NOT NULL DEFAULT 0,
            asset_id INTEGER REFERENCES asset(id) ON DELETE SET NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Asset sub-records
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS property_structure (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            asset_id INTEGER NOT NULL REFERENCES asset(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            structure_type TEXT,
            description TEXT,
            date_built TEXT,
            date_last_maintained TEXT,
            notes TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS location_point (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            asset_id INTEGER NOT NULL REFERENCES asset(id) ON DELETE CASCADE,
            label TEXT NOT NULL,
            latitude REAL NOT NULL,
            longitude REAL NOT NULL,
            description TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS recurring_bill (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            asset_id INTEGER NOT NULL REFERENCES asset(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            payee TEXT,
            amount_estimated REAL,
            frequency TEXT,
            is_autopay INTEGER NOT NULL DEFAULT 0,
            next_due_date TEXT,
            notes TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS asset_vendor (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            asset_id INTEGER NOT NULL REFERENCES asset(id) ON DELETE CASCADE,
            person_id INTEGER NOT NULL REFERENCES person(id) ON DELETE CASCADE,
            role TEXT NOT NULL,
            notes TEXT
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_appraisal_asset_date ON appraisal(asset_id, date)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_asset_value ON asset(value_estimated)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_task_due ON task(due_date)",
        [],
    )?;

    Ok(())
}

/// Delete every row from every table (children first)
pub fn clear_all(conn: &Connection) -> Result<()> {
    for table in TABLES {
        conn.execute(&format!("DELETE FROM {}", table), [])?;
    }
    Ok(())
}

/// Row count for one of the known tables
pub fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    if !TABLES.contains(&table) {
        bail!("Unknown table: {}", table);
    }

    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })?;

    Ok(count)
}

/// Serialize an attribute map for its JSON column
pub fn attributes_to_json(attributes: &Attributes) -> Result<String> {
    Ok(serde_json::to_string(attributes)?)
}

/// Parse an attribute column; NULL or malformed JSON yields an empty map
pub fn attributes_from_json(column: Option<String>) -> Attributes {
    match column {
        Some(json_str) => match serde_json::from_str::<Value>(&json_str) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        },
        None => Map::new(),
    }
}

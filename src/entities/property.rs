// 🏗️ Asset Sub-Records - structures, location pins, recurring bills, vendor links
//
// All four hang off one asset and disappear with it.

use crate::format::{de_opt_date, null_as_default};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

/// Bill frequencies offered by the bill form
pub const BILL_FREQUENCIES: [&str; 4] = ["Monthly", "Quarterly", "Annually", "One-time"];

// ============================================================================
// PROPERTY STRUCTURE (well, barn, septic tank, roof...)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyStructure {
    #[serde(default)]
    pub id: i64,
    pub asset_id: i64,
    pub name: String,
    #[serde(default)]
    pub structure_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub date_built: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub date_last_maintained: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PropertyStructure {
    pub fn new(asset_id: i64, name: impl Into<String>) -> Self {
        PropertyStructure {
            id: 0,
            asset_id,
            name: name.into(),
            structure_type: None,
            description: None,
            date_built: None,
            date_last_maintained: None,
            notes: None,
        }
    }
}

const STRUCTURE_COLUMNS: &str =
    "id, asset_id, name, structure_type, description, date_built, date_last_maintained, notes";

fn structure_from_row(row: &Row) -> rusqlite::Result<PropertyStructure> {
    Ok(PropertyStructure {
        id: row.get(0)?,
        asset_id: row.get(1)?,
        name: row.get(2)?,
        structure_type: row.get(3)?,
        description: row.get(4)?,
        date_built: row.get(5)?,
        date_last_maintained: row.get(6)?,
        notes: row.get(7)?,
    })
}

pub fn insert_structure(conn: &Connection, s: &PropertyStructure) -> Result<i64> {
    conn.execute(
        "INSERT INTO property_structure
             (id, asset_id, name, structure_type, description, date_built, date_last_maintained, notes)
         VALUES (NULLIF(?1, 0), ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            s.id,
            s.asset_id,
            s.name,
            s.structure_type,
            s.description,
            s.date_built,
            s.date_last_maintained,
            s.notes,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_structure(conn: &Connection, id: i64) -> Result<Option<PropertyStructure>> {
    let s = conn
        .query_row(
            &format!("SELECT {} FROM property_structure WHERE id = ?1", STRUCTURE_COLUMNS),
            [id],
            structure_from_row,
        )
        .optional()?;
    Ok(s)
}

pub fn list_structures_for_asset(conn: &Connection, asset_id: i64) -> Result<Vec<PropertyStructure>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM property_structure WHERE asset_id = ?1 ORDER BY name COLLATE NOCASE, id",
        STRUCTURE_COLUMNS
    ))?;
    let rows = stmt
        .query_map([asset_id], structure_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_all_structures(conn: &Connection) -> Result<Vec<PropertyStructure>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM property_structure ORDER BY id",
        STRUCTURE_COLUMNS
    ))?;
    let rows = stmt
        .query_map([], structure_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn update_structure(conn: &Connection, s: &PropertyStructure) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE property_structure
         SET name = ?1, structure_type = ?2, description = ?3, date_built = ?4,
             date_last_maintained = ?5, notes = ?6
         WHERE id = ?7",
        params![
            s.name,
            s.structure_type,
            s.description,
            s.date_built,
            s.date_last_maintained,
            s.notes,
            s.id,
        ],
    )?;
    Ok(changed > 0)
}

pub fn delete_structure(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM property_structure WHERE id = ?1", [id])?;
    Ok(changed > 0)
}

// ============================================================================
// LOCATION POINT (gate, shutoff valve, property corner...)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPoint {
    #[serde(default)]
    pub id: i64,
    pub asset_id: i64,
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub description: Option<String>,
}

impl LocationPoint {
    pub fn new(asset_id: i64, label: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        LocationPoint {
            id: 0,
            asset_id,
            label: label.into(),
            latitude,
            longitude,
            description: None,
        }
    }

    /// Link for the "Open in Maps" button
    pub fn maps_url(&self) -> String {
        format!(
            "https://www.google.com/maps/search/?api=1&query={},{}",
            self.latitude, self.longitude
        )
    }
}

fn location_from_row(row: &Row) -> rusqlite::Result<LocationPoint> {
    Ok(LocationPoint {
        id: row.get(0)?,
        asset_id: row.get(1)?,
        label: row.get(2)?,
        latitude: row.get(3)?,
        longitude: row.get(4)?,
        description: row.get(5)?,
    })
}

pub fn insert_location(conn: &Connection, p: &LocationPoint) -> Result<i64> {
    conn.execute(
        "INSERT INTO location_point (id, asset_id, label, latitude, longitude, description)
         VALUES (NULLIF(?1, 0), ?2, ?3, ?4, ?5, ?6)",
        params![p.id, p.asset_id, p.label, p.latitude, p.longitude, p.description],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_location(conn: &Connection, id: i64) -> Result<Option<LocationPoint>> {
    let p = conn
        .query_row(
            "SELECT id, asset_id, label, latitude, longitude, description
             FROM location_point WHERE id = ?1",
            [id],
            location_from_row,
        )
        .optional()?;
    Ok(p)
}

pub fn list_locations_for_asset(conn: &Connection, asset_id: i64) -> Result<Vec<LocationPoint>> {
    let mut stmt = conn.prepare(
        "SELECT id, asset_id, label, latitude, longitude, description
         FROM location_point WHERE asset_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map([asset_id], location_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_all_locations(conn: &Connection) -> Result<Vec<LocationPoint>> {
    let mut stmt = conn.prepare(
        "SELECT id, asset_id, label, latitude, longitude, description
         FROM location_point ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], location_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn update_location(conn: &Connection, p: &LocationPoint) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE location_point SET label = ?1, latitude = ?2, longitude = ?3, description = ?4
         WHERE id = ?5",
        params![p.label, p.latitude, p.longitude, p.description, p.id],
    )?;
    Ok(changed > 0)
}

pub fn delete_location(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM location_point WHERE id = ?1", [id])?;
    Ok(changed > 0)
}

// ============================================================================
// RECURRING BILL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringBill {
    #[serde(default)]
    pub id: i64,
    pub asset_id: i64,
    pub name: String,
    #[serde(default)]
    pub payee: Option<String>,
    #[serde(default)]
    pub amount_estimated: Option<f64>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_autopay: bool,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub next_due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RecurringBill {
    pub fn new(asset_id: i64, name: impl Into<String>) -> Self {
        RecurringBill {
            id: 0,
            asset_id,
            name: name.into(),
            payee: None,
            amount_estimated: None,
            frequency: None,
            is_autopay: false,
            next_due_date: None,
            notes: None,
        }
    }
}

const BILL_COLUMNS: &str =
    "id, asset_id, name, payee, amount_estimated, frequency, is_autopay, next_due_date, notes";

fn bill_from_row(row: &Row) -> rusqlite::Result<RecurringBill> {
    Ok(RecurringBill {
        id: row.get(0)?,
        asset_id: row.get(1)?,
        name: row.get(2)?,
        payee: row.get(3)?,
        amount_estimated: row.get(4)?,
        frequency: row.get(5)?,
        is_autopay: row.get(6)?,
        next_due_date: row.get(7)?,
        notes: row.get(8)?,
    })
}

pub fn insert_bill(conn: &Connection, b: &RecurringBill) -> Result<i64> {
    conn.execute(
        "INSERT INTO recurring_bill
             (id, asset_id, name, payee, amount_estimated, frequency, is_autopay, next_due_date, notes)
         VALUES (NULLIF(?1, 0), ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            b.id,
            b.asset_id,
            b.name,
            b.payee,
            b.amount_estimated,
            b.frequency,
            b.is_autopay,
            b.next_due_date,
            b.notes,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_bill(conn: &Connection, id: i64) -> Result<Option<RecurringBill>> {
    let b = conn
        .query_row(
            &format!("SELECT {} FROM recurring_bill WHERE id = ?1", BILL_COLUMNS),
            [id],
            bill_from_row,
        )
        .optional()?;
    Ok(b)
}

pub fn list_bills_for_asset(conn: &Connection, asset_id: i64) -> Result<Vec<RecurringBill>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM recurring_bill WHERE asset_id = ?1
         ORDER BY next_due_date IS NULL, next_due_date, id",
        BILL_COLUMNS
    ))?;
    let rows = stmt
        .query_map([asset_id], bill_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_all_bills(conn: &Connection) -> Result<Vec<RecurringBill>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM recurring_bill ORDER BY id", BILL_COLUMNS))?;
    let rows = stmt
        .query_map([], bill_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn update_bill(conn: &Connection, b: &RecurringBill) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE recurring_bill
         SET name = ?1, payee = ?2, amount_estimated = ?3, frequency = ?4, is_autopay = ?5,
             next_due_date = ?6, notes = ?7
         WHERE id = ?8",
        params![
            b.name,
            b.payee,
            b.amount_estimated,
            b.frequency,
            b.is_autopay,
            b.next_due_date,
            b.notes,
            b.id,
        ],
    )?;
    Ok(changed > 0)
}

pub fn delete_bill(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM recurring_bill WHERE id = ?1", [id])?;
    Ok(changed > 0)
}

// ============================================================================
// ASSET VENDOR (person ↔ asset service link)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetVendor {
    #[serde(default)]
    pub id: i64,
    pub asset_id: i64,
    pub person_id: i64,
    /// "Plumber", "Insurance Agent"
    pub role: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl AssetVendor {
    pub fn new(asset_id: i64, person_id: i64, role: impl Into<String>) -> Self {
        AssetVendor {
            id: 0,
            asset_id,
            person_id,
            role: role.into(),
            notes: None,
        }
    }
}

fn vendor_from_row(row: &Row) -> rusqlite::Result<AssetVendor> {
    Ok(AssetVendor {
        id: row.get(0)?,
        asset_id: row.get(1)?,
        person_id: row.get(2)?,
        role: row.get(3)?,
        notes: row.get(4)?,
    })
}

pub fn insert_vendor(conn: &Connection, v: &AssetVendor) -> Result<i64> {
    conn.execute(
        "INSERT INTO asset_vendor (id, asset_id, person_id, role, notes)
         VALUES (NULLIF(?1, 0), ?2, ?3, ?4, ?5)",
        params![v.id, v.asset_id, v.person_id, v.role, v.notes],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_vendor(conn: &Connection, id: i64) -> Result<Option<AssetVendor>> {
    let v = conn
        .query_row(
            "SELECT id, asset_id, person_id, role, notes FROM asset_vendor WHERE id = ?1",
            [id],
            vendor_from_row,
        )
        .optional()?;
    Ok(v)
}

pub fn list_vendors_for_asset(conn: &Connection, asset_id: i64) -> Result<Vec<AssetVendor>> {
    let mut stmt = conn.prepare(
        "SELECT id, asset_id, person_id, role, notes FROM asset_vendor
         WHERE asset_id = ?1 ORDER BY role COLLATE NOCASE, id",
    )?;
    let rows = stmt
        .query_map([asset_id], vendor_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_all_vendors(conn: &Connection) -> Result<Vec<AssetVendor>> {
    let mut stmt =
        conn.prepare("SELECT id, asset_id, person_id, role, notes FROM asset_vendor ORDER BY id")?;
    let rows = stmt
        .query_map([], vendor_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn update_vendor(conn: &Connection, v: &AssetVendor) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE asset_vendor SET person_id = ?1, role = ?2, notes = ?3 WHERE id = ?4",
        params![v.person_id, v.role, v.notes, v.id],
    )?;
    Ok(changed > 0)
}

pub fn delete_vendor(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM asset_vendor WHERE id = ?1", [id])?;
    Ok(changed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{count_rows, open_in_memory};
    use crate::entities::asset::{delete_asset, insert_asset, Asset, AssetType};
    use crate::entities::person::{delete_person, insert_person, Person};

    fn ranch(conn: &Connection) -> i64 {
        insert_asset(conn, &Asset::new("Ranch", AssetType::RealEstate, 900000.0)).unwrap()
    }

    #[test]
    fn test_structure_crud() {
        let conn = open_in_memory().unwrap();
        let asset = ranch(&conn);

        let mut well = PropertyStructure::new(asset, "Well #1");
        well.structure_type = Some("Well".to_string());
        well.date_last_maintained = NaiveDate::from_ymd_opt(2023, 8, 1);
        let id = insert_structure(&conn, &well).unwrap();

        let mut loaded = get_structure(&conn, id).unwrap().unwrap();
        assert_eq!(loaded.date_last_maintained, well.date_last_maintained);

        loaded.notes = Some("Pump replaced".to_string());
        assert!(update_structure(&conn, &loaded).unwrap());
        assert_eq!(list_structures_for_asset(&conn, asset).unwrap(), vec![loaded]);

        assert!(delete_structure(&conn, id).unwrap());
        assert!(list_all_structures(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_location_crud_and_maps_link() {
        let conn = open_in_memory().unwrap();
        let asset = ranch(&conn);

        let gate = LocationPoint::new(asset, "Main Gate", 30.2672, -97.7431);
        assert_eq!(
            gate.maps_url(),
            "https://www.google.com/maps/search/?api=1&query=30.2672,-97.7431"
        );

        let id = insert_location(&conn, &gate).unwrap();
        let mut loaded = get_location(&conn, id).unwrap().unwrap();
        loaded.description = Some("Code 1234".to_string());
        update_location(&conn, &loaded).unwrap();

        assert_eq!(list_locations_for_asset(&conn, asset).unwrap()[0].description.as_deref(), Some("Code 1234"));
        assert!(delete_location(&conn, id).unwrap());
    }

    #[test]
    fn test_bills_ordered_by_due_date() {
        let conn = open_in_memory().unwrap();
        let asset = ranch(&conn);

        insert_bill(&conn, &RecurringBill::new(asset, "Undated")).unwrap();
        let mut tax = RecurringBill::new(asset, "Property Tax");
        tax.next_due_date = NaiveDate::from_ymd_opt(2025, 1, 31);
        tax.amount_estimated = Some(8200.0);
        let tax_id = insert_bill(&conn, &tax).unwrap();

        let bills = list_bills_for_asset(&conn, asset).unwrap();
        assert_eq!(bills[0].id, tax_id);
        assert_eq!(bills[1].name, "Undated");

        let mut loaded = get_bill(&conn, tax_id).unwrap().unwrap();
        loaded.is_autopay = true;
        update_bill(&conn, &loaded).unwrap();
        assert!(get_bill(&conn, tax_id).unwrap().unwrap().is_autopay);

        assert!(delete_bill(&conn, tax_id).unwrap());
        assert_eq!(list_all_bills(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_vendor_links_cascade() {
        let conn = open_in_memory().unwrap();
        let asset = ranch(&conn);
        let plumber = insert_person(&conn, &Person::new("Mario", Some("Vendor"))).unwrap();

        let id = insert_vendor(&conn, &AssetVendor::new(asset, plumber, "Plumber")).unwrap();
        let mut link = get_vendor(&conn, id).unwrap().unwrap();
        link.notes = Some("Call before 5pm".to_string());
        update_vendor(&conn, &link).unwrap();
        assert_eq!(list_vendors_for_asset(&conn, asset).unwrap(), vec![link]);

        delete_person(&conn, plumber).unwrap();
        assert!(list_all_vendors(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_sub_records_removed_with_asset() {
        let conn = open_in_memory().unwrap();
        let asset = ranch(&conn);
        insert_structure(&conn, &PropertyStructure::new(asset, "Barn")).unwrap();
        insert_location(&conn, &LocationPoint::new(asset, "Corner", 1.0, 2.0)).unwrap();
        insert_bill(&conn, &RecurringBill::new(asset, "Electric")).unwrap();

        delete_asset(&conn, asset).unwrap();

        for table in ["property_structure", "location_point", "recurring_bill"] {
            assert_eq!(count_rows(&conn, table).unwrap(), 0);
        }
    }

    #[test]
    fn test_legacy_bill_row() {
        let bill: RecurringBill = serde_json::from_str(
            r#"{"id": 4, "asset_id": 1, "name": "Water", "is_autopay": null,
                "next_due_date": "2024-02-01T00:00:00", "amount_estimated": null}"#,
        )
        .unwrap();
        assert!(!bill.is_autopay);
        assert_eq!(bill.next_due_date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(bill.amount_estimated, None);
    }
}

// 🏠 Asset Entity - anything with a value, positive (asset) or negative (liability)
//
// The sign of value_estimated is the only asset-vs-liability classifier.
// Type-specific details (VIN, address, lender...) live in the attributes map.

use crate::db::{attributes_from_json, attributes_to_json, Attributes};
use crate::format::{null_as_default, parse_date};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

/// Attribute keys mirrored from the "Purchase" appraisal
pub const ATTR_PURCHASE_DATE: &str = "purchase_date";
pub const ATTR_PURCHASE_PRICE: &str = "purchase_price";

// ============================================================================
// ASSET TYPE CATALOG
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    RealEstate,
    Bank,
    Investment,
    Vehicle,
    Jewelry,
    Art,
    Liability,
    Utility,
    Other,
}

impl AssetType {
    pub const ALL: [AssetType; 9] = [
        AssetType::RealEstate,
        AssetType::Bank,
        AssetType::Investment,
        AssetType::Vehicle,
        AssetType::Jewelry,
        AssetType::Art,
        AssetType::Liability,
        AssetType::Utility,
        AssetType::Other,
    ];

    /// Stored type tag
    pub fn code(&self) -> &'static str {
        match self {
            AssetType::RealEstate => "RealEstate",
            AssetType::Bank => "Bank",
            AssetType::Investment => "Investment",
            AssetType::Vehicle => "Vehicle",
            AssetType::Jewelry => "Jewelry",
            AssetType::Art => "Art",
            AssetType::Liability => "Liability",
            AssetType::Utility => "Utility",
            AssetType::Other => "Other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AssetType::RealEstate => "Real Estate Property",
            AssetType::Bank => "Bank Account",
            AssetType::Investment => "Investment Portfolio",
            AssetType::Vehicle => "Vehicle",
            AssetType::Jewelry => "Jewelry / Watch",
            AssetType::Art => "Art / Collectible",
            AssetType::Liability => "Loan / Debt",
            AssetType::Utility => "Utility Account",
            AssetType::Other => "Other Asset",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            AssetType::RealEstate => "🏠",
            AssetType::Bank => "🏦",
            AssetType::Investment => "📈",
            AssetType::Vehicle => "🚗",
            AssetType::Jewelry => "💎",
            AssetType::Art => "🎨",
            AssetType::Liability => "💳",
            AssetType::Utility => "💡",
            AssetType::Other => "📦",
        }
    }

    pub fn from_code(code: &str) -> Option<AssetType> {
        AssetType::ALL.iter().copied().find(|t| t.code() == code)
    }

    /// Icon for any stored tag; unknown tags get the "Other" box
    pub fn icon_for(code: &str) -> &'static str {
        AssetType::from_code(code)
            .unwrap_or(AssetType::Other)
            .icon()
    }
}

// ============================================================================
// ASSET ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default)]
    pub id: i64,

    /// "Casa de Oro", "2020 Ford F-150"
    pub name: String,

    /// Type tag (see [`AssetType`]); kept as a string so legacy tags survive
    #[serde(default, deserialize_with = "null_as_default")]
    pub asset_type: String,

    #[serde(default = "default_in_trust", deserialize_with = "null_as_default_true")]
    pub is_in_trust: bool,

    #[serde(default)]
    pub owner_id: Option<i64>,

    /// Positive = asset, negative = liability
    #[serde(default, deserialize_with = "null_as_default")]
    pub value_estimated: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: Attributes,
}

fn default_in_trust() -> bool {
    true
}

fn null_as_default_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

impl Asset {
    pub fn new(name: impl Into<String>, asset_type: AssetType, value_estimated: f64) -> Self {
        Asset {
            id: 0,
            name: name.into(),
            asset_type: asset_type.code().to_string(),
            is_in_trust: true,
            owner_id: None,
            value_estimated,
            attributes: Attributes::new(),
        }
    }

    pub fn kind(&self) -> Option<AssetType> {
        AssetType::from_code(&self.asset_type)
    }

    pub fn icon(&self) -> &'static str {
        AssetType::icon_for(&self.asset_type)
    }

    pub fn is_liability(&self) -> bool {
        self.value_estimated < 0.0
    }

    /// Cached purchase date (mirrors the "Purchase" appraisal)
    pub fn purchase_date(&self) -> Option<NaiveDate> {
        self.attributes
            .get(ATTR_PURCHASE_DATE)
            .and_then(|v| v.as_str())
            .and_then(parse_date)
    }

    /// Cached purchase price; accepts numbers and numeric strings
    pub fn purchase_price(&self) -> Option<f64> {
        match self.attributes.get(ATTR_PURCHASE_PRICE)? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Attribute rendered as display text (strings unquoted)
    pub fn attribute_text(&self, key: &str) -> Option<String> {
        match self.attributes.get(key)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

// ============================================================================
// BENEFICIARY DESIGNATION (asset ↔ person, with share)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beneficiary {
    pub asset_id: i64,
    pub person_id: i64,
    #[serde(default = "default_share")]
    pub percentage: f64,
}

fn default_share() -> f64 {
    50.0
}

// ============================================================================
// PERSISTENCE
// ============================================================================

const ASSET_COLUMNS: &str =
    "id, name, asset_type, is_in_trust, owner_id, value_estimated, attributes";

fn asset_from_row(row: &Row) -> rusqlite::Result<Asset> {
    let asset_type: Option<String> = row.get(2)?;
    Ok(Asset {
        id: row.get(0)?,
        name: row.get(1)?,
        asset_type: asset_type.unwrap_or_default(),
        is_in_trust: row.get(3)?,
        owner_id: row.get(4)?,
        value_estimated: row.get(5)?,
        attributes: attributes_from_json(row.get(6)?),
    })
}

fn query_assets(conn: &Connection, where_clause: &str) -> Result<Vec<Asset>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM asset {} ORDER BY name COLLATE NOCASE, id",
        ASSET_COLUMNS, where_clause
    ))?;

    let assets = stmt
        .query_map([], asset_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(assets)
}

/// Insert an asset; a non-zero `id` is preserved (restore)
pub fn insert_asset(conn: &Connection, asset: &Asset) -> Result<i64> {
    conn.execute(
        "INSERT INTO asset (id, name, asset_type, is_in_trust, owner_id, value_estimated, attributes)
         VALUES (NULLIF(?1, 0), ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            asset.id,
            asset.name,
            asset.asset_type,
            asset.is_in_trust,
            asset.owner_id,
            asset.value_estimated,
            attributes_to_json(&asset.attributes)?,
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

pub fn get_asset(conn: &Connection, id: i64) -> Result<Option<Asset>> {
    let asset = conn
        .query_row(
            &format!("SELECT {} FROM asset WHERE id = ?1", ASSET_COLUMNS),
            [id],
            asset_from_row,
        )
        .optional()?;

    Ok(asset)
}

/// Every asset and liability
pub fn list_assets(conn: &Connection) -> Result<Vec<Asset>> {
    query_assets(conn, "")
}

/// Assets proper: value >= 0
pub fn list_holdings(conn: &Connection) -> Result<Vec<Asset>> {
    query_assets(conn, "WHERE value_estimated >= 0")
}

/// Debts: value < 0
pub fn list_liabilities(conn: &Connection) -> Result<Vec<Asset>> {
    query_assets(conn, "WHERE value_estimated < 0")
}

pub fn list_assets_owned_by(conn: &Connection, person_id: i64) -> Result<Vec<Asset>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM asset WHERE owner_id = ?1 ORDER BY name COLLATE NOCASE, id",
        ASSET_COLUMNS
    ))?;

    let assets = stmt
        .query_map([person_id], asset_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(assets)
}

pub fn update_asset(conn: &Connection, asset: &Asset) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE asset
         SET name = ?1, asset_type = ?2, is_in_trust = ?3, owner_id = ?4,
             value_estimated = ?5, attributes = ?6
         WHERE id = ?7",
        params![
            asset.name,
            asset.asset_type,
            asset.is_in_trust,
            asset.owner_id,
            asset.value_estimated,
            attributes_to_json(&asset.attributes)?,
            asset.id,
        ],
    )?;

    Ok(changed > 0)
}

pub fn set_asset_value(conn: &Connection, id: i64, value: f64) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE asset SET value_estimated = ?1 WHERE id = ?2",
        params![value, id],
    )?;
    Ok(changed > 0)
}

pub fn set_asset_attributes(conn: &Connection, id: i64, attributes: &Attributes) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE asset SET attributes = ?1 WHERE id = ?2",
        params![attributes_to_json(attributes)?, id],
    )?;
    Ok(changed > 0)
}

/// Delete an asset together with its appraisals and sub-records
pub fn delete_asset(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM asset WHERE id = ?1", [id])?;
    Ok(changed > 0)
}

/// Designate (or re-weight) a beneficiary
pub fn upsert_beneficiary(conn: &Connection, beneficiary: &Beneficiary) -> Result<()> {
    conn.execute(
        "INSERT INTO asset_beneficiary (asset_id, person_id, percentage) VALUES (?1, ?2, ?3)
         ON CONFLICT(asset_id, person_id) DO UPDATE SET percentage = excluded.percentage",
        params![
            beneficiary.asset_id,
            beneficiary.person_id,
            beneficiary.percentage
        ],
    )?;
    Ok(())
}

pub fn remove_beneficiary(conn: &Connection, asset_id: i64, person_id: i64) -> Result<bool> {
    let changed = conn.execute(
        "DELETE FROM asset_beneficiary WHERE asset_id = ?1 AND person_id = ?2",
        params![asset_id, person_id],
    )?;
    Ok(changed > 0)
}

pub fn list_beneficiaries(conn: &Connection, asset_id: i64) -> Result<Vec<Beneficiary>> {
    let mut stmt = conn.prepare(
        "SELECT asset_id, person_id, percentage FROM asset_beneficiary
         WHERE asset_id = ?1 ORDER BY person_id",
    )?;

    let rows = stmt
        .query_map([asset_id], |row| {
            Ok(Beneficiary {
                asset_id: row.get(0)?,
                person_id: row.get(1)?,
                percentage: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn list_all_beneficiaries(conn: &Connection) -> Result<Vec<Beneficiary>> {
    let mut stmt = conn.prepare(
        "SELECT asset_id, person_id, percentage FROM asset_beneficiary
         ORDER BY asset_id, person_id",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(Beneficiary {
                asset_id: row.get(0)?,
                person_id: row.get(1)?,
                percentage: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

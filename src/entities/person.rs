// 👤 Person Entity - trustors, trustees, beneficiaries, professionals and vendors
//
// Role is an open tag: the known roles drive the contact form, but restored
// backups may carry any string.

use crate::db::{attributes_from_json, attributes_to_json, Attributes};
use crate::format::null_as_default;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

/// Roles offered by the contact form
pub const KNOWN_ROLES: [&str; 6] = [
    "Trustor",
    "Trustee",
    "Beneficiary",
    "Professional",
    "Vendor",
    "Other",
];

// ============================================================================
// PERSON ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Row id (0 until inserted)
    #[serde(default)]
    pub id: i64,

    pub name: String,

    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    /// Notes, address, account references...
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: Attributes,
}

impl Person {
    pub fn new(name: impl Into<String>, role: Option<&str>) -> Self {
        Person {
            id: 0,
            name: name.into(),
            role: role.map(str::to_string),
            email: None,
            phone: None,
            attributes: Attributes::new(),
        }
    }

    /// Role for display, "Unknown" when untagged
    pub fn role_label(&self) -> &str {
        self.role.as_deref().filter(|r| !r.is_empty()).unwrap_or("Unknown")
    }
}

// ============================================================================
// PERSISTENCE
// ============================================================================

const PERSON_COLUMNS: &str = "id, name, role, email, phone, attributes";

fn person_from_row(row: &Row) -> rusqlite::Result<Person> {
    Ok(Person {
        id: row.get(0)?,
        name: row.get(1)?,
        role: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        attributes: attributes_from_json(row.get(5)?),
    })
}

/// Insert a person; a non-zero `id` is preserved (restore), zero lets SQLite assign one
pub fn insert_person(conn: &Connection, person: &Person) -> Result<i64> {
    conn.execute(
        "INSERT INTO person (id, name, role, email, phone, attributes)
         VALUES (NULLIF(?1, 0), ?2, ?3, ?4, ?5, ?6)",
        params![
            person.id,
            person.name,
            person.role,
            person.email,
            person.phone,
            attributes_to_json(&person.attributes)?,
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

pub fn get_person(conn: &Connection, id: i64) -> Result<Option<Person>> {
    let person = conn
        .query_row(
            &format!("SELECT {} FROM person WHERE id = ?1", PERSON_COLUMNS),
            [id],
            person_from_row,
        )
        .optional()?;

    Ok(person)
}

/// All people, alphabetical
pub fn list_people(conn: &Connection) -> Result<Vec<Person>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM person ORDER BY name COLLATE NOCASE, id",
        PERSON_COLUMNS
    ))?;

    let people = stmt
        .query_map([], person_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(people)
}

/// Update all fields; returns false when the person does not exist
pub fn update_person(conn: &Connection, person: &Person) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE person SET name = ?1, role = ?2, email = ?3, phone = ?4, attributes = ?5
         WHERE id = ?6",
        params![
            person.name,
            person.role,
            person.email,
            person.phone,
            attributes_to_json(&person.attributes)?,
            person.id,
        ],
    )?;

    Ok(changed > 0)
}

/// Delete a person; owned assets lose their owner, vendor links and
/// beneficiary designations go with the person
pub fn delete_person(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM person WHERE id = ?1", [id])?;
    Ok(changed > 0)
}

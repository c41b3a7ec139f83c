// 🚩 Planning Entities - life/death milestones and to-do tasks

use crate::format::{de_opt_date, null_as_default};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

/// Statuses offered by the task form
pub const TASK_STATUSES: [&str; 3] = ["Pending", "In Progress", "Done"];

// ============================================================================
// MILESTONE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub date_event: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_completed: bool,
}

impl Milestone {
    pub fn new(title: impl Into<String>, date_event: Option<NaiveDate>) -> Self {
        Milestone {
            id: 0,
            title: title.into(),
            date_event,
            description: None,
            is_completed: false,
        }
    }
}

fn milestone_from_row(row: &Row) -> rusqlite::Result<Milestone> {
    Ok(Milestone {
        id: row.get(0)?,
        title: row.get(1)?,
        date_event: row.get(2)?,
        description: row.get(3)?,
        is_completed: row.get(4)?,
    })
}

pub fn insert_milestone(conn: &Connection, milestone: &Milestone) -> Result<i64> {
    conn.execute(
        "INSERT INTO milestone (id, title, date_event, description, is_completed)
         VALUES (NULLIF(?1, 0), ?2, ?3, ?4, ?5)",
        params![
            milestone.id,
            milestone.title,
            milestone.date_event,
            milestone.description,
            milestone.is_completed,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_milestone(conn: &Connection, id: i64) -> Result<Option<Milestone>> {
    let milestone = conn
        .query_row(
            "SELECT id, title, date_event, description, is_completed FROM milestone WHERE id = ?1",
            [id],
            milestone_from_row,
        )
        .optional()?;
    Ok(milestone)
}

/// Milestones in creation order (the planning page's timeline order)
pub fn list_milestones(conn: &Connection) -> Result<Vec<Milestone>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, date_event, description, is_completed FROM milestone ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], milestone_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn update_milestone(conn: &Connection, milestone: &Milestone) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE milestone SET title = ?1, date_event = ?2, description = ?3, is_completed = ?4
         WHERE id = ?5",
        params![
            milestone.title,
            milestone.date_event,
            milestone.description,
            milestone.is_completed,
            milestone.id,
        ],
    )?;
    Ok(changed > 0)
}

/// Flip the completed flag
pub fn toggle_milestone(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE milestone SET is_completed = NOT is_completed WHERE id = ?1",
        [id],
    )?;
    Ok(changed > 0)
}

pub fn delete_milestone(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM milestone WHERE id = ?1", [id])?;
    Ok(changed > 0)
}

// ============================================================================
// TASK
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    #[serde(default = "default_status", deserialize_with = "null_as_pending")]
    pub status: String,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_recurring: bool,
    #[serde(default)]
    pub asset_id: Option<i64>,
}

fn default_status() -> String {
    TASK_STATUSES[0].to_string()
}

fn null_as_pending<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_status))
}

impl Task {
    pub fn new(title: impl Into<String>, due_date: Option<NaiveDate>) -> Self {
        Task {
            id: 0,
            title: title.into(),
            status: default_status(),
            due_date,
            is_recurring: false,
            asset_id: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == "Done"
    }
}

const TASK_COLUMNS: &str = "id, title, status, due_date, is_recurring, asset_id";

fn task_from_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        status: row.get(2)?,
        due_date: row.get(3)?,
        is_recurring: row.get(4)?,
        asset_id: row.get(5)?,
    })
}

pub fn insert_task(conn: &Connection, task: &Task) -> Result<i64> {
    conn.execute(
        "INSERT INTO task (id, title, status, due_date, is_recurring, asset_id)
         VALUES (NULLIF(?1, 0), ?2, ?3, ?4, ?5, ?6)",
        params![
            task.id,
            task.title,
            task.status,
            task.due_date,
            task.is_recurring,
            task.asset_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_task(conn: &Connection, id: i64) -> Result<Option<Task>> {
    let task = conn
        .query_row(
            &format!("SELECT {} FROM task WHERE id = ?1", TASK_COLUMNS),
            [id],
            task_from_row,
        )
        .optional()?;
    Ok(task)
}

/// Tasks by due date (undated last)
pub fn list_tasks(conn: &Connection) -> Result<Vec<Task>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM task ORDER BY due_date IS NULL, due_date, id",
        TASK_COLUMNS
    ))?;
    let rows = stmt
        .query_map([], task_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_tasks_for_asset(conn: &Connection, asset_id: i64) -> Result<Vec<Task>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM task WHERE asset_id = ?1 ORDER BY due_date IS NULL, due_date, id",
        TASK_COLUMNS
    ))?;
    let rows = stmt
        .query_map([asset_id], task_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn update_task(conn: &Connection, task: &Task) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE task SET title = ?1, status = ?2, due_date = ?3, is_recurring = ?4, asset_id = ?5
         WHERE id = ?6",
        params![
            task.title,
            task.status,
            task.due_date,
            task.is_recurring,
            task.asset_id,
            task.id,
        ],
    )?;
    Ok(changed > 0)
}

/// Toggle between "Done" and "Pending"
pub fn toggle_task(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE task SET status = CASE WHEN status = 'Done' THEN 'Pending' ELSE 'Done' END
         WHERE id = ?1",
        [id],
    )?;
    Ok(changed > 0)
}

pub fn delete_task(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM task WHERE id = ?1", [id])?;
    Ok(changed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::entities::asset::{delete_asset, insert_asset, Asset, AssetType};

    #[test]
    fn test_milestone_lifecycle() {
        let conn = open_in_memory().unwrap();
        let date = NaiveDate::from_ymd_opt(2030, 6, 1);

        let id = insert_milestone(&conn, &Milestone::new("Retirement", date)).unwrap();
        assert!(toggle_milestone(&conn, id).unwrap());
        assert!(get_milestone(&conn, id).unwrap().unwrap().is_completed);

        let mut milestone = get_milestone(&conn, id).unwrap().unwrap();
        milestone.description = Some("Move to the lake house".to_string());
        milestone.date_event = None;
        update_milestone(&conn, &milestone).unwrap();
        assert_eq!(list_milestones(&conn).unwrap(), vec![milestone]);

        assert!(delete_milestone(&conn, id).unwrap());
        assert!(list_milestones(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_tasks_sorted_and_toggled() {
        let conn = open_in_memory().unwrap();
        insert_task(&conn, &Task::new("Undated", None)).unwrap();
        let later = insert_task(&conn, &Task::new("Later", NaiveDate::from_ymd_opt(2026, 1, 1))).unwrap();
        insert_task(&conn, &Task::new("Sooner", NaiveDate::from_ymd_opt(2025, 1, 1))).unwrap();

        let titles: Vec<String> = list_tasks(&conn).unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["Sooner", "Later", "Undated"]);

        toggle_task(&conn, later).unwrap();
        assert!(get_task(&conn, later).unwrap().unwrap().is_done());
        toggle_task(&conn, later).unwrap();
        assert_eq!(get_task(&conn, later).unwrap().unwrap().status, "Pending");
    }

    #[test]
    fn test_task_survives_asset_deletion() {
        let conn = open_in_memory().unwrap();
        let house = insert_asset(&conn, &Asset::new("House", AssetType::RealEstate, 1.0)).unwrap();

        let mut task = Task::new("Renew insurance", None);
        task.asset_id = Some(house);
        let id = insert_task(&conn, &task).unwrap();
        assert_eq!(list_tasks_for_asset(&conn, house).unwrap().len(), 1);

        delete_asset(&conn, house).unwrap();
        assert_eq!(get_task(&conn, id).unwrap().unwrap().asset_id, None);
    }

    #[test]
    fn test_legacy_milestone_row() {
        let milestone: Milestone = serde_json::from_str(
            r#"{"id": 1, "title": "Estate Plan Signed", "date_event": "2024-03-01T00:00:00",
                "description": null, "is_completed": null}"#,
        )
        .unwrap();
        assert_eq!(milestone.date_event, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert!(!milestone.is_completed);

        let task: Task = serde_json::from_str(r#"{"title": "Call lawyer", "status": null}"#).unwrap();
        assert_eq!(task.status, "Pending");
    }
}

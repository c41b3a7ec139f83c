// 🗓️ Milestones & tasks

use super::session::{redirect_with, Flash};
use super::{AppState, WebError, WebResult};
use crate::entities::planning::{
    delete_milestone as remove_milestone, delete_task as remove_task, get_milestone, get_task,
    insert_milestone, insert_task, toggle_milestone as flip_milestone, toggle_task as flip_task,
    update_milestone, update_task,
};
use crate::schema::{flash_summary, validate_milestone_form, validate_task_form, FormData, ValidationResult};
use axum::extract::{Form, Path, State};
use axum::response::Response;

const PLANNING: &str = "/planning";

fn finish<T>(validated: ValidationResult<T>, success: &str, save: impl FnOnce(T) -> WebResult<()>) -> WebResult<Response> {
    match validated {
        Ok(item) => {
            save(item)?;
            Ok(redirect_with(PLANNING, Flash::success(success)))
        }
        Err(errors) => Ok(redirect_with(PLANNING, Flash::error(flash_summary(&errors)))),
    }
}

fn done(success: &str) -> WebResult<Response> {
    Ok(redirect_with(PLANNING, Flash::success(success)))
}

// ============================================================================
// MILESTONES
// ============================================================================

/// POST /manage/milestone/new
pub async fn create_milestone(State(state): State<AppState>, Form(form): Form<FormData>) -> WebResult<Response> {
    let conn = state.conn()?;
    finish(validate_milestone_form(&form), "Milestone added.", |m| {
        insert_milestone(&conn, &m)?;
        Ok(())
    })
}

/// POST /manage/milestone/:id/edit
pub async fn edit_milestone(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<FormData>,
) -> WebResult<Response> {
    let conn = state.conn()?;
    get_milestone(&conn, id)?.ok_or_else(|| WebError::not_found(format!("Milestone {}", id)))?;
    finish(validate_milestone_form(&form), "Milestone updated.", |mut m| {
        m.id = id;
        update_milestone(&conn, &m)?;
        Ok(())
    })
}

/// POST /manage/milestone/:id/toggle
pub async fn toggle_milestone(State(state): State<AppState>, Path(id): Path<i64>) -> WebResult<Response> {
    if !flip_milestone(&*state.conn()?, id)? {
        return Err(WebError::not_found(format!("Milestone {}", id)));
    }
    done("Milestone updated.")
}

/// POST /manage/milestone/:id/delete
pub async fn delete_milestone(State(state): State<AppState>, Path(id): Path<i64>) -> WebResult<Response> {
    if !remove_milestone(&*state.conn()?, id)? {
        return Err(WebError::not_found(format!("Milestone {}", id)));
    }
    done("Milestone deleted.")
}

// ============================================================================
// TASKS
// ============================================================================

/// POST /manage/task/new
pub async fn create_task(State(state): State<AppState>, Form(form): Form<FormData>) -> WebResult<Response> {
    let conn = state.conn()?;
    finish(validate_task_form(&form), "Task added.", |t| {
        insert_task(&conn, &t)?;
        Ok(())
    })
}

/// POST /manage/task/:id/edit
pub async fn edit_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<FormData>,
) -> WebResult<Response> {
    let conn = state.conn()?;
    get_task(&conn, id)?.ok_or_else(|| WebError::not_found(format!("Task {}", id)))?;
    finish(validate_task_form(&form), "Task updated.", |mut t| {
        t.id = id;
        update_task(&conn, &t)?;
        Ok(())
    })
}

/// POST /manage/task/:id/toggle - Done ↔ Pending
pub async fn toggle_task(State(state): State<AppState>, Path(id): Path<i64>) -> WebResult<Response> {
    if !flip_task(&*state.conn()?, id)? {
        return Err(WebError::not_found(format!("Task {}", id)));
    }
    done("Task updated.")
}

/// POST /manage/task/:id/delete
pub async fn delete_task(State(state): State<AppState>, Path(id): Path<i64>) -> WebResult<Response> {
    if !remove_task(&*state.conn()?, id)? {
        return Err(WebError::not_found(format!("Task {}", id)));
    }
    done("Task deleted.")
}

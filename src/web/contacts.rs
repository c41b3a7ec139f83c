// 👥 Contact management (owners, beneficiaries, vendors)

use super::render::{self, e, Nav};
use super::session::{self, redirect_with, Flash, IncomingFlash};
use super::{AppState, WebError, WebResult};
use crate::entities::person::{delete_person, get_person, insert_person, update_person, KNOWN_ROLES};
use crate::schema::{prefill_person, validate_person_form, FormData, ValidationError};
use axum::extract::{Form, Path, State};
use axum::response::{Html, IntoResponse, Response};
use tracing::info;

fn person_form(action: &str, form: &FormData, errors: &[ValidationError]) -> String {
    let mut roles: Vec<(String, String)> = vec![(String::new(), "(none)".to_string())];
    roles.extend(KNOWN_ROLES.iter().map(|r| (r.to_string(), r.to_string())));

    format!(
        r#"<form method="post" action="{}" class="card">{}{}{}{}{}<button type="submit">Save</button></form>"#,
        action,
        render::input("name", "Name", "text", form, errors),
        render::select("role", "Role", &roles, form, errors),
        render::input("email", "Email", "email", form, errors),
        render::input("phone", "Phone", "tel", form, errors),
        render::input("notes", "Notes", "textarea", form, errors),
    )
}

fn form_page(heading: &str, action: &str, flash: Option<&Flash>, form: &FormData, errors: &[ValidationError]) -> String {
    let content = format!("<h1>{}</h1>{}", e(heading), person_form(action, form, errors));
    render::layout(heading, Nav::Details, flash, &content)
}

/// GET /manage/person/new
pub async fn new_form(flash: IncomingFlash) -> Response {
    session::page(
        &flash,
        form_page("New Contact", "/manage/person/new", flash.get(), &FormData::new(), &[]),
    )
}

/// POST /manage/person/new
pub async fn create(State(state): State<AppState>, Form(form): Form<FormData>) -> WebResult<Response> {
    let draft = match validate_person_form(&form) {
        Ok(draft) => draft,
        Err(errors) => {
            let flash = Flash::error("There were errors in your form submission. Please check below.");
            return Ok(Html(form_page("New Contact", "/manage/person/new", Some(&flash), &form, &errors)).into_response());
        }
    };

    let person = draft.into_person();
    let id = insert_person(&*state.conn()?, &person)?;
    info!(person_id = id, "contact created");
    Ok(redirect_with("/details", Flash::success(format!("Created {}", person.name))))
}

/// GET /manage/person/edit/:id
pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    flash: IncomingFlash,
) -> WebResult<Response> {
    let person = get_person(&*state.conn()?, id)?.ok_or_else(|| WebError::not_found(format!("Contact {}", id)))?;
    let action = format!("/manage/person/edit/{}", id);
    Ok(session::page(
        &flash,
        form_page("Edit Contact", &action, flash.get(), &prefill_person(&person), &[]),
    ))
}

/// POST /manage/person/edit/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<FormData>,
) -> WebResult<Response> {
    let conn = state.conn()?;
    let mut person = get_person(&conn, id)?.ok_or_else(|| WebError::not_found(format!("Contact {}", id)))?;

    match validate_person_form(&form) {
        Ok(draft) => {
            draft.apply_to(&mut person);
            update_person(&conn, &person)?;
            Ok(redirect_with("/details", Flash::success(format!("Updated {}", person.name))))
        }
        Err(errors) => {
            let flash = Flash::error("Update failed. Please correct the errors below.");
            let action = format!("/manage/person/edit/{}", id);
            Ok(Html(form_page("Edit Contact", &action, Some(&flash), &form, &errors)).into_response())
        }
    }
}

/// POST /manage/person/delete/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> WebResult<Response> {
    let conn = state.conn()?;
    let person = get_person(&conn, id)?.ok_or_else(|| WebError::not_found(format!("Contact {}", id)))?;
    delete_person(&conn, id)?;
    info!(person_id = id, "contact deleted");
    Ok(redirect_with("/details", Flash::success(format!("Deleted {}", person.name))))
}

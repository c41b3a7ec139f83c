// 🏷️ Asset & valuation management
// Type picker, dynamic per-type forms, delete, and the valuation history edits

use super::pages::person_options;
use super::render::{self, e, Nav};
use super::session::{self, redirect_with, Flash, IncomingFlash};
use super::{today, AppState, WebError, WebResult};
use crate::entities::appraisal::get_appraisal;
use crate::entities::asset::{delete_asset as remove_asset, get_asset, AssetType};
use crate::entities::person::{list_people, Person};
use crate::reconciliation::ValuationReport;
use crate::schema::{flash_summary, validate_appraisal_form, FormData, SchemaValidator, ValidationError};
use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, info};

const FORM_ERRORS: &str = "There were errors in your form submission. Please check below.";
const UPDATE_ERRORS: &str = "Update failed. Please correct the errors below.";

fn parse_type(code: &str) -> WebResult<AssetType> {
    AssetType::from_code(code).ok_or_else(|| WebError::not_found(format!("Asset type {}", code)))
}

/// Core fields plus every field the type's registry declares
fn asset_form(
    validator: &SchemaValidator,
    action: &str,
    form: &FormData,
    errors: &[ValidationError],
    people: &[Person],
) -> String {
    let registry = validator.registry();
    let fields: String = registry
        .attribute_fields()
        .iter()
        .map(|def| render::attribute_input(def, form, errors))
        .collect();

    format!(
        r#"<form method="post" action="{action}" class="card asset-form">
{name}{value}{owner}{trust}
<fieldset><legend>Details</legend>{fields}</fieldset>
<button type="submit">Save</button> <a href="javascript:history.back()">Cancel</a>
</form>"#,
        action = action,
        name = render::input("name", "Name", "text", form, errors),
        value = render::attribute_input(registry.value_field(), form, errors),
        owner = render::select("owner_id", "Owner", &person_options(people, Some("Trust / joint")), form, errors),
        trust = render::checkbox("is_in_trust", "Held in trust", form),
        fields = fields,
    )
}

fn form_page(title: &str, flash: Option<&Flash>, body: &str, status: StatusCode) -> Response {
    (status, axum::response::Html(render::layout(title, Nav::Assets, flash, body))).into_response()
}

// ============================================================================
// CREATE
// ============================================================================

/// GET /manage/asset/select-type
pub async fn select_type(flash: IncomingFlash) -> Response {
    let choices: String = AssetType::ALL
        .iter()
        .map(|t| {
            format!(
                r#"<a class="card type-choice" href="/manage/asset/new/{}"><span class="icon">{}</span> {}</a>"#,
                t.code(),
                t.icon(),
                e(t.label())
            )
        })
        .collect();
    let content = format!(r#"<h1>What are you adding?</h1><div class="type-grid">{}</div>"#, choices);
    session::page(&flash, render::layout("Add item", Nav::Assets, flash.get(), &content))
}

/// GET /manage/asset/new/:type_code
pub async fn new_form(
    State(state): State<AppState>,
    Path(type_code): Path<String>,
    flash: IncomingFlash,
) -> WebResult<Response> {
    let asset_type = parse_type(&type_code)?;
    let people = list_people(&*state.conn()?)?;

    let mut form = FormData::new();
    form.insert("is_in_trust".to_string(), "y".to_string());

    let validator = SchemaValidator::for_type(asset_type);
    let content = format!(
        "<h1>{} New {}</h1>{}",
        asset_type.icon(),
        e(asset_type.label()),
        asset_form(&validator, &format!("/manage/asset/new/{}", asset_type.code()), &form, &[], &people)
    );
    Ok(session::page(&flash, render::layout("New item", Nav::Assets, flash.get(), &content)))
}

/// POST /manage/asset/new/:type_code
pub async fn create(
    State(state): State<AppState>,
    Path(type_code): Path<String>,
    Form(form): Form<FormData>,
) -> WebResult<Response> {
    let asset_type = parse_type(&type_code)?;
    let validator = SchemaValidator::for_type(asset_type);

    let conn = state.conn()?;
    let draft = match validator.validate_asset(&form) {
        Ok(draft) => draft,
        Err(errors) => {
            let people = list_people(&conn)?;
            let content = format!(
                "<h1>{} New {}</h1>{}",
                asset_type.icon(),
                e(asset_type.label()),
                asset_form(&validator, &format!("/manage/asset/new/{}", asset_type.code()), &form, &errors, &people)
            );
            return Ok(form_page("New item", Some(&Flash::error(FORM_ERRORS)), &content, StatusCode::OK));
        }
    };

    let purchase = draft.purchase();
    let asset = draft.into_asset(asset_type);
    match state.engine.create_asset(&conn, &asset, purchase, today()) {
        Ok((id, _)) => Ok(redirect_with(&format!("/asset/{}", id), Flash::success(format!("Created {}", asset.name)))),
        Err(err) => {
            error!("asset create failed: {:#}", err);
            Ok(redirect_with(
                "/manage/asset/select-type",
                Flash::error(format!("Error creating asset: {}", err)),
            ))
        }
    }
}

// ============================================================================
// EDIT / DELETE
// ============================================================================

/// GET /manage/asset/edit/:id
pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    flash: IncomingFlash,
) -> WebResult<Response> {
    let (asset, people) = {
        let conn = state.conn()?;
        let asset = get_asset(&conn, id)?.ok_or_else(|| WebError::not_found(format!("Asset {}", id)))?;
        (asset, list_people(&conn)?)
    };

    let validator = SchemaValidator::for_type(asset.kind().unwrap_or(AssetType::Other));
    let form = validator.prefill(&asset);
    let content = format!(
        "<h1>Edit {}</h1>{}",
        e(&asset.name),
        asset_form(&validator, &format!("/manage/asset/edit/{}", id), &form, &[], &people)
    );
    Ok(session::page(&flash, render::layout("Edit item", Nav::Assets, flash.get(), &content)))
}

/// POST /manage/asset/edit/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<FormData>,
) -> WebResult<Response> {
    let conn = state.conn()?;
    let mut asset = get_asset(&conn, id)?.ok_or_else(|| WebError::not_found(format!("Asset {}", id)))?;
    let validator = SchemaValidator::for_type(asset.kind().unwrap_or(AssetType::Other));

    let draft = match validator.validate_asset(&form) {
        Ok(draft) => draft,
        Err(errors) => {
            let people = list_people(&conn)?;
            let content = format!(
                "<h1>Edit {}</h1>{}",
                e(&asset.name),
                asset_form(&validator, &format!("/manage/asset/edit/{}", id), &form, &errors, &people)
            );
            return Ok(form_page("Edit item", Some(&Flash::error(UPDATE_ERRORS)), &content, StatusCode::OK));
        }
    };

    draft.apply_to(&mut asset);
    match state.engine.edit_asset(&conn, &asset, today()) {
        Ok(_) => Ok(redirect_with(&format!("/asset/{}", id), Flash::success(format!("Updated {}", asset.name)))),
        Err(err) => {
            error!(asset_id = id, "asset update failed: {:#}", err);
            Ok(redirect_with(
                &format!("/manage/asset/edit/{}", id),
                Flash::error(format!("Error updating asset: {}", err)),
            ))
        }
    }
}

/// POST /manage/asset/delete/:id - cascades to history and sub-items
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> WebResult<Response> {
    let conn = state.conn()?;
    let asset = get_asset(&conn, id)?.ok_or_else(|| WebError::not_found(format!("Asset {}", id)))?;
    remove_asset(&conn, id)?;
    info!(asset_id = id, name = %asset.name, "asset deleted");

    let back = if asset.is_liability() { "/liabilities" } else { "/assets" };
    Ok(redirect_with(back, Flash::success(format!("Deleted {}", asset.name))))
}

// ============================================================================
// VALUATIONS
// ============================================================================

/// The engine rolled back on error; report it on the asset page
fn valuation_redirect(back: &str, outcome: anyhow::Result<ValuationReport>, success: &str) -> Response {
    match outcome {
        Ok(_) => redirect_with(back, Flash::success(success)),
        Err(err) => {
            error!("valuation change failed: {:#}", err);
            redirect_with(back, Flash::error(format!("Error saving valuation: {}", err)))
        }
    }
}

/// POST /manage/asset/:id/appraise
pub async fn add_appraisal(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<FormData>,
) -> WebResult<Response> {
    let back = format!("/asset/{}", id);
    let conn = state.conn()?;
    if get_asset(&conn, id)?.is_none() {
        return Err(WebError::not_found(format!("Asset {}", id)));
    }

    let appraisal = match validate_appraisal_form(id, &form) {
        Ok(appraisal) => appraisal,
        Err(errors) => return Ok(redirect_with(&back, Flash::error(flash_summary(&errors)))),
    };

    let outcome = state.engine.record(&conn, &appraisal);
    Ok(valuation_redirect(&back, outcome, "Valuation added and asset updated."))
}

/// POST /manage/appraisal/:id/edit
pub async fn edit_appraisal(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<FormData>,
) -> WebResult<Response> {
    let conn = state.conn()?;
    let existing = get_appraisal(&conn, id)?.ok_or_else(|| WebError::not_found(format!("Appraisal {}", id)))?;
    let back = format!("/asset/{}", existing.asset_id);

    let mut revised = match validate_appraisal_form(existing.asset_id, &form) {
        Ok(appraisal) => appraisal,
        Err(errors) => return Ok(redirect_with(&back, Flash::error(flash_summary(&errors)))),
    };
    revised.id = id;

    let outcome = state.engine.revise(&conn, &revised);
    Ok(valuation_redirect(&back, outcome, "Valuation updated successfully."))
}

/// POST /manage/appraisal/:id/delete
pub async fn delete_appraisal(State(state): State<AppState>, Path(id): Path<i64>) -> WebResult<Response> {
    let conn = state.conn()?;
    let existing = get_appraisal(&conn, id)?.ok_or_else(|| WebError::not_found(format!("Appraisal {}", id)))?;

    let outcome = state.engine.remove(&conn, id);
    Ok(valuation_redirect(&format!("/asset/{}", existing.asset_id), outcome, "Valuation deleted."))
}

#[cfg(test)]
mod tests {
    use crate::entities::appraisal::list_appraisals_for_asset;
    use crate::entities::asset::get_asset;
    use crate::web::test_support::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_create_vehicle_with_purchase() {
        let state = test_state();
        let cookie = login_cookie(&state);

        let response = send(
            &state,
            post_form(
                "/manage/asset/new/Vehicle",
                &cookie,
                "name=Old+Truck&current_value=30000&is_in_trust=y&owner_id=0&purchase_date=2020-05-15&purchase_price=45000",
            ),
        )
        .await;
        assert_eq!(location(&response), "/asset/1");
        assert_eq!(flash_of(&response).as_deref(), Some("Created Old Truck"));

        let conn = state.conn().unwrap();
        let truck = get_asset(&conn, 1).unwrap().unwrap();
        assert_eq!(truck.value_estimated, 30000.0);
        assert!(truck.is_in_trust);
        assert_eq!(list_appraisals_for_asset(&conn, 1).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_liability_value_is_negated() {
        let state = test_state();
        let cookie = login_cookie(&state);

        let response = send(
            &state,
            post_form("/manage/asset/new/Liability", &cookie, "name=Car+Loan&outstanding_balance=12000&lender=Credit+Union"),
        )
        .await;
        assert_eq!(location(&response), "/asset/1");

        let conn = state.conn().unwrap();
        assert_eq!(get_asset(&conn, 1).unwrap().unwrap().value_estimated, -12000.0);
    }

    #[tokio::test]
    async fn test_invalid_form_rerenders_with_errors() {
        let state = test_state();
        let cookie = login_cookie(&state);

        let response = send(
            &state,
            post_form("/manage/asset/new/Bank", &cookie, "name=X&current_value=lots"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("There were errors in your form submission"));
        assert!(body.contains("Not a valid number."));

        let unknown = send(&state, get("/manage/asset/new/Spaceship", &cookie)).await;
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_valuation_history_drives_value() {
        let state = test_state();
        let cookie = login_cookie(&state);
        send(
            &state,
            post_form("/manage/asset/new/Art", &cookie, "name=Landscape&current_value=1000"),
        )
        .await;

        let added = send(
            &state,
            post_form(
                "/manage/asset/1/appraise",
                &cookie,
                "date=2999-01-01&value=2500&source=Auction+House",
            ),
        )
        .await;
        assert_eq!(flash_of(&added).as_deref(), Some("Valuation added and asset updated."));
        let latest_id = {
            let conn = state.conn().unwrap();
            assert_eq!(get_asset(&conn, 1).unwrap().unwrap().value_estimated, 2500.0);
            list_appraisals_for_asset(&conn, 1)
                .unwrap()
                .into_iter()
                .find(|a| a.source == "Auction House")
                .unwrap()
                .id
        };

        let revised = send(
            &state,
            post_form(
                &format!("/manage/appraisal/{}/edit", latest_id),
                &cookie,
                "date=2999-01-01&value=3000&source=Auction+House",
            ),
        )
        .await;
        assert_eq!(location(&revised), "/asset/1");
        assert_eq!(get_asset(&state.conn().unwrap(), 1).unwrap().unwrap().value_estimated, 3000.0);

        let removed = send(
            &state,
            post_form(&format!("/manage/appraisal/{}/delete", latest_id), &cookie, ""),
        )
        .await;
        assert_eq!(flash_of(&removed).as_deref(), Some("Valuation deleted."));
        assert_eq!(get_asset(&state.conn().unwrap(), 1).unwrap().unwrap().value_estimated, 1000.0);

        let bad = send(&state, post_form("/manage/asset/1/appraise", &cookie, "value=5")).await;
        assert_eq!(location(&bad), "/asset/1");
        assert!(flash_of(&bad).unwrap().contains("date"));
    }

    #[tokio::test]
    async fn test_edit_and_delete_asset() {
        let state = test_state();
        let cookie = login_cookie(&state);
        send(
            &state,
            post_form("/manage/asset/new/Jewelry", &cookie, "name=Ring&current_value=800"),
        )
        .await;

        let form = send(&state, get("/manage/asset/edit/1", &cookie)).await;
        assert!(body_text(form).await.contains(r#"value="Ring""#));

        let updated = send(
            &state,
            post_form("/manage/asset/edit/1", &cookie, "name=Gold+Ring&current_value=950"),
        )
        .await;
        assert_eq!(flash_of(&updated).as_deref(), Some("Updated Gold Ring"));
        {
            let conn = state.conn().unwrap();
            let ring = get_asset(&conn, 1).unwrap().unwrap();
            assert_eq!(ring.value_estimated, 950.0);
            assert!(!ring.is_in_trust);
        }

        let deleted = send(&state, post_form("/manage/asset/delete/1", &cookie, "")).await;
        assert_eq!(location(&deleted), "/assets");
        assert!(get_asset(&state.conn().unwrap(), 1).unwrap().is_none());
    }
}

// 🧱 Asset sub-items: structures, location pins, recurring bills,
// service contacts and beneficiary designations.
// Every change lands back on the owning asset's page with a flash.

use super::session::{redirect_with, Flash};
use super::{AppState, WebError, WebResult};
use crate::entities::asset::{get_asset, remove_beneficiary, upsert_beneficiary};
use crate::entities::person::get_person;
use crate::entities::property::{
    delete_bill as remove_bill, delete_location as remove_location, delete_structure as remove_structure,
    delete_vendor as remove_vendor, get_bill, get_location, get_structure, get_vendor, insert_bill,
    insert_location, insert_structure, insert_vendor, update_bill, update_location, update_structure,
    update_vendor,
};
use crate::schema::{
    flash_summary, validate_beneficiary_form, validate_bill_form, validate_location_form,
    validate_structure_form, validate_vendor_form, FormData, ValidationResult,
};
use axum::extract::{Form, Path, State};
use axum::response::Response;
use rusqlite::Connection;

fn asset_page(asset_id: i64) -> String {
    format!("/asset/{}", asset_id)
}

fn require_asset(conn: &Connection, asset_id: i64) -> WebResult<()> {
    match get_asset(conn, asset_id)? {
        Some(_) => Ok(()),
        None => Err(WebError::not_found(format!("Asset {}", asset_id))),
    }
}

/// Validate, then run `save` on success; errors become a flash on the asset page
fn save_validated<T>(
    asset_id: i64,
    validated: ValidationResult<T>,
    success: &str,
    save: impl FnOnce(&T) -> WebResult<()>,
) -> WebResult<Response> {
    match validated {
        Ok(item) => {
            save(&item)?;
            Ok(redirect_with(&asset_page(asset_id), Flash::success(success)))
        }
        Err(errors) => Ok(redirect_with(&asset_page(asset_id), Flash::error(flash_summary(&errors)))),
    }
}

fn unknown_contact(asset_id: i64) -> Response {
    redirect_with(&asset_page(asset_id), Flash::error("person_id: Not a valid choice."))
}

// ============================================================================
// ADD
// ============================================================================

/// POST /manage/asset/:id/structures
pub async fn add_structure(
    State(state): State<AppState>,
    Path(asset_id): Path<i64>,
    Form(form): Form<FormData>,
) -> WebResult<Response> {
    let conn = state.conn()?;
    require_asset(&conn, asset_id)?;
    save_validated(asset_id, validate_structure_form(asset_id, &form), "Structure added.", |s| {
        insert_structure(&conn, s)?;
        Ok(())
    })
}

/// POST /manage/asset/:id/locations
pub async fn add_location(
    State(state): State<AppState>,
    Path(asset_id): Path<i64>,
    Form(form): Form<FormData>,
) -> WebResult<Response> {
    let conn = state.conn()?;
    require_asset(&conn, asset_id)?;
    save_validated(asset_id, validate_location_form(asset_id, &form), "Location pin added.", |p| {
        insert_location(&conn, p)?;
        Ok(())
    })
}

/// POST /manage/asset/:id/bills
pub async fn add_bill(
    State(state): State<AppState>,
    Path(asset_id): Path<i64>,
    Form(form): Form<FormData>,
) -> WebResult<Response> {
    let conn = state.conn()?;
    require_asset(&conn, asset_id)?;
    save_validated(asset_id, validate_bill_form(asset_id, &form), "Bill added.", |b| {
        insert_bill(&conn, b)?;
        Ok(())
    })
}

/// POST /manage/asset/:id/vendors
pub async fn add_vendor(
    State(state): State<AppState>,
    Path(asset_id): Path<i64>,
    Form(form): Form<FormData>,
) -> WebResult<Response> {
    let conn = state.conn()?;
    require_asset(&conn, asset_id)?;
    let validated = validate_vendor_form(asset_id, &form);
    if let Ok(vendor) = &validated {
        if get_person(&conn, vendor.person_id)?.is_none() {
            return Ok(unknown_contact(asset_id));
        }
    }
    save_validated(asset_id, validated, "Contact linked.", |v| {
        insert_vendor(&conn, v)?;
        Ok(())
    })
}

/// POST /manage/asset/:id/beneficiaries - re-adding a person updates the share
pub async fn add_beneficiary(
    State(state): State<AppState>,
    Path(asset_id): Path<i64>,
    Form(form): Form<FormData>,
) -> WebResult<Response> {
    let conn = state.conn()?;
    require_asset(&conn, asset_id)?;
    let validated = validate_beneficiary_form(asset_id, &form);
    if let Ok(beneficiary) = &validated {
        if get_person(&conn, beneficiary.person_id)?.is_none() {
            return Ok(unknown_contact(asset_id));
        }
    }
    save_validated(asset_id, validated, "Beneficiary saved.", |b| {
        upsert_beneficiary(&conn, b)?;
        Ok(())
    })
}

/// POST /manage/asset/:id/beneficiaries/:person_id/delete
pub async fn delete_beneficiary(
    State(state): State<AppState>,
    Path((asset_id, person_id)): Path<(i64, i64)>,
) -> WebResult<Response> {
    let conn = state.conn()?;
    if !remove_beneficiary(&conn, asset_id, person_id)? {
        return Err(WebError::not_found("Beneficiary"));
    }
    Ok(redirect_with(&asset_page(asset_id), Flash::success("Beneficiary removed.")))
}

// ============================================================================
// EDIT / DELETE
// ============================================================================

/// POST /manage/structure/:id/edit
pub async fn edit_structure(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<FormData>,
) -> WebResult<Response> {
    let conn = state.conn()?;
    let existing = get_structure(&conn, id)?.ok_or_else(|| WebError::not_found(format!("Structure {}", id)))?;
    let validated = validate_structure_form(existing.asset_id, &form).map(|mut s| {
        s.id = id;
        s
    });
    save_validated(existing.asset_id, validated, "Structure updated.", |s| {
        update_structure(&conn, s)?;
        Ok(())
    })
}

/// POST /manage/structure/:id/delete
pub async fn delete_structure(State(state): State<AppState>, Path(id): Path<i64>) -> WebResult<Response> {
    let conn = state.conn()?;
    let existing = get_structure(&conn, id)?.ok_or_else(|| WebError::not_found(format!("Structure {}", id)))?;
    remove_structure(&conn, id)?;
    Ok(redirect_with(&asset_page(existing.asset_id), Flash::success("Structure deleted.")))
}

/// POST /manage/location/:id/edit
pub async fn edit_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<FormData>,
) -> WebResult<Response> {
    let conn = state.conn()?;
    let existing = get_location(&conn, id)?.ok_or_else(|| WebError::not_found(format!("Location {}", id)))?;
    let validated = validate_location_form(existing.asset_id, &form).map(|mut p| {
        p.id = id;
        p
    });
    save_validated(existing.asset_id, validated, "Location pin updated.", |p| {
        update_location(&conn, p)?;
        Ok(())
    })
}

/// POST /manage/location/:id/delete
pub async fn delete_location(State(state): State<AppState>, Path(id): Path<i64>) -> WebResult<Response> {
    let conn = state.conn()?;
    let existing = get_location(&conn, id)?.ok_or_else(|| WebError::not_found(format!("Location {}", id)))?;
    remove_location(&conn, id)?;
    Ok(redirect_with(&asset_page(existing.asset_id), Flash::success("Location pin deleted.")))
}

/// POST /manage/bill/:id/edit
pub async fn edit_bill(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<FormData>,
) -> WebResult<Response> {
    let conn = state.conn()?;
    let existing = get_bill(&conn, id)?.ok_or_else(|| WebError::not_found(format!("Bill {}", id)))?;
    let validated = validate_bill_form(existing.asset_id, &form).map(|mut b| {
        b.id = id;
        b
    });
    save_validated(existing.asset_id, validated, "Bill updated.", |b| {
        update_bill(&conn, b)?;
        Ok(())
    })
}

/// POST /manage/bill/:id/delete
pub async fn delete_bill(State(state): State<AppState>, Path(id): Path<i64>) -> WebResult<Response> {
    let conn = state.conn()?;
    let existing = get_bill(&conn, id)?.ok_or_else(|| WebError::not_found(format!("Bill {}", id)))?;
    remove_bill(&conn, id)?;
    Ok(redirect_with(&asset_page(existing.asset_id), Flash::success("Bill deleted.")))
}

/// POST /manage/vendor/:id/edit
pub async fn edit_vendor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<FormData>,
) -> WebResult<Response> {
    let conn = state.conn()?;
    let existing = get_vendor(&conn, id)?.ok_or_else(|| WebError::not_found(format!("Vendor link {}", id)))?;
    let validated = validate_vendor_form(existing.asset_id, &form).map(|mut v| {
        v.id = id;
        v
    });
    if let Ok(vendor) = &validated {
        if get_person(&conn, vendor.person_id)?.is_none() {
            return Ok(unknown_contact(existing.asset_id));
        }
    }
    save_validated(existing.asset_id, validated, "Contact link updated.", |v| {
        update_vendor(&conn, v)?;
        Ok(())
    })
}

/// POST /manage/vendor/:id/delete
pub async fn delete_vendor(State(state): State<AppState>, Path(id): Path<i64>) -> WebResult<Response> {
    let conn = state.conn()?;
    let existing = get_vendor(&conn, id)?.ok_or_else(|| WebError::not_found(format!("Vendor link {}", id)))?;
    remove_vendor(&conn, id)?;
    Ok(redirect_with(&asset_page(existing.asset_id), Flash::success("Contact removed.")))
}

#[cfg(test)]
mod tests {
    use crate::entities::asset::{insert_asset, list_beneficiaries, Asset, AssetType};
    use crate::entities::person::{insert_person, Person};
    use crate::entities::property::{list_bills_for_asset, list_locations_for_asset, list_structures_for_asset};
    use crate::web::test_support::*;
    use axum::http::StatusCode;

    fn seed_farm(state: &crate::web::AppState) {
        let conn = state.conn().unwrap();
        insert_asset(&conn, &Asset::new("Farm", AssetType::RealEstate, 400000.0)).unwrap();
        insert_person(&conn, &Person::new("Junior", Some("Beneficiary"))).unwrap();
    }

    #[tokio::test]
    async fn test_structure_add_edit_delete() {
        let state = test_state();
        seed_farm(&state);
        let cookie = login_cookie(&state);

        let added = send(
            &state,
            post_form("/manage/asset/1/structures", &cookie, "name=Well&date_built=1990-06-01"),
        )
        .await;
        assert_eq!(location(&added), "/asset/1");
        assert_eq!(flash_of(&added).as_deref(), Some("Structure added."));

        let edited = send(
            &state,
            post_form("/manage/structure/1/edit", &cookie, "name=Deep+Well&date_last_maintained=2024-03-01"),
        )
        .await;
        assert_eq!(flash_of(&edited).as_deref(), Some("Structure updated."));
        {
            let conn = state.conn().unwrap();
            let structures = list_structures_for_asset(&conn, 1).unwrap();
            assert_eq!(structures[0].name, "Deep Well");
            assert_eq!(structures[0].date_built, None);
        }

        let deleted = send(&state, post_form("/manage/structure/1/delete", &cookie, "")).await;
        assert_eq!(location(&deleted), "/asset/1");
        assert!(list_structures_for_asset(&state.conn().unwrap(), 1).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_location_flashes_errors() {
        let state = test_state();
        seed_farm(&state);
        let cookie = login_cookie(&state);

        let response = send(
            &state,
            post_form("/manage/asset/1/locations", &cookie, "label=Gate&latitude=123&longitude=-97.1"),
        )
        .await;
        assert_eq!(location(&response), "/asset/1");
        assert!(flash_of(&response).unwrap().starts_with("latitude:"));
        assert!(list_locations_for_asset(&state.conn().unwrap(), 1).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bill_and_beneficiary() {
        let state = test_state();
        seed_farm(&state);
        let cookie = login_cookie(&state);

        send(
            &state,
            post_form(
                "/manage/asset/1/bills",
                &cookie,
                "name=Property+Tax&amount_estimated=3200&frequency=Annually&is_autopay=y",
            ),
        )
        .await;
        let bills = list_bills_for_asset(&state.conn().unwrap(), 1).unwrap();
        assert_eq!(bills.len(), 1);
        assert!(bills[0].is_autopay);

        send(&state, post_form("/manage/asset/1/beneficiaries", &cookie, "person_id=1&percentage=40")).await;
        send(&state, post_form("/manage/asset/1/beneficiaries", &cookie, "person_id=1&percentage=60")).await;
        let shares = list_beneficiaries(&state.conn().unwrap(), 1).unwrap();
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].percentage, 60.0);

        let stranger = send(&state, post_form("/manage/asset/1/beneficiaries", &cookie, "person_id=77")).await;
        assert!(flash_of(&stranger).unwrap().contains("person_id"));

        let removed = send(&state, post_form("/manage/asset/1/beneficiaries/1/delete", &cookie, "")).await;
        assert_eq!(flash_of(&removed).as_deref(), Some("Beneficiary removed."));

        let missing = send(&state, post_form("/manage/asset/9/bills", &cookie, "name=Water")).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}

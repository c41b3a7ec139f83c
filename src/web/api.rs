// 🔌 JSON API - read-only views over the same data as the pages

use super::pages::kinds_from_query;
use super::{today, AppState, WebResult};
use crate::chart::{net_worth_chart, single_asset_chart, ChartData};
use crate::entities::appraisal::list_appraisals_for_asset;
use crate::entities::asset::get_asset;
use crate::summary::NetWorthSummary;
use crate::timeline::{load_timeline, TimelineEvent};
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// GET /api/health - Health check (no login needed)
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/summary - totals and per-type breakdown
pub async fn summary(State(state): State<AppState>) -> WebResult<Json<ApiResponse<NetWorthSummary>>> {
    let summary = NetWorthSummary::load(&*state.conn()?)?;
    Ok(Json(ApiResponse::ok(summary)))
}

/// GET /api/chart - merged net-worth chart
pub async fn chart(State(state): State<AppState>) -> WebResult<Json<ApiResponse<ChartData>>> {
    let chart = net_worth_chart(&*state.conn()?)?;
    Ok(Json(ApiResponse::ok(chart)))
}

/// GET /api/assets/:id/series - one asset's valuation history
pub async fn asset_series(State(state): State<AppState>, Path(id): Path<i64>) -> WebResult<Response> {
    let conn = state.conn()?;
    let asset = match get_asset(&conn, id)? {
        Some(asset) => asset,
        None => {
            let body = Json(ApiResponse::<ChartData>::err(format!("Asset {} not found", id)));
            return Ok((StatusCode::NOT_FOUND, body).into_response());
        }
    };
    let appraisals = list_appraisals_for_asset(&conn, id)?;
    Ok(Json(ApiResponse::ok(single_asset_chart(&asset, &appraisals))).into_response())
}

/// GET /api/timeline?types=milestone,task
pub async fn timeline(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> WebResult<Json<ApiResponse<Vec<TimelineEvent>>>> {
    let kinds = kinds_from_query(query.as_deref());
    let events = load_timeline(&*state.conn()?, &kinds, today())?;
    Ok(Json(ApiResponse::ok(events)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::test_support::*;
    use serde_json::Value;

    async fn json(state: &AppState, uri: &str, cookie: &str) -> (StatusCode, Value) {
        let response = send(state, get(uri, cookie)).await;
        let status = response.status();
        let body = body_text(response).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    #[test]
    fn test_envelope_shape() {
        let ok = serde_json::to_value(ApiResponse::ok(1)).unwrap();
        assert_eq!(ok, serde_json::json!({"success": true, "data": 1}));

        let err = serde_json::to_value(ApiResponse::<i32>::err("nope")).unwrap();
        assert_eq!(err, serde_json::json!({"success": false, "data": null, "error": "nope"}));
    }

    #[tokio::test]
    async fn test_api_over_seeded_estate() {
        let state = test_state();
        {
            let conn = state.conn().unwrap();
            crate::seed::seed_example(&conn, today()).unwrap();
        }
        let cookie = login_cookie(&state);

        let (status, summary) = json(&state, "/api/summary", &cookie).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["data"]["net_worth"], 537300.0);
        assert_eq!(summary["data"]["liability_count"], 2);

        let (_, chart) = json(&state, "/api/chart", &cookie).await;
        let labels = chart["data"]["labels"].as_array().unwrap();
        assert!(!labels.is_empty());

        let (_, series) = json(&state, "/api/assets/1/series", &cookie).await;
        assert_eq!(series["success"], true);

        let (status, missing) = json(&state, "/api/assets/999/series", &cookie).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(missing["error"], "Asset 999 not found");

        let (_, timeline) = json(&state, "/api/timeline?types=history", &cookie).await;
        let events = timeline["data"].as_array().unwrap();
        assert!(!events.is_empty());
        assert!(events.iter().all(|e| e["kind"] == "history" || e["kind"] == "asset"));
        assert!(events.iter().any(|e| e["kind"] == "history"));

        let (_, purchases) = json(&state, "/api/timeline?types=asset", &cookie).await;
        let events = purchases["data"].as_array().unwrap();
        assert!(!events.is_empty());
        assert!(events.iter().all(|e| e["kind"] == "asset"));
    }
}

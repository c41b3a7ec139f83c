// 🌐 Web Layer - axum router, shared state and handlers
//
// One SQLite connection behind Arc<Mutex<_>>; handlers lock it for the
// synchronous part of the work only, never across an .await.

pub mod api;
pub mod assets;
pub mod contacts;
pub mod error;
pub mod login;
pub mod pages;
pub mod planning;
pub mod render;
pub mod session;
pub mod settings;
pub mod subitems;

use crate::auth::SessionStore;
use crate::config::AppConfig;
use crate::reconciliation::ValuationEngine;
use anyhow::anyhow;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use error::{WebError, WebResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub sessions: Arc<SessionStore>,
    pub config: Arc<AppConfig>,
    pub engine: Arc<ValuationEngine>,
}

impl AppState {
    pub fn new(conn: Connection, config: AppConfig) -> Self {
        AppState {
            db: Arc::new(Mutex::new(conn)),
            sessions: Arc::new(SessionStore::new()),
            config: Arc::new(config),
            engine: Arc::new(ValuationEngine::new()),
        }
    }

    /// Lock the database connection
    pub fn conn(&self) -> WebResult<MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|_| WebError::Internal(anyhow!("database lock poisoned")))
    }
}

/// Local calendar date used for new records and "is past" checks
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Full application router
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        // Pages
        .route("/", get(pages::dashboard))
        .route("/assets", get(pages::assets_view))
        .route("/liabilities", get(pages::liabilities_view))
        .route("/asset/:id", get(pages::asset_detail))
        .route("/planning", get(pages::planning_view))
        .route("/details", get(pages::details_view))
        .route("/faq", get(pages::faq_view))
        // Assets & valuations
        .route("/manage/asset/select-type", get(assets::select_type))
        .route("/manage/asset/new/:type_code", get(assets::new_form).post(assets::create))
        .route("/manage/asset/edit/:id", get(assets::edit_form).post(assets::update))
        .route("/manage/asset/delete/:id", post(assets::delete))
        .route("/manage/asset/:id/appraise", post(assets::add_appraisal))
        .route("/manage/appraisal/:id/edit", post(assets::edit_appraisal))
        .route("/manage/appraisal/:id/delete", post(assets::delete_appraisal))
        // Contacts
        .route("/manage/person/new", get(contacts::new_form).post(contacts::create))
        .route("/manage/person/edit/:id", get(contacts::edit_form).post(contacts::update))
        .route("/manage/person/delete/:id", post(contacts::delete))
        // Asset sub-items
        .route("/manage/asset/:id/structures", post(subitems::add_structure))
        .route("/manage/asset/:id/locations", post(subitems::add_location))
        .route("/manage/asset/:id/bills", post(subitems::add_bill))
        .route("/manage/asset/:id/vendors", post(subitems::add_vendor))
        .route("/manage/asset/:id/beneficiaries", post(subitems::add_beneficiary))
        .route(
            "/manage/asset/:id/beneficiaries/:person_id/delete",
            post(subitems::delete_beneficiary),
        )
        .route("/manage/structure/:id/edit", post(subitems::edit_structure))
        .route("/manage/structure/:id/delete", post(subitems::delete_structure))
        .route("/manage/location/:id/edit", post(subitems::edit_location))
        .route("/manage/location/:id/delete", post(subitems::delete_location))
        .route("/manage/bill/:id/edit", post(subitems::edit_bill))
        .route("/manage/bill/:id/delete", post(subitems::delete_bill))
        .route("/manage/vendor/:id/edit", post(subitems::edit_vendor))
        .route("/manage/vendor/:id/delete", post(subitems::delete_vendor))
        // Planning
        .route("/manage/milestone/new", post(planning::create_milestone))
        .route("/manage/milestone/:id/edit", post(planning::edit_milestone))
        .route("/manage/milestone/:id/toggle", post(planning::toggle_milestone))
        .route("/manage/milestone/:id/delete", post(planning::delete_milestone))
        .route("/manage/task/new", post(planning::create_task))
        .route("/manage/task/:id/edit", post(planning::edit_task))
        .route("/manage/task/:id/toggle", post(planning::toggle_task))
        .route("/manage/task/:id/delete", post(planning::delete_task))
        // Settings (backup / restore)
        .route("/settings", get(settings::index))
        .route("/settings/download", get(settings::download))
        .route(
            "/settings/upload",
            post(settings::upload).layer(DefaultBodyLimit::max(settings::MAX_UPLOAD_BYTES)),
        )
        // JSON API
        .route("/api/summary", get(api::summary))
        .route("/api/chart", get(api::chart))
        .route("/api/assets/:id/series", get(api::asset_series))
        .route("/api/timeline", get(api::timeline))
        .route_layer(middleware::from_fn_with_state(state.clone(), session::require_login));

    Router::new()
        .route("/login", get(login::login_form).post(login::login))
        .route("/logout", get(login::logout))
        .route("/api/health", get(api::health))
        .merge(protected)
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::AppConfig;
    use crate::db::open_in_memory;
    use axum::body::Body;
    use axum::http::{header, Request, Response, StatusCode};
    use std::path::PathBuf;
    use tower::ServiceExt;

    pub const PASSWORD: &str = "correct horse";

    pub fn test_state() -> AppState {
        let config = AppConfig {
            admin_password: PASSWORD.to_string(),
            database_path: PathBuf::from(":memory:"),
            bind_addr: "127.0.0.1:0".to_string(),
            static_dir: PathBuf::from("static"),
        };
        AppState::new(open_in_memory().unwrap(), config)
    }

    /// Session cookie for a logged-in client
    pub fn login_cookie(state: &AppState) -> String {
        format!("estate_session={}", state.sessions.create())
    }

    pub async fn send(state: &AppState, request: Request<Body>) -> Response<Body> {
        router(state.clone()).oneshot(request).await.unwrap()
    }

    pub fn get(uri: &str, cookie: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    pub fn post_form(uri: &str, cookie: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub async fn body_text(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn location(response: &Response<Body>) -> &str {
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        response.headers().get(header::LOCATION).unwrap().to_str().unwrap()
    }

    /// Flash message set by a redirect, decoded
    pub fn flash_of(response: &Response<Body>) -> Option<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|c| c.strip_prefix("estate_flash="))
            .and_then(|rest| rest.split(';').next())
            .and_then(session::Flash::decode)
            .map(|f| f.message)
    }
}

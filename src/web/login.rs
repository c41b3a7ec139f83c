// 🔑 Login / logout

use super::render;
use super::session::{self, is_logged_in, redirect_with, Flash, IncomingFlash};
use super::AppState;
use crate::auth::{verify_password, SESSION_COOKIE};
use crate::schema::FormData;
use axum::extract::{Form, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::{info, warn};

/// GET /login
pub async fn login_form(State(state): State<AppState>, headers: HeaderMap, flash: IncomingFlash) -> Response {
    if is_logged_in(&state, &headers) {
        return Redirect::to("/").into_response();
    }
    session::page(&flash, render::login_page(flash.get()))
}

/// POST /login
pub async fn login(State(state): State<AppState>, Form(form): Form<FormData>) -> Response {
    let candidate = form.get("password").map(String::as_str).unwrap_or("");

    if verify_password(candidate, &state.config.admin_password) {
        let token = state.sessions.create();
        info!("admin logged in");
        session::login_response(&token)
    } else {
        warn!("failed login attempt");
        redirect_with("/login", Flash::error("Invalid Password"))
    }
}

/// GET /logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session::read_cookie(&headers, SESSION_COOKIE) {
        state.sessions.revoke(&token);
    }
    session::logout_response()
}

#[cfg(test)]
mod tests {
    use crate::web::test_support::*;
    use axum::http::{header, StatusCode};

    #[tokio::test]
    async fn test_login_flow() {
        let state = test_state();

        let page = send(&state, get("/login", "")).await;
        assert_eq!(page.status(), StatusCode::OK);
        assert!(body_text(page).await.contains(r#"name="password""#));

        let bad = send(&state, post_form("/login", "", "password=wrong")).await;
        assert_eq!(location(&bad), "/login");
        assert_eq!(flash_of(&bad).as_deref(), Some("Invalid Password"));
        assert!(state.sessions.is_empty());

        let good = send(&state, post_form("/login", "", "password=correct+horse")).await;
        assert_eq!(location(&good), "/");
        let cookie = good
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("estate_session="));

        let dashboard = send(&state, get("/", &cookie)).await;
        assert_eq!(dashboard.status(), StatusCode::OK);

        let out = send(&state, get("/logout", &cookie)).await;
        assert_eq!(location(&out), "/login");
        let after = send(&state, get("/", &cookie)).await;
        assert_eq!(location(&after), "/login");
        println!("✅ Login, session and logout work end to end");
    }
}

// 🍪 Session gate & flash messages
//
// Both live in plain cookies: the session cookie holds a token from the
// in-memory SessionStore, the flash cookie holds "level|message" (url-encoded)
// and is cleared by the next page that shows it.

use super::AppState;
use crate::auth::SESSION_COOKIE;
use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::{header, request::Parts, HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Redirect, Response};
use std::convert::Infallible;
use tracing::debug;

pub const FLASH_COOKIE: &str = "estate_flash";

// ============================================================================
// COOKIES
// ============================================================================

/// Value of cookie `name` from the request headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
        .next()
}

pub fn session_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
}

pub fn expired_cookie(name: &str) -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", name)
}

fn append_cookie(response: &mut Response, cookie: &str) {
    if let Ok(value) = HeaderValue::from_str(cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
}

// ============================================================================
// FLASH
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Error,
    Info,
}

impl FlashLevel {
    pub fn code(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
            FlashLevel::Info => "info",
        }
    }

    pub fn from_code(code: &str) -> Option<FlashLevel> {
        match code {
            "success" => Some(FlashLevel::Success),
            "error" => Some(FlashLevel::Error),
            "info" => Some(FlashLevel::Info),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Flash {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Flash {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Flash {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    pub fn encode(&self) -> String {
        urlencoding::encode(&format!("{}|{}", self.level.code(), self.message)).into_owned()
    }

    pub fn decode(raw: &str) -> Option<Flash> {
        let decoded = urlencoding::decode(raw).ok()?;
        let (level, message) = decoded.split_once('|')?;
        Some(Flash {
            level: FlashLevel::from_code(level)?,
            message: message.to_string(),
        })
    }
}

/// Flash message waiting in the request, if any
#[derive(Debug, Clone, Default)]
pub struct IncomingFlash(pub Option<Flash>);

#[async_trait]
impl<S> FromRequestParts<S> for IncomingFlash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(IncomingFlash(
            read_cookie(&parts.headers, FLASH_COOKIE).and_then(|raw| Flash::decode(&raw)),
        ))
    }
}

impl IncomingFlash {
    pub fn get(&self) -> Option<&Flash> {
        self.0.as_ref()
    }
}

/// 303 to `to`, carrying a flash for the next page
pub fn redirect_with(to: &str, flash: Flash) -> Response {
    let mut response = Redirect::to(to).into_response();
    append_cookie(&mut response, &format!("{}={}; Path=/; HttpOnly; SameSite=Lax", FLASH_COOKIE, flash.encode()));
    response
}

/// Rendered page; clears the flash it displayed
pub fn page(flash: &IncomingFlash, html: String) -> Response {
    let mut response = Html(html).into_response();
    if flash.0.is_some() {
        append_cookie(&mut response, &expired_cookie(FLASH_COOKIE));
    }
    response
}

// ============================================================================
// LOGIN GATE
// ============================================================================

pub fn is_logged_in(state: &AppState, headers: &HeaderMap) -> bool {
    read_cookie(headers, SESSION_COOKIE)
        .map(|token| state.sessions.is_valid(&token))
        .unwrap_or(false)
}

/// Middleware: anything behind it needs a live session
pub async fn require_login(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if is_logged_in(&state, request.headers()) {
        next.run(request).await
    } else {
        debug!(path = %request.uri().path(), "no session, redirecting to login");
        Redirect::to("/login").into_response()
    }
}

/// Successful login: set the session cookie and go to the dashboard
pub fn login_response(token: &str) -> Response {
    let mut response = Redirect::to("/").into_response();
    append_cookie(&mut response, &session_cookie(token));
    response
}

pub fn logout_response() -> Response {
    let mut response = Redirect::to("/login").into_response();
    append_cookie(&mut response, &expired_cookie(SESSION_COOKIE));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("a=1; estate_session=abc-123; b=2"));
        assert_eq!(read_cookie(&headers, "estate_session").as_deref(), Some("abc-123"));
        assert_eq!(read_cookie(&headers, "b").as_deref(), Some("2"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_flash_cookie_roundtrip() {
        let flash = Flash::error("Restore failed: bad | data; oops");
        let encoded = flash.encode();
        assert!(!encoded.contains(';'));
        assert_eq!(Flash::decode(&encoded), Some(flash));
        assert_eq!(Flash::decode("garbage"), None);
        assert_eq!(Flash::decode("unknown%7Cmsg"), None);
    }

    #[test]
    fn test_redirect_with_sets_flash() {
        let response = redirect_with("/assets", Flash::success("Created House"));
        assert_eq!(response.status(), axum::http::StatusCode::SEE_OTHER);
        let cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("estate_flash=success%7CCreated%20House"));
    }
}

// 🚨 Web errors → HTTP responses

use super::render;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum WebError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type WebResult<T> = Result<T, WebError>;

impl WebError {
    pub fn not_found(what: impl Into<String>) -> Self {
        WebError::NotFound(what.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<rusqlite::Error> for WebError {
    fn from(e: rusqlite::Error) -> Self {
        WebError::Internal(e.into())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            WebError::Internal(e) => {
                error!(error = %format!("{:#}", e), "request failed");
                "Something went wrong. Please try again.".to_string()
            }
            other => other.to_string(),
        };

        (status, Html(render::error_page(status, &message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(WebError::not_found("Asset 3").status(), StatusCode::NOT_FOUND);
        assert_eq!(WebError::BadRequest("bad".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            WebError::from(anyhow::anyhow!("disk full")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(WebError::not_found("Asset 3").to_string(), "Asset 3 not found");
    }

    #[test]
    fn test_internal_details_hidden() {
        let response = WebError::from(anyhow::anyhow!("secret path /var/db")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

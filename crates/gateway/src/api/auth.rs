//! Admin authentication endpoints and session middleware.
//!
//! Login verifies the configured credentials and mints an opaque session
//! token (24h TTL). Protected routes carry `Authorization: Bearer <token>`
//! and are gated by [`require_session`]; validation is lazy, so an expired
//! token is evicted on first use after expiry.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;

use pb_domain::Error;

use crate::state::AppState;

/// JSON error body shared by all API endpoints.
pub fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// Map a domain error to its HTTP status and JSON error body.
pub fn error_response(err: Error) -> Response {
    let status = match &err {
        Error::InvalidCredentials | Error::Unauthorized => StatusCode::UNAUTHORIZED,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, err.to_string())
}

/// Extract the bearer token from the `Authorization` header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

/// Axum middleware that enforces a valid admin session on protected
/// routes. Attach via `axum::middleware::from_fn_with_state`.
pub async fn require_session(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let token = bearer_token(req.headers()).unwrap_or("");

    if !state.sessions.validate(token) {
        return error_response(Error::Unauthorized);
    }

    next.run(req).await
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/auth/login
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Response {
    if body.username.is_empty() || body.password.is_empty() {
        return error_response(Error::Validation(
            "username and password are required".into(),
        ));
    }

    match state.sessions.login(&body.username, &body.password) {
        Ok(token) => {
            tracing::info!(username = %body.username, "admin login");
            Json(json!({
                "success": true,
                "token": token,
                "message": "Login successful",
            }))
            .into_response()
        }
        Err(e) => {
            tracing::warn!(username = %body.username, "failed admin login");
            error_response(e)
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /api/auth/status
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn status(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let authenticated = bearer_token(&headers)
        .map(|t| state.sessions.validate(t))
        .unwrap_or(false);

    Json(json!({ "authenticated": authenticated })).into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/auth/logout
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Idempotent: logging out an unknown or already-removed token still
/// reports success.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.logout(token);
    }

    Json(json!({ "success": true })).into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/auth/change-password
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct ChangePasswordBody {
    #[serde(rename = "newPassword", default)]
    pub new_password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    Json(body): Json<ChangePasswordBody>,
) -> Response {
    if body.new_password.len() < 6 {
        return error_response(Error::Validation(
            "password must be at least 6 characters".into(),
        ));
    }

    state.sessions.change_password(&body.new_password);
    tracing::info!("admin password changed");

    Json(json!({ "success": true })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert("authorization", "Bearer abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert("authorization", "Basic abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert("authorization", "Bearer ".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn error_statuses_follow_the_taxonomy() {
        assert_eq!(
            error_response(Error::Unauthorized).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            error_response(Error::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            error_response(Error::NotFound("faq".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_response(Error::Validation("missing field".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_response(Error::Http("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

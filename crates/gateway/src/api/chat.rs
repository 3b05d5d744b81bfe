//! Web chat simulator endpoint.
//!
//! JSON mirror of the webhook for the dashboard's chat panel. The
//! simulator has no stable sender handle, so subscription requests fall
//! through to the later pipeline steps.

use axum::extract::State;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;

use pb_domain::Error;

use crate::api::auth::error_response;
use crate::resolver;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    #[serde(default)]
    pub message: String,
}

pub async fn chat(State(state): State<AppState>, Json(body): Json<ChatBody>) -> Response {
    let message = body.message.trim();
    if message.is_empty() {
        return error_response(Error::Validation("message is required".into()));
    }

    let outcome = resolver::resolve(&state, message, None).await;

    Json(json!({
        "response": outcome.text,
        "stamp": outcome.stamp,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
    .into_response()
}

//! Inbound channel webhook.
//!
//! Accepts the payload a messaging gateway posts for each inbound
//! message (`Body` + `From`, form-encoded or JSON) and replies with a
//! TwiML-style XML envelope. Official answers get a visible stamp line
//! appended so the recipient can verify the reply later.

use axum::extract::{FromRequest, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::Deserialize;

use pb_domain::Error;

use crate::api::auth::error_response;
use crate::resolver;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(rename = "Body", default)]
    pub body: String,
    #[serde(rename = "From", default)]
    pub from: String,
}

/// Connectors differ in how they deliver the payload, so both content
/// types are accepted.
async fn extract_payload(req: Request) -> Result<WebhookPayload, Response> {
    let is_json = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.contains("json"))
        .unwrap_or(false);

    let parsed = if is_json {
        Json::<WebhookPayload>::from_request(req, &())
            .await
            .map(|Json(p)| p)
            .map_err(|e| e.to_string())
    } else {
        Form::<WebhookPayload>::from_request(req, &())
            .await
            .map(|Form(p)| p)
            .map_err(|e| e.to_string())
    };

    parsed.map_err(|e| error_response(Error::Validation(format!("webhook payload: {e}"))))
}

pub async fn webhook(State(state): State<AppState>, req: Request) -> Response {
    let payload = match extract_payload(req).await {
        Ok(p) => p,
        Err(rejection) => return rejection,
    };
    let message = payload.body.trim();
    let sender = payload.from.trim();

    tracing::debug!(from = %sender, "webhook message received");

    let outcome = resolver::resolve(
        &state,
        message,
        (!sender.is_empty()).then_some(sender),
    )
    .await;

    let mut reply = outcome.text;
    if let Some(stamp) = &outcome.stamp {
        reply.push_str(&format!("\n\n[Official Stamp: {stamp}]"));
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/xml")],
        twiml_response(&reply),
    )
        .into_response()
}

/// Wrap a reply in the minimal TwiML envelope the channel expects.
fn twiml_response(message: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Response><Message>{}</Message></Response>",
        escape_xml(message)
    )
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

//! Admin configuration, analytics, and broadcast endpoints.
//!
//! Config and flag updates are typed patches with unknown fields
//! rejected, so a typo'd key fails loudly instead of silently doing
//! nothing.

use axum::extract::State;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;

use pb_domain::model::{BotConfigPatch, FlagsPatch};
use pb_domain::Error;

use crate::api::auth::error_response;
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET + POST /api/admin/config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn get_config(State(state): State<AppState>) -> Response {
    let settings = state.store.settings();
    Json(json!({
        "greeting": settings.greeting,
        "fallback": settings.fallback,
    }))
    .into_response()
}

pub async fn patch_config(
    State(state): State<AppState>,
    Json(patch): Json<BotConfigPatch>,
) -> Response {
    let settings = state.store.apply_bot_config(patch);
    tracing::info!("bot config updated");

    Json(json!({
        "success": true,
        "greeting": settings.greeting,
        "fallback": settings.fallback,
    }))
    .into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET + POST /api/admin/flags
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn get_flags(State(state): State<AppState>) -> Response {
    let settings = state.store.settings();
    Json(json!({
        "maintenanceMode": settings.maintenance_mode,
        "debugMode": settings.debug_mode,
    }))
    .into_response()
}

pub async fn patch_flags(
    State(state): State<AppState>,
    Json(patch): Json<FlagsPatch>,
) -> Response {
    let settings = state.store.apply_flags(patch);
    tracing::info!(
        maintenance = settings.maintenance_mode,
        debug = settings.debug_mode,
        "feature flags updated"
    );

    Json(json!({
        "success": true,
        "maintenanceMode": settings.maintenance_mode,
        "debugMode": settings.debug_mode,
    }))
    .into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /api/admin/analytics + POST /api/admin/reset-analytics
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn get_analytics(State(state): State<AppState>) -> Response {
    let counters = state.analytics.snapshot();
    Json(json!({
        "totalMessages": counters.total_messages,
        "activeUsers": counters.active_users,
        "verifiedStamps": counters.verified_stamps,
        "subscriberCount": state.store.subscriber_count(),
    }))
    .into_response()
}

pub async fn reset_analytics(State(state): State<AppState>) -> Response {
    state.analytics.reset();
    tracing::info!("analytics counters reset");

    Json(json!({ "success": true })).into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/admin/broadcast
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct BroadcastBody {
    #[serde(default)]
    pub message: String,
}

/// Record a broadcast against the subscriber roster. Actual channel
/// delivery happens out-of-band; this reports the audience size.
pub async fn broadcast(
    State(state): State<AppState>,
    Json(body): Json<BroadcastBody>,
) -> Response {
    if body.message.trim().is_empty() {
        return error_response(Error::Validation("message is required".into()));
    }

    let recipients = state.store.subscriber_count();
    tracing::info!(recipients, "broadcast queued");

    Json(json!({
        "success": true,
        "recipientCount": recipients,
    }))
    .into_response()
}

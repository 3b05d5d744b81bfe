//! Admin news management.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;

use chrono::{DateTime, Utc};
use pb_domain::model::NewsItem;
use pb_domain::Error;

use crate::api::auth::error_response;
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /api/admin/news
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn list_news(State(state): State<AppState>) -> Response {
    Json(state.store.list_news()).into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/admin/news
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct NewsUpsert {
    /// Omitted for new items; present to replace an existing one.
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
    pub date: Option<DateTime<Utc>>,
}

pub async fn upsert_news(
    State(state): State<AppState>,
    Json(body): Json<NewsUpsert>,
) -> Response {
    if body.title.trim().is_empty() || body.content.trim().is_empty() {
        return error_response(Error::Validation("title and content are required".into()));
    }

    let item = NewsItem {
        id: body.id.unwrap_or_else(|| Utc::now().timestamp_millis()),
        title: body.title,
        content: body.content,
        date: body.date.unwrap_or_else(Utc::now),
    };
    let id = item.id;
    state.store.upsert_news(item);

    Json(json!({ "success": true, "id": id })).into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DELETE /api/admin/news/:id
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn delete_news(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    if state.store.delete_news(id) {
        Json(json!({ "success": true })).into_response()
    } else {
        error_response(Error::NotFound(format!("news item {id}")))
    }
}

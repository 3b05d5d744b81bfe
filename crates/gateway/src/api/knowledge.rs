//! Knowledge-base (FAQ) endpoints.
//!
//! Entry IDs are epoch-millisecond floats assigned at creation, matching
//! the dashboard's existing data files. Bulk imports add a random
//! fraction so entries created in the same millisecond stay distinct.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Json, Response};
use rand::Rng;
use serde::Deserialize;
use serde_json::json;

use pb_domain::model::{KnowledgeEntry, Resource};
use pb_domain::Error;

use crate::api::auth::error_response;
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /api/faqs
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn list_faqs(State(state): State<AppState>) -> Response {
    Json(state.store.list_knowledge()).into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/faqs
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct FaqUpsert {
    /// Omitted for new entries; present to replace an existing one.
    pub id: Option<f64>,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

pub async fn upsert_faq(
    State(state): State<AppState>,
    Json(body): Json<FaqUpsert>,
) -> Response {
    if body.question.trim().is_empty() || body.answer.trim().is_empty() {
        return error_response(Error::Validation(
            "question and answer are required".into(),
        ));
    }

    let entry = KnowledgeEntry {
        id: body.id.unwrap_or_else(fresh_id),
        question: body.question,
        answer: body.answer,
        keywords: body.keywords,
        resources: body.resources,
    };
    let id = entry.id;
    state.store.upsert_knowledge(entry);

    Json(json!({ "success": true, "id": id })).into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/faqs/bulk
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn bulk_add_faqs(
    State(state): State<AppState>,
    Json(body): Json<Vec<FaqUpsert>>,
) -> Response {
    let entries: Vec<KnowledgeEntry> = body
        .into_iter()
        .filter(|e| !e.question.trim().is_empty() && !e.answer.trim().is_empty())
        .map(|e| KnowledgeEntry {
            id: e.id.unwrap_or_else(fresh_id),
            question: e.question,
            answer: e.answer,
            keywords: e.keywords,
            resources: e.resources,
        })
        .collect();

    let added = state.store.bulk_add_knowledge(entries);
    tracing::info!(added, "bulk FAQ import");

    Json(json!({ "success": true, "added": added })).into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DELETE /api/faqs/:id
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn delete_faq(State(state): State<AppState>, Path(id): Path<f64>) -> Response {
    if state.store.delete_knowledge(id) {
        Json(json!({ "success": true })).into_response()
    } else {
        error_response(Error::NotFound(format!("FAQ {id}")))
    }
}

/// Epoch milliseconds plus a sub-millisecond random fraction.
fn fresh_id() -> f64 {
    let millis = chrono::Utc::now().timestamp_millis() as f64;
    millis + rand::thread_rng().gen_range(0.0..1.0)
}

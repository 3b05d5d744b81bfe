//! CMS page endpoints.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;

use pb_domain::model::Page;
use pb_domain::Error;

use crate::api::auth::error_response;
use crate::state::AppState;

pub async fn get_page(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match state.store.get_page(&slug) {
        Some(page) => Json(page).into_response(),
        None => error_response(Error::NotFound(format!("page {slug}"))),
    }
}

#[derive(Debug, Deserialize)]
pub struct PageUpsert {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

pub async fn upsert_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<PageUpsert>,
) -> Response {
    if body.title.trim().is_empty() {
        return error_response(Error::Validation("title is required".into()));
    }

    state.store.set_page(
        &slug,
        Page {
            title: body.title,
            content: body.content,
        },
    );
    tracing::info!(slug = %slug, "page upserted");

    Json(json!({ "success": true, "slug": slug })).into_response()
}

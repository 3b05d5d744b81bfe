pub mod admin;
pub mod auth;
pub mod chat;
pub mod events;
pub mod knowledge;
pub mod news;
pub mod pages;
pub mod verify;
pub mod webhook;

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::AppState;

/// Build the full API router.
///
/// Routes are split into **public** (no auth required) and **protected**
/// (gated behind the admin-session bearer-token middleware).
///
/// `state` is needed to wire up the auth middleware at build time.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        // Channel webhook (TwiML-style XML reply)
        .route("/webhook", post(webhook::webhook))
        // Web chat simulator
        .route("/api/chat", post(chat::chat))
        // Admin auth
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/status", get(auth::status))
        .route("/api/auth/logout", post(auth::logout))
        // Stamp verification
        .route("/api/verify", post(verify::verify))
        // Knowledge base (read)
        .route("/api/faqs", get(knowledge::list_faqs))
        // CMS pages (read)
        .route("/api/pages/:slug", get(pages::get_page))
        // Realtime dashboard feed
        .route("/api/events", get(events::events_sse));

    let protected = Router::new()
        // Admin auth
        .route("/api/auth/change-password", post(auth::change_password))
        // Knowledge base (write)
        .route("/api/faqs", post(knowledge::upsert_faq))
        .route("/api/faqs/bulk", post(knowledge::bulk_add_faqs))
        .route("/api/faqs/:id", delete(knowledge::delete_faq))
        // News
        .route("/api/admin/news", get(news::list_news))
        .route("/api/admin/news", post(news::upsert_news))
        .route("/api/admin/news/:id", delete(news::delete_news))
        // Bot configuration
        .route("/api/admin/config", get(admin::get_config))
        .route("/api/admin/config", post(admin::patch_config))
        .route("/api/admin/flags", get(admin::get_flags))
        .route("/api/admin/flags", post(admin::patch_flags))
        // Analytics
        .route("/api/admin/analytics", get(admin::get_analytics))
        .route("/api/admin/reset-analytics", post(admin::reset_analytics))
        // Broadcast
        .route("/api/admin/broadcast", post(admin::broadcast))
        // CMS pages (write)
        .route("/api/pages/:slug", post(pages::upsert_page))
        // Apply session auth middleware to all protected routes.
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::require_session,
        ));

    public.merge(protected)
}

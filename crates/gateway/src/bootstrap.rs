//! AppState construction and background-task spawning extracted from `main.rs`.

use std::sync::Arc;

use pb_auth::{AdminCredentials, SessionRegistry};
use pb_domain::config::{Config, ConfigSeverity};
use pb_providers::{AnswerProvider, OpenAiCompatProvider};

use crate::analytics::Analytics;
use crate::state::AppState;
use crate::store::DataStore;

/// Validate config, initialize every subsystem and return a fully-wired
/// [`AppState`].
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let error_count = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if error_count > 0 {
        return Err(pb_domain::Error::Config(format!(
            "validation failed with {error_count} error(s)"
        ))
        .into());
    }

    // ── Data store ───────────────────────────────────────────────────
    let store = Arc::new(DataStore::new(&config.storage.data_path));
    tracing::info!(
        path = %config.storage.data_path.display(),
        faqs = store.list_knowledge().len(),
        news = store.list_news().len(),
        subscribers = store.subscriber_count(),
        "data store ready"
    );

    // ── Session registry ─────────────────────────────────────────────
    let sessions = Arc::new(SessionRegistry::new(AdminCredentials::new(
        config.admin.username.clone(),
        config.admin.password_hash.clone(),
    )));
    tracing::info!(username = %config.admin.username, "session registry ready");

    // ── Answer provider ──────────────────────────────────────────────
    let provider: Option<Arc<dyn AnswerProvider>> =
        match OpenAiCompatProvider::from_config(&config.provider)? {
            Some(p) => {
                tracing::info!(model = %config.provider.model, "answer provider ready");
                Some(Arc::new(p))
            }
            None => {
                tracing::info!("no answer provider — knowledge base and fallback only");
                None
            }
        };

    // ── Analytics + realtime channel ─────────────────────────────────
    let analytics = Arc::new(Analytics::new());

    Ok(AppState {
        config,
        store,
        sessions,
        provider,
        analytics,
    })
}

/// Spawn the long-running background tokio tasks.
///
/// Call this **after** [`build_app_state`] when running the HTTP server.
pub fn spawn_background_tasks(state: &AppState) {
    // ── Hourly expired-session sweep ─────────────────────────────────
    {
        let sessions = state.sessions.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(
                std::time::Duration::from_secs(3_600),
            );
            loop {
                interval.tick().await;
                match sessions.sweep_expired() {
                    0 => {}
                    n => tracing::info!(removed = n, "swept expired admin sessions"),
                }
            }
        });
    }
    tracing::info!("background tasks spawned");
}

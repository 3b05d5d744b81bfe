use std::sync::Arc;

use pb_auth::SessionRegistry;
use pb_domain::config::Config;
use pb_providers::AnswerProvider;

use crate::analytics::Analytics;
use crate::store::DataStore;

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// File-backed content store (knowledge, news, subscribers, pages,
    /// settings).
    pub store: Arc<DataStore>,
    /// Admin session registry.
    pub sessions: Arc<SessionRegistry>,
    /// External answer provider. `None` when disabled or unconfigured.
    pub provider: Option<Arc<dyn AnswerProvider>>,
    /// Message/verification counters + realtime event fan-out.
    pub analytics: Arc<Analytics>,
}

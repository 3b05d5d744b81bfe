//! Answer-resolution pipeline.
//!
//! Given one inbound message, produce exactly one [`ResolutionOutcome`]
//! by trying resolution sources in fixed priority order and stopping at
//! the first hit:
//!
//! 1. subscription intercept
//! 2. news/broadcast intent
//! 3. knowledge-base keyword match (official)
//! 4. external answer provider (official when accepted)
//! 5. configured fallback text
//!
//! Maintenance mode short-circuits the whole pipeline before any side
//! effect. Every other invocation increments the message counter and
//! publishes a realtime event exactly once, whichever step answers.
//! The pipeline itself never fails; the provider is the only step that
//! can error and its errors are converted into a fallthrough.

use pb_domain::stamp::generate_stamp;

use crate::state::AppState;

pub const MAINTENANCE_MESSAGE: &str =
    "The assistant is temporarily offline for maintenance. Please check back soon.";
pub const SUBSCRIBED_MESSAGE: &str =
    "You have been subscribed to public health updates.";
pub const ALREADY_SUBSCRIBED_MESSAGE: &str = "You are already subscribed.";
pub const NO_NEWS_MESSAGE: &str =
    "There are no new health updates at the moment. Please check back later.";
const NEWS_HEADER: &str = "*Latest Health Updates:*";

/// How many items a news listing returns.
const NEWS_LIMIT: usize = 3;

/// The single product of one pipeline run.
#[derive(Debug, Clone)]
pub struct ResolutionOutcome {
    pub text: String,
    /// True for knowledge-base and accepted provider answers; those (and
    /// only those) carry a stamp.
    pub official: bool,
    pub stamp: Option<String>,
}

impl ResolutionOutcome {
    fn official(text: String) -> Self {
        let stamp = generate_stamp(&text);
        Self {
            text,
            official: true,
            stamp: Some(stamp),
        }
    }

    fn unofficial(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            official: false,
            stamp: None,
        }
    }
}

/// Resolve one inbound message. `sender` is the channel handle used for
/// subscription bookkeeping; anonymous simulator traffic passes `None`
/// and skips the subscription intercept.
pub async fn resolve(state: &AppState, message: &str, sender: Option<&str>) -> ResolutionOutcome {
    let settings = state.store.settings();

    // Maintenance wins over everything, including analytics.
    if settings.maintenance_mode {
        return ResolutionOutcome::unofficial(MAINTENANCE_MESSAGE);
    }

    state.analytics.record_message(message);

    let lowered = message.to_lowercase();

    // 1. Subscription intercept.
    if lowered.contains("subscribe") {
        if let Some(sender) = sender {
            let added = state.store.add_subscriber(sender);
            tracing::info!(sender = %sender, new = added, "subscription request");
            return ResolutionOutcome::unofficial(if added {
                SUBSCRIBED_MESSAGE
            } else {
                ALREADY_SUBSCRIBED_MESSAGE
            });
        }
    }

    // 2. News intent.
    if lowered.contains("news") || lowered.contains("update") || lowered.contains("latest") {
        return ResolutionOutcome::unofficial(render_news(state));
    }

    // 3. Knowledge-base match (store order, first hit wins).
    if let Some(entry) = state.store.find_match(&lowered) {
        tracing::debug!(entry_id = entry.id, "knowledge base hit");
        return ResolutionOutcome::official(entry.render_answer());
    }

    // 4. External provider. Errors fall through, never propagate.
    if let Some(provider) = &state.provider {
        match provider.answer(message).await {
            Ok(text) => {
                tracing::debug!(provider = provider.provider_id(), "provider answer accepted");
                return ResolutionOutcome::official(text);
            }
            Err(e) => {
                tracing::warn!(
                    provider = provider.provider_id(),
                    error = %e,
                    "provider failed, falling through"
                );
            }
        }
    }

    // 5. Default fallback.
    ResolutionOutcome::unofficial(settings.fallback)
}

fn render_news(state: &AppState) -> String {
    let items = state.store.latest_news(NEWS_LIMIT);
    if items.is_empty() {
        return NO_NEWS_MESSAGE.to_string();
    }

    let mut out = format!("{NEWS_HEADER}\n");
    for item in items {
        out.push_str(&format!(
            "\n*{}* ({})\n{}\n",
            item.title,
            item.date.format("%Y-%m-%d"),
            item.content
        ));
    }
    out.trim_end().to_string()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use pb_auth::{hash_password, AdminCredentials, SessionRegistry};
    use pb_domain::config::Config;
    use pb_domain::error::{Error, Result};
    use pb_domain::model::{FlagsPatch, KnowledgeEntry, NewsItem, Resource};
    use pb_providers::AnswerProvider;

    use super::*;
    use crate::analytics::Analytics;
    use crate::store::DataStore;

    struct CannedProvider(&'static str);

    #[async_trait::async_trait]
    impl AnswerProvider for CannedProvider {
        async fn answer(&self, _question: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
        fn provider_id(&self) -> &str {
            "canned"
        }
    }

    struct FailingProvider;

    #[async_trait::async_trait]
    impl AnswerProvider for FailingProvider {
        async fn answer(&self, _question: &str) -> Result<String> {
            Err(Error::Upstream {
                provider: "failing".into(),
                message: "boom".into(),
            })
        }
        fn provider_id(&self) -> &str {
            "failing"
        }
    }

    fn test_state(dir: &std::path::Path, provider: Option<Arc<dyn AnswerProvider>>) -> AppState {
        let config = Config::default();
        AppState {
            store: Arc::new(DataStore::new(dir)),
            sessions: Arc::new(SessionRegistry::new(AdminCredentials::new(
                "admin",
                hash_password("admin123"),
            ))),
            provider,
            analytics: Arc::new(Analytics::new()),
            config: Arc::new(config),
        }
    }

    fn fever_entry() -> KnowledgeEntry {
        KnowledgeEntry {
            id: 1.0,
            question: "What should I do about a fever?".into(),
            answer: "Drink fluids and rest.".into(),
            keywords: vec!["fever".into(), "temperature".into()],
            resources: vec![],
        }
    }

    fn assert_stamp_shape(stamp: &str) {
        assert_eq!(stamp.len(), 12);
        assert!(stamp.starts_with("0x"));
        assert!(stamp[2..].bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn keyword_match_is_official_with_stamp() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), None);
        state.store.upsert_knowledge(fever_entry());

        let outcome = resolve(&state, "I have a high temperature", None).await;
        assert_eq!(outcome.text, "Drink fluids and rest.");
        assert!(outcome.official);
        assert_stamp_shape(outcome.stamp.as_deref().unwrap());
    }

    #[tokio::test]
    async fn keyword_match_appends_resources() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), None);
        let mut entry = fever_entry();
        entry.resources.push(Resource {
            label: "WHO fever guidance".into(),
            url: "https://who.int/fever".into(),
        });
        state.store.upsert_knowledge(entry);

        let outcome = resolve(&state, "fever help", None).await;
        assert!(outcome.text.contains("*Related Resources:*"));
        assert!(outcome.text.contains("https://who.int/fever"));
    }

    #[tokio::test]
    async fn empty_store_without_provider_yields_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), None);

        let outcome = resolve(&state, "random text", None).await;
        assert_eq!(outcome.text, state.store.settings().fallback);
        assert!(!outcome.official);
        assert!(outcome.stamp.is_none());
    }

    #[tokio::test]
    async fn provider_answer_is_accepted_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), Some(Arc::new(CannedProvider("From upstream."))));

        let outcome = resolve(&state, "something unmatched", None).await;
        assert_eq!(outcome.text, "From upstream.");
        assert!(outcome.official);
        assert!(outcome.stamp.is_some());
    }

    #[tokio::test]
    async fn provider_failure_falls_through_to_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), Some(Arc::new(FailingProvider)));

        let outcome = resolve(&state, "something unmatched", None).await;
        assert_eq!(outcome.text, state.store.settings().fallback);
        assert!(!outcome.official);
        // The failure still counts as a resolved message.
        assert_eq!(state.analytics.snapshot().total_messages, 1);
    }

    #[tokio::test]
    async fn knowledge_beats_provider() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), Some(Arc::new(CannedProvider("upstream"))));
        state.store.upsert_knowledge(fever_entry());

        let outcome = resolve(&state, "fever", None).await;
        assert_eq!(outcome.text, "Drink fluids and rest.");
    }

    #[tokio::test]
    async fn subscription_is_idempotent_per_sender() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), None);

        let first = resolve(&state, "please subscribe me", Some("whatsapp:+1555")).await;
        assert_eq!(first.text, SUBSCRIBED_MESSAGE);
        assert!(!first.official);

        let second = resolve(&state, "please subscribe me", Some("whatsapp:+1555")).await;
        assert_eq!(second.text, ALREADY_SUBSCRIBED_MESSAGE);
        assert_eq!(state.store.subscriber_count(), 1);

        resolve(&state, "subscribe", Some("whatsapp:+1666")).await;
        assert_eq!(state.store.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn subscription_beats_keyword_match() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), None);
        state.store.upsert_knowledge(fever_entry());

        // Dual-trigger message: subscription wins because it is checked first.
        let outcome = resolve(&state, "subscribe me, I also have a fever", Some("s1")).await;
        assert_eq!(outcome.text, SUBSCRIBED_MESSAGE);
        assert_eq!(state.store.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn anonymous_subscribe_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), None);
        state.store.upsert_knowledge(fever_entry());

        // No sender: the intercept is skipped and later steps still run.
        let outcome = resolve(&state, "subscribe me, I have a fever", None).await;
        assert_eq!(outcome.text, "Drink fluids and rest.");
        assert_eq!(state.store.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn news_intent_lists_three_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), None);
        let base = Utc::now();
        for i in 0..4i64 {
            state.store.upsert_news(NewsItem {
                id: i,
                title: format!("Bulletin {i}"),
                content: format!("content {i}"),
                date: base + Duration::days(i),
            });
        }

        let outcome = resolve(&state, "any news?", None).await;
        assert!(!outcome.official);
        assert!(outcome.stamp.is_none());
        assert!(outcome.text.starts_with(NEWS_HEADER));
        assert!(!outcome.text.contains("Bulletin 0"));
        let pos3 = outcome.text.find("Bulletin 3").unwrap();
        let pos1 = outcome.text.find("Bulletin 1").unwrap();
        assert!(pos3 < pos1);
    }

    #[tokio::test]
    async fn news_intent_with_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), None);
        let outcome = resolve(&state, "what's the latest?", None).await;
        assert_eq!(outcome.text, NO_NEWS_MESSAGE);
    }

    #[tokio::test]
    async fn maintenance_short_circuits_without_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), None);
        state.store.upsert_knowledge(fever_entry());
        state.store.apply_flags(FlagsPatch {
            maintenance_mode: Some(true),
            debug_mode: None,
        });

        let outcome = resolve(&state, "fever", Some("s1")).await;
        assert_eq!(outcome.text, MAINTENANCE_MESSAGE);
        assert!(!outcome.official);
        assert!(outcome.stamp.is_none());
        assert_eq!(state.analytics.snapshot().total_messages, 0);
        assert_eq!(state.store.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn every_resolution_counts_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), None);
        state.store.upsert_knowledge(fever_entry());

        resolve(&state, "fever", None).await;
        resolve(&state, "subscribe", Some("s")).await;
        resolve(&state, "news", None).await;
        resolve(&state, "unmatched", None).await;
        assert_eq!(state.analytics.snapshot().total_messages, 4);
    }
}

//! File-backed content store.
//!
//! Knowledge entries, news items, subscribers, CMS pages, and the
//! runtime settings each persist to a JSON file under the configured
//! data directory. Files are loaded once at boot — a missing or
//! unreadable file degrades to the empty/default state rather than
//! failing the process — and rewritten eagerly on every mutation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;

use pb_domain::model::{
    BotConfigPatch, FlagsPatch, KnowledgeEntry, NewsItem, Page, Settings,
};

const KNOWLEDGE_FILE: &str = "knowledge.json";
const NEWS_FILE: &str = "news.json";
const SUBSCRIBERS_FILE: &str = "subscribers.json";
const PAGES_FILE: &str = "pages.json";
const SETTINGS_FILE: &str = "settings.json";

pub struct DataStore {
    data_path: PathBuf,
    knowledge: RwLock<Vec<KnowledgeEntry>>,
    news: RwLock<Vec<NewsItem>>,
    /// Subscriber handles in subscription order. Set semantics are
    /// enforced on insert.
    subscribers: RwLock<Vec<String>>,
    pages: RwLock<HashMap<String, Page>>,
    settings: RwLock<Settings>,
}

impl DataStore {
    /// Open (or create) the store rooted at `data_path`.
    pub fn new(data_path: &Path) -> Self {
        if let Err(e) = std::fs::create_dir_all(data_path) {
            tracing::warn!(path = %data_path.display(), error = %e, "could not create data dir");
        }

        let store = Self {
            data_path: data_path.to_path_buf(),
            knowledge: RwLock::new(load_or_default(data_path, KNOWLEDGE_FILE)),
            news: RwLock::new(load_or_default(data_path, NEWS_FILE)),
            subscribers: RwLock::new(load_or_default(data_path, SUBSCRIBERS_FILE)),
            pages: RwLock::new(load_or_default(data_path, PAGES_FILE)),
            settings: RwLock::new(load_or_default(data_path, SETTINGS_FILE)),
        };

        tracing::info!(
            path = %data_path.display(),
            knowledge = store.knowledge.read().len(),
            news = store.news.read().len(),
            subscribers = store.subscribers.read().len(),
            pages = store.pages.read().len(),
            "content store loaded"
        );
        store
    }

    // ── Knowledge base ────────────────────────────────────────────────

    pub fn list_knowledge(&self) -> Vec<KnowledgeEntry> {
        self.knowledge.read().clone()
    }

    /// First entry (in store order) whose keywords match the lowercased
    /// message. Store order is match priority.
    pub fn find_match(&self, lowered_message: &str) -> Option<KnowledgeEntry> {
        self.knowledge
            .read()
            .iter()
            .find(|entry| entry.matches(lowered_message))
            .cloned()
    }

    /// Insert or replace by id, preserving the position of a replaced
    /// entry.
    pub fn upsert_knowledge(&self, entry: KnowledgeEntry) {
        {
            let mut knowledge = self.knowledge.write();
            match knowledge.iter_mut().find(|k| k.id == entry.id) {
                Some(slot) => *slot = entry,
                None => knowledge.push(entry),
            }
        }
        self.persist(KNOWLEDGE_FILE, &*self.knowledge.read());
    }

    /// Append entries without de-duplication (bulk import path).
    pub fn bulk_add_knowledge(&self, entries: Vec<KnowledgeEntry>) -> usize {
        let count = entries.len();
        self.knowledge.write().extend(entries);
        self.persist(KNOWLEDGE_FILE, &*self.knowledge.read());
        count
    }

    /// Remove by id. Returns false when no entry matched.
    pub fn delete_knowledge(&self, id: f64) -> bool {
        let removed = {
            let mut knowledge = self.knowledge.write();
            let before = knowledge.len();
            knowledge.retain(|k| k.id != id);
            knowledge.len() < before
        };
        if removed {
            self.persist(KNOWLEDGE_FILE, &*self.knowledge.read());
        }
        removed
    }

    // ── News ──────────────────────────────────────────────────────────

    pub fn list_news(&self) -> Vec<NewsItem> {
        self.news.read().clone()
    }

    /// The `n` most recent items, newest first.
    pub fn latest_news(&self, n: usize) -> Vec<NewsItem> {
        let mut items = self.news.read().clone();
        items.sort_by(|a, b| b.date.cmp(&a.date));
        items.truncate(n);
        items
    }

    pub fn upsert_news(&self, item: NewsItem) {
        {
            let mut news = self.news.write();
            match news.iter_mut().find(|n| n.id == item.id) {
                Some(slot) => *slot = item,
                None => news.push(item),
            }
        }
        self.persist(NEWS_FILE, &*self.news.read());
    }

    pub fn delete_news(&self, id: i64) -> bool {
        let removed = {
            let mut news = self.news.write();
            let before = news.len();
            news.retain(|n| n.id != id);
            news.len() < before
        };
        if removed {
            self.persist(NEWS_FILE, &*self.news.read());
        }
        removed
    }

    // ── Subscribers ───────────────────────────────────────────────────

    /// Idempotent insert. Returns true when the sender was newly added.
    pub fn add_subscriber(&self, sender: &str) -> bool {
        let added = {
            let mut subscribers = self.subscribers.write();
            if subscribers.iter().any(|s| s == sender) {
                false
            } else {
                subscribers.push(sender.to_string());
                true
            }
        };
        if added {
            self.persist(SUBSCRIBERS_FILE, &*self.subscribers.read());
        }
        added
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    // ── Pages ─────────────────────────────────────────────────────────

    pub fn get_page(&self, slug: &str) -> Option<Page> {
        self.pages.read().get(slug).cloned()
    }

    pub fn set_page(&self, slug: &str, page: Page) {
        self.pages.write().insert(slug.to_string(), page);
        self.persist(PAGES_FILE, &*self.pages.read());
    }

    // ── Settings ──────────────────────────────────────────────────────

    pub fn settings(&self) -> Settings {
        self.settings.read().clone()
    }

    pub fn apply_bot_config(&self, patch: BotConfigPatch) -> Settings {
        let updated = {
            let mut settings = self.settings.write();
            settings.apply_bot_config(patch);
            settings.clone()
        };
        self.persist(SETTINGS_FILE, &updated);
        updated
    }

    pub fn apply_flags(&self, patch: FlagsPatch) -> Settings {
        let updated = {
            let mut settings = self.settings.write();
            settings.apply_flags(patch);
            settings.clone()
        };
        self.persist(SETTINGS_FILE, &updated);
        updated
    }

    // ── Persistence ───────────────────────────────────────────────────

    /// Write errors are logged, never propagated: the in-memory state
    /// stays authoritative for the process lifetime.
    fn persist<T: Serialize>(&self, file: &str, value: &T) {
        let path = self.data_path.join(file);
        match serde_json::to_string_pretty(value) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    tracing::error!(path = %path.display(), error = %e, "store write failed");
                }
            }
            Err(e) => {
                tracing::error!(file = %file, error = %e, "store serialization failed");
            }
        }
    }
}

fn load_or_default<T: DeserializeOwned + Default>(data_path: &Path, file: &str) -> T {
    let path = data_path.join(file);
    if !path.exists() {
        return T::default();
    }
    match load(&path) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "unusable store file, using defaults");
            T::default()
        }
    }
}

fn load<T: DeserializeOwned>(path: &Path) -> pb_domain::Result<T> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

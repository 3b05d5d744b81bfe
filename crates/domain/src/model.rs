//! Content model: knowledge entries, news items, CMS pages, and the
//! runtime-mutable bot settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Knowledge base
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A single FAQ entry. Store order is match priority: the resolution
/// pipeline scans entries in order and the first keyword hit wins.
///
/// `id` is `f64` because bulk-imported entries get fractional ids
/// (epoch millis plus a random fraction) while hand-created ones use
/// plain integers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub id: f64,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub label: String,
    pub url: String,
}

impl KnowledgeEntry {
    /// Whether any keyword occurs as a substring of the already-lowercased
    /// message. Substring, not whole-word: keyword `flu` matches
    /// `influenza`. An entry with no keywords never matches.
    pub fn matches(&self, lowered_message: &str) -> bool {
        self.keywords
            .iter()
            .any(|kw| !kw.is_empty() && lowered_message.contains(&kw.to_lowercase()))
    }

    /// The entry's answer with the related-resources block appended when
    /// resources exist.
    pub fn render_answer(&self) -> String {
        if self.resources.is_empty() {
            return self.answer.clone();
        }
        let mut out = self.answer.clone();
        out.push_str("\n\n*Related Resources:*");
        for res in &self.resources {
            out.push_str(&format!("\n- [{}]({})", res.label, res.url));
        }
        out
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// News
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default = "Utc::now")]
    pub date: DateTime<Utc>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CMS pages
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A static content page, keyed externally by slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub title: String,
    pub content: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Runtime settings
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Runtime-mutable bot settings, persisted alongside the content files.
/// Mutated only through the typed patches below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "d_greeting")]
    pub greeting: String,
    #[serde(default = "d_fallback")]
    pub fallback: String,
    #[serde(default)]
    pub maintenance_mode: bool,
    #[serde(default)]
    pub debug_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            greeting: d_greeting(),
            fallback: d_fallback(),
            maintenance_mode: false,
            debug_mode: false,
        }
    }
}

/// Partial update for the bot texts. Unknown keys are rejected at
/// deserialization time rather than silently merged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfigPatch {
    pub greeting: Option<String>,
    pub fallback: Option<String>,
}

/// Partial update for the system flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct FlagsPatch {
    pub maintenance_mode: Option<bool>,
    pub debug_mode: Option<bool>,
}

impl Settings {
    pub fn apply_bot_config(&mut self, patch: BotConfigPatch) {
        if let Some(greeting) = patch.greeting {
            self.greeting = greeting;
        }
        if let Some(fallback) = patch.fallback {
            self.fallback = fallback;
        }
    }

    pub fn apply_flags(&mut self, patch: FlagsPatch) {
        if let Some(maintenance) = patch.maintenance_mode {
            self.maintenance_mode = maintenance;
        }
        if let Some(debug) = patch.debug_mode {
            self.debug_mode = debug;
        }
    }
}

fn d_greeting() -> String {
    "Hello! I am your public health assistant. How can I help you today?".into()
}
fn d_fallback() -> String {
    "I'm sorry, I don't have information on that yet. Please visit our website for more resources."
        .into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(keywords: &[&str]) -> KnowledgeEntry {
        KnowledgeEntry {
            id: 1.0,
            question: "q".into(),
            answer: "a".into(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            resources: vec![],
        }
    }

    #[test]
    fn keyword_matches_as_substring() {
        // Substring containment, not word boundaries.
        let e = entry(&["flu"]);
        assert!(e.matches("i think i caught influenza"));
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let e = entry(&["Fever"]);
        assert!(e.matches("i have a fever today"));
    }

    #[test]
    fn empty_keyword_list_never_matches() {
        let e = entry(&[]);
        assert!(!e.matches("anything at all"));
    }

    #[test]
    fn empty_keyword_string_never_matches() {
        let e = entry(&[""]);
        assert!(!e.matches("anything at all"));
    }

    #[test]
    fn render_answer_appends_resources_block() {
        let mut e = entry(&["x"]);
        e.answer = "Drink fluids.".into();
        e.resources.push(Resource {
            label: "WHO".into(),
            url: "https://who.int".into(),
        });
        let rendered = e.render_answer();
        assert!(rendered.starts_with("Drink fluids."));
        assert!(rendered.contains("*Related Resources:*"));
        assert!(rendered.contains("[WHO](https://who.int)"));
    }

    #[test]
    fn render_answer_without_resources_is_bare() {
        let e = entry(&["x"]);
        assert_eq!(e.render_answer(), "a");
    }

    #[test]
    fn bot_config_patch_rejects_unknown_keys() {
        let raw = r#"{ "greeting": "hi", "color": "red" }"#;
        assert!(serde_json::from_str::<BotConfigPatch>(raw).is_err());
    }

    #[test]
    fn bot_config_patch_applies_partially() {
        let mut settings = Settings::default();
        let patch: BotConfigPatch =
            serde_json::from_str(r#"{ "fallback": "try the website" }"#).unwrap();
        let greeting_before = settings.greeting.clone();
        settings.apply_bot_config(patch);
        assert_eq!(settings.greeting, greeting_before);
        assert_eq!(settings.fallback, "try the website");
    }

    #[test]
    fn flags_patch_applies_partially() {
        let mut settings = Settings::default();
        settings.apply_flags(FlagsPatch {
            maintenance_mode: Some(true),
            debug_mode: None,
        });
        assert!(settings.maintenance_mode);
        assert!(!settings.debug_mode);
    }
}

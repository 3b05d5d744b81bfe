//! OpenAI-compatible adapter.
//!
//! Works with OpenAI and any other endpoint that follows the OpenAI
//! chat completions contract (Ollama, vLLM, LM Studio, Together).

use serde_json::Value;

use pb_domain::config::ProviderConfig;
use pb_domain::error::{Error, Result};

use crate::traits::AnswerProvider;

/// System prompt framing every delegated question.
const SYSTEM_PROMPT: &str = "You are a helpful public health assistant chatbot. \
Provide concise, accurate health information based on established public health \
guidelines. Keep responses under 200 words. Be empathetic and supportive. For \
medical emergencies, always advise seeking immediate professional help. Offer \
general health guidance, not personal medical advice. If unsure, recommend \
consulting a healthcare provider.";

const MAX_TOKENS: u32 = 300;
const TEMPERATURE: f32 = 0.7;

/// An answer provider backed by an OpenAI-compatible chat-completions API.
pub struct OpenAiCompatProvider {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a provider from config, or `None` when the provider is
    /// disabled or the API key env var is unset. Missing keys degrade to
    /// "no provider" rather than failing boot.
    pub fn from_config(cfg: &ProviderConfig) -> Result<Option<Self>> {
        if !cfg.enabled {
            return Ok(None);
        }

        let api_key = match std::env::var(&cfg.api_key_env) {
            Ok(key) if !key.is_empty() => key,
            _ => {
                tracing::warn!(
                    env_var = %cfg.api_key_env,
                    "answer provider enabled but API key env var is unset — provider disabled"
                );
                return Ok(None);
            }
        };

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;

        Ok(Some(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: cfg.model.clone(),
            client,
        }))
    }

    fn build_body(&self, question: &str) -> Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": question },
            ],
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
        })
    }
}

#[async_trait::async_trait]
impl AnswerProvider for OpenAiCompatProvider {
    async fn answer(&self, question: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.build_body(question))
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                provider: "openai_compat".into(),
                message: format!("HTTP {status}: {body}"),
            });
        }

        let body: Value = response.json().await.map_err(from_reqwest)?;
        parse_answer(&body)
    }

    fn provider_id(&self) -> &str {
        "openai_compat"
    }
}

/// Extract the first choice's message content from a chat-completions
/// response body.
fn parse_answer(body: &Value) -> Result<String> {
    let content = body
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::Upstream {
            provider: "openai_compat".into(),
            message: "no message content in response".into(),
        })?;

    let content = content.trim();
    if content.is_empty() {
        return Err(Error::Upstream {
            provider: "openai_compat".into(),
            message: "empty message content in response".into(),
        });
    }
    Ok(content.to_string())
}

/// Convert a [`reqwest::Error`] into the domain [`Error`] type.
fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_answer_extracts_first_choice() {
        let body = serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "  Wash your hands.  " } },
                { "message": { "role": "assistant", "content": "ignored" } },
            ]
        });
        assert_eq!(parse_answer(&body).unwrap(), "Wash your hands.");
    }

    #[test]
    fn parse_answer_rejects_missing_choices() {
        let body = serde_json::json!({ "error": { "message": "rate limited" } });
        assert!(parse_answer(&body).is_err());
    }

    #[test]
    fn parse_answer_rejects_empty_content() {
        let body = serde_json::json!({
            "choices": [ { "message": { "content": "   " } } ]
        });
        assert!(parse_answer(&body).is_err());
    }

    #[test]
    fn from_config_disabled_yields_none() {
        let cfg = ProviderConfig::default();
        assert!(OpenAiCompatProvider::from_config(&cfg).unwrap().is_none());
    }

    #[test]
    fn from_config_without_key_yields_none() {
        let cfg = ProviderConfig {
            enabled: true,
            api_key_env: "PB_TEST_NO_SUCH_KEY_0000".into(),
            ..Default::default()
        };
        assert!(OpenAiCompatProvider::from_config(&cfg).unwrap().is_none());
    }

    #[test]
    fn from_config_with_key_builds_provider() {
        let var = "PB_TEST_PROVIDER_KEY_1234";
        std::env::set_var(var, "sk-test");
        let cfg = ProviderConfig {
            enabled: true,
            api_key_env: var.into(),
            base_url: "http://localhost:11434/v1/".into(),
            ..Default::default()
        };
        let provider = OpenAiCompatProvider::from_config(&cfg).unwrap().unwrap();
        // Trailing slash is normalized away.
        assert_eq!(provider.base_url, "http://localhost:11434/v1");
        assert_eq!(provider.provider_id(), "openai_compat");
        std::env::remove_var(var);
    }
}

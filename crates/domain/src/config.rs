use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

impl Config {
    /// Sanity-check the resolved configuration.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.port".into(),
                message: "port must be greater than 0".into(),
            });
        }

        if self.server.host.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.host".into(),
                message: "host must not be empty".into(),
            });
        }

        if self.admin.username.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "admin.username".into(),
                message: "username must not be empty".into(),
            });
        }

        // The digest is hex-encoded SHA-256, so anything else means a
        // mis-pasted value rather than a weak password.
        if self.admin.password_hash.len() != 64
            || !self.admin.password_hash.bytes().all(|b| b.is_ascii_hexdigit())
        {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "admin.password_hash".into(),
                message: "must be a 64-char hex SHA-256 digest".into(),
            });
        }

        if self.admin.password_hash == d_admin_password_hash() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "admin.password_hash".into(),
                message: "default admin password in use — change it".into(),
            });
        }

        if self.provider.enabled && self.provider.base_url.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "provider.base_url".into(),
                message: "base_url must not be empty when the provider is enabled".into(),
            });
        }

        if !self.provider.enabled {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "provider".into(),
                message: "no answer provider configured — unmatched questions get the fallback text".into(),
            });
        }

        errors
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_3000")]
    pub port: u16,
    #[serde(default = "d_host")]
    pub host: String,
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "127.0.0.1".into(),
            cors: CorsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed for CORS. Use `["*"]` for permissive (NOT recommended).
    /// Defaults to localhost-only.
    #[serde(default = "d_cors_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: d_cors_origins(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Storage
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where the JSON content files (knowledge, news, subscribers, pages,
/// settings) live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "d_data_path")]
    pub data_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_path: d_data_path(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Admin principal
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The single admin principal. There is exactly one; the password digest
/// can be rotated at runtime via the change-password endpoint but the
/// username is fixed for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "d_admin_username")]
    pub username: String,
    /// Hex-encoded SHA-256 digest of the admin password.
    /// Defaults to the digest of `admin123` — change it in production.
    #[serde(default = "d_admin_password_hash")]
    pub password_hash: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: d_admin_username(),
            password_hash: d_admin_password_hash(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// External answer provider
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// OpenAI-compatible chat-completions endpoint used as the last resolution
/// source before the fallback text. Disabled unless `enabled = true` and the
/// API key env var is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "d_provider_url")]
    pub base_url: String,
    /// Environment variable holding the API key.
    #[serde(default = "d_provider_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_provider_model")]
    pub model: String,
    /// Hard bound on the provider round trip. The upstream contract has no
    /// timeout of its own, so the pipeline bounds it here.
    #[serde(default = "d_provider_timeout")]
    pub timeout_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: d_provider_url(),
            api_key_env: d_provider_key_env(),
            model: d_provider_model(),
            timeout_ms: d_provider_timeout(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_3000() -> u16 {
    3000
}
fn d_host() -> String {
    "127.0.0.1".into()
}
fn d_cors_origins() -> Vec<String> {
    vec!["http://localhost:*".into(), "http://127.0.0.1:*".into()]
}
fn d_data_path() -> PathBuf {
    PathBuf::from("./data")
}
fn d_admin_username() -> String {
    "admin".into()
}
fn d_admin_password_hash() -> String {
    // SHA-256 of "admin123".
    "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9".into()
}
fn d_provider_url() -> String {
    "https://api.openai.com/v1".into()
}
fn d_provider_key_env() -> String {
    "PB_OPENAI_API_KEY".into()
}
fn d_provider_model() -> String {
    "gpt-4o-mini".into()
}
fn d_provider_timeout() -> u64 {
    30_000
}

//! Configuration for the larder backend.
//!
//! Maps directly to `larder.toml`. Every section and field has a default, so
//! an empty file is a valid configuration. Secrets (API keys) are never read
//! from this file; [`LlmConfig::api_key_env`] names the environment variable
//! that holds them.

use serde::{Deserialize, Serialize};

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LarderConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// AI tip / recipe generation settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Expiry windows and feed tuning.
    #[serde(default)]
    pub inventory: InventoryConfig,
    /// Persistence / database settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl LarderConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `CoreError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::CoreError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level used when `RUST_LOG` is unset: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text.
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// External generation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider: "ollama", "openai", "none".
    #[serde(default = "default_ollama")]
    pub provider: String,
    /// Base URL for the LLM API.
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key (OpenAI-compatible only).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Timeout for a single attempt, in milliseconds. Resets per attempt.
    #[serde(default = "default_5000")]
    pub request_timeout_ms: u64,
    /// Attempts before falling back to a canned suggestion. Minimum 1.
    #[serde(default = "default_2")]
    pub max_attempts: u32,
    /// Cap on simultaneous in-flight calls. 0 means unbounded.
    #[serde(default)]
    pub max_concurrent_calls: usize,
    /// Maximum tokens to generate.
    #[serde(default = "default_400")]
    pub max_tokens: u32,
    /// Sampling temperature.
    #[serde(default = "default_0_7")]
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            model: "qwen2.5:1.5b".to_string(),
            api_key_env: "LARDER_LLM_API_KEY".to_string(),
            request_timeout_ms: 5000,
            max_attempts: 2,
            max_concurrent_calls: 0,
            max_tokens: 400,
            temperature: 0.7,
        }
    }
}

/// Expiry windows used by the inventory queries and the notification feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// An item is "nearly expiring" when it expires within this many days.
    #[serde(default = "default_3")]
    pub nearly_expiring_days: u32,
    /// How far back (days) generated suggestions appear in the feed.
    #[serde(default = "default_7")]
    pub suggestion_lookback_days: u32,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            nearly_expiring_days: 3,
            suggestion_lookback_days: 7,
        }
    }
}

/// Database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Path of the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Enable SQLite WAL mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_5000")]
    pub busy_timeout_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            db_path: "larder.db".to_string(),
            wal_mode: true,
            busy_timeout_ms: 5000,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_ollama() -> String { "ollama".to_string() }
fn default_ollama_url() -> String { "http://localhost:11434".to_string() }
fn default_model() -> String { "qwen2.5:1.5b".to_string() }
fn default_api_key_env() -> String { "LARDER_LLM_API_KEY".to_string() }
fn default_db_path() -> String { "larder.db".to_string() }
fn default_0_7() -> f32 { 0.7 }
fn default_2() -> u32 { 2 }
fn default_3() -> u32 { 3 }
fn default_7() -> u32 { 7 }
fn default_400() -> u32 { 400 }
fn default_5000() -> u64 { 5000 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = LarderConfig::from_toml("").expect("empty config parses");
        assert_eq!(config.llm.max_attempts, 2);
        assert_eq!(config.llm.request_timeout_ms, 5000);
        assert_eq!(config.inventory.nearly_expiring_days, 3);
        assert!(config.persistence.wal_mode);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = LarderConfig::from_toml(
            r#"
            [llm]
            provider = "openai"
            base_url = "https://api.example.com"
            max_attempts = 4

            [inventory]
            nearly_expiring_days = 5
            "#,
        )
        .expect("parse");
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.max_attempts, 4);
        assert_eq!(config.llm.model, "qwen2.5:1.5b");
        assert_eq!(config.inventory.nearly_expiring_days, 5);
        assert_eq!(config.inventory.suggestion_lookback_days, 7);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = LarderConfig::from_toml("[llm\nprovider = 1").expect_err("must fail");
        assert!(matches!(err, crate::CoreError::Config(_)));
    }

    #[test]
    fn from_file_reads_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("larder.toml");
        std::fs::write(&path, "[persistence]\ndb_path = \"/tmp/x.db\"\n").expect("write");
        let config = LarderConfig::from_file(&path).expect("load");
        assert_eq!(config.persistence.db_path, "/tmp/x.db");
    }
}

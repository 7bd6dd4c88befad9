//! LLM Client: one HTTP call per attempt against Ollama or an
//! OpenAI-compatible API.
//!
//! The client never retries on its own. Retry and fallback belong to
//! [`crate::generator::ResilientGenerator`], which drives this client
//! through the [`GenerationService`] trait.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::debug;

use larder_core::config::LlmConfig;

use crate::error::LlmError;
use crate::generator::GenerationService;
use crate::types::{OutputShape, Prompt, truncate};

/// Provider backend for LLM inference.
#[derive(Debug)]
pub enum LlmProvider {
    /// Ollama running locally.
    Ollama {
        /// e.g. `http://localhost:11434`
        base_url: String,
    },
    /// OpenAI-compatible chat completions API.
    OpenAiCompatible {
        /// e.g. `https://api.openai.com`
        base_url: String,
        /// Bearer token. Redacted in `Debug` output.
        api_key: SecretString,
    },
    /// No LLM available. Every call fails, so callers get the fallback.
    None,
}

/// HTTP client for the external generation service.
#[derive(Debug)]
pub struct LlmClient {
    provider: LlmProvider,
    http: Client,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl LlmClient {
    /// Create a new LLM client.
    #[must_use]
    pub fn new(provider: LlmProvider, model: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            provider,
            http: Client::new(),
            model: model.into(),
            max_tokens,
            temperature,
        }
    }

    /// Create a client with no backend (every call fails → fallback).
    #[must_use]
    pub fn none() -> Self {
        Self::new(LlmProvider::None, String::new(), 0, 0.0)
    }

    /// Build a client from configuration.
    ///
    /// For the `openai` provider the API key is read from the environment
    /// variable named by `config.api_key_env`.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` for an unknown provider or a missing key.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let provider = match config.provider.as_str() {
            "ollama" => LlmProvider::Ollama { base_url },
            "openai" => {
                let key = std::env::var(&config.api_key_env).map_err(|_| {
                    LlmError::Config(format!(
                        "API key not set: configure the '{}' environment variable",
                        config.api_key_env
                    ))
                })?;
                LlmProvider::OpenAiCompatible {
                    base_url,
                    api_key: SecretString::from(key),
                }
            }
            "none" => LlmProvider::None,
            other => {
                return Err(LlmError::Config(format!("unknown LLM provider: '{other}'")));
            }
        };
        Ok(Self::new(provider, config.model.clone(), config.max_tokens, config.temperature))
    }

    /// Check if the client has a backend configured.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self.provider, LlmProvider::None)
    }

    /// Model name sent with each request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate using Ollama's API.
    async fn complete_ollama(
        &self,
        base_url: &str,
        prompt: &Prompt,
        shape: OutputShape,
        timeout: Duration,
    ) -> Result<String, LlmError> {
        let url = format!("{base_url}/api/generate");
        let mut body = json!({
            "model": self.model,
            "system": prompt.system,
            "prompt": prompt.user,
            "stream": false,
            "options": {
                "temperature": self.temperature,
                "num_predict": self.max_tokens,
            }
        });
        if shape == OutputShape::StructuredJson {
            body["format"] = json!("json");
        }

        let request = self.http.post(&url).json(&body);
        let json = send(request, timeout).await?;
        extract_text(&json["response"])
    }

    /// Generate using an OpenAI-compatible API.
    async fn complete_openai(
        &self,
        base_url: &str,
        api_key: &SecretString,
        prompt: &Prompt,
        shape: OutputShape,
        timeout: Duration,
    ) -> Result<String, LlmError> {
        let url = format!("{base_url}/v1/chat/completions");
        let mut body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user },
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });
        if shape == OutputShape::StructuredJson {
            body["response_format"] = json!({ "type": "json_object" });
        }

        let request = self
            .http
            .post(&url)
            .bearer_auth(api_key.expose_secret())
            .json(&body);
        let json = send(request, timeout).await?;
        extract_text(&json["choices"][0]["message"]["content"])
    }
}

/// Send one request and decode a 2xx JSON body.
async fn send(request: reqwest::RequestBuilder, timeout: Duration) -> Result<Value, LlmError> {
    let start = Instant::now();
    let resp = request
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| with_timeout(e.into(), timeout))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(LlmError::Status {
            status: status.as_u16(),
            body: truncate(&body, 300),
        });
    }

    let json: Value = resp
        .json()
        .await
        .map_err(|e| with_timeout(e.into(), timeout))?;
    debug!(
        status = status.as_u16(),
        latency_ms = start.elapsed().as_millis(),
        "LLM call completed"
    );
    Ok(json)
}

/// Replace the placeholder duration reqwest errors carry with the real one.
fn with_timeout(err: LlmError, timeout: Duration) -> LlmError {
    match err {
        LlmError::Timeout(_) => LlmError::Timeout(timeout),
        other => other,
    }
}

fn extract_text(field: &Value) -> Result<String, LlmError> {
    match field.as_str() {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        Some(_) => Err(LlmError::Malformed("LLM returned empty text".into())),
        None => Err(LlmError::Malformed("LLM response has no text field".into())),
    }
}

#[async_trait]
impl GenerationService for LlmClient {
    async fn complete(
        &self,
        prompt: &Prompt,
        shape: OutputShape,
        timeout: Duration,
    ) -> Result<String, LlmError> {
        match &self.provider {
            LlmProvider::None => Err(LlmError::Unavailable("No LLM provider configured".into())),
            LlmProvider::Ollama { base_url } => {
                self.complete_ollama(base_url, prompt, shape, timeout).await
            }
            LlmProvider::OpenAiCompatible { base_url, api_key } => {
                self.complete_openai(base_url, api_key, prompt, shape, timeout)
                    .await
            }
        }
    }

    fn name(&self) -> &str {
        match self.provider {
            LlmProvider::None => "none",
            LlmProvider::Ollama { .. } => "ollama",
            LlmProvider::OpenAiCompatible { .. } => "openai",
        }
    }
}

//! Bounded retry with a guaranteed fallback.
//!
//! [`ResilientGenerator::generate`] makes at most `policy.max_attempts` calls
//! to the [`GenerationService`], each under its own timeout, and returns the
//! first good value. When every attempt fails it asks the
//! [`FallbackProvider`] instead. Transport errors, timeouts, bad statuses and
//! unparsable output never reach the caller.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::error::{FallbackError, LlmError};
use crate::fallback::FallbackProvider;
use crate::prompt::PromptSet;
use crate::types::{GeneratedValue, GenerationRequest, GenerationResult, OutputShape, Prompt, Recipe, RetryPolicy};

/// An external text-generation backend.
///
/// One call is one attempt. Implementations must not retry internally.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Send `prompt` and return the raw model text.
    ///
    /// `timeout` is advisory for the transport; the generator enforces it
    /// independently.
    ///
    /// # Errors
    /// Any transport, status, or payload failure for this single call.
    async fn complete(
        &self,
        prompt: &Prompt,
        shape: OutputShape,
        timeout: Duration,
    ) -> Result<String, LlmError>;

    /// Backend name for logs.
    fn name(&self) -> &str {
        "service"
    }
}

/// Retry-then-fallback wrapper around a [`GenerationService`].
///
/// Holds no per-call state, so one instance can serve any number of
/// concurrent `generate` calls.
pub struct ResilientGenerator {
    service: Arc<dyn GenerationService>,
    fallback: Arc<dyn FallbackProvider>,
    prompts: PromptSet,
    permits: Option<Arc<Semaphore>>,
}

impl std::fmt::Debug for ResilientGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientGenerator")
            .field("service", &self.service.name())
            .field("concurrency_limit", &self.permits.as_ref().map(|_| "bounded"))
            .finish_non_exhaustive()
    }
}

impl ResilientGenerator {
    /// Create a generator with the built-in prompts and no concurrency limit.
    #[must_use]
    pub fn new(service: Arc<dyn GenerationService>, fallback: Arc<dyn FallbackProvider>) -> Self {
        Self {
            service,
            fallback,
            prompts: PromptSet::builtin(),
            permits: None,
        }
    }

    /// Use a custom prompt set.
    #[must_use]
    pub fn with_prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    /// Cap the number of service calls in flight across all `generate`
    /// calls on this instance. `0` means unlimited.
    ///
    /// Waiting for a slot counts against the attempt's timeout.
    #[must_use]
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.permits = (limit > 0).then(|| Arc::new(Semaphore::new(limit)));
        self
    }

    /// Generate a value for `request`, falling back after `policy` is spent.
    ///
    /// # Errors
    /// Only [`FallbackError`], when the fallback provider itself fails or
    /// returns a value of the wrong shape.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        policy: &RetryPolicy,
    ) -> Result<GenerationResult, FallbackError> {
        let shape = request.shape();
        let prompt = self.prompts.build(request);
        let budget = policy.attempt_budget();

        let mut remaining = budget;
        let mut attempts = 0u32;
        while remaining > 0 {
            remaining -= 1;
            attempts += 1;

            let start = Instant::now();
            match self.attempt(&prompt, shape, policy.per_attempt_timeout).await {
                Ok(value) => {
                    debug!(
                        service = self.service.name(),
                        attempt = attempts,
                        latency_ms = start.elapsed().as_millis(),
                        "generation succeeded"
                    );
                    return Ok(GenerationResult {
                        value,
                        used_fallback: false,
                        attempts,
                    });
                }
                Err(e) => {
                    warn!(
                        service = self.service.name(),
                        attempt = attempts,
                        max_attempts = budget,
                        kind = e.kind(),
                        error = %e,
                        "generation attempt failed"
                    );
                }
            }
        }

        let value = self.fallback.fallback(request)?;
        if value.shape() != shape {
            return Err(FallbackError::ShapeMismatch {
                expected: shape,
                actual: value.shape(),
            });
        }
        info!(
            subject = %request.subject(),
            attempts,
            "all generation attempts failed, using fallback"
        );
        Ok(GenerationResult {
            value,
            used_fallback: true,
            attempts,
        })
    }

    /// One call under `timeout`, including any wait for a concurrency slot.
    async fn attempt(
        &self,
        prompt: &Prompt,
        shape: OutputShape,
        timeout: Duration,
    ) -> Result<GeneratedValue, LlmError> {
        let call = async {
            let _permit = match &self.permits {
                Some(permits) => Some(
                    permits
                        .acquire()
                        .await
                        .map_err(|e| LlmError::Unavailable(e.to_string()))?,
                ),
                None => None,
            };
            self.service.complete(prompt, shape, timeout).await
        };

        let text = tokio::time::timeout(timeout, call)
            .await
            .map_err(|_| LlmError::Timeout(timeout))??;

        match shape {
            OutputShape::FreeText => {
                let text = text.trim();
                if text.is_empty() {
                    Err(LlmError::Malformed("empty text".into()))
                } else {
                    Ok(GeneratedValue::Text(text.to_string()))
                }
            }
            OutputShape::StructuredJson => Recipe::parse(&text).map(GeneratedValue::Recipe),
        }
    }
}

//! # larder-llm: storage tips and recipes that always come back
//!
//! Wraps an external LLM behind a bounded retry loop with a local fallback:
//!   - **Ollama** (local, default)
//!   - **OpenAI-compatible API**
//!   - **None** (every request is served from the fallback templates)
//!
//! # Architecture
//!
//! ```text
//! GenerationRequest ──► PromptSet ──► ResilientGenerator ──► GenerationService (LlmClient)
//!                                         │  attempt 1..=max_attempts, each under its own timeout
//!                                         └─► FallbackProvider (TemplateFallback) on exhaustion
//! ```
//!
//! The caller always gets a value. `GenerationResult::used_fallback` says
//! whether it was generated or canned.

pub mod client;
pub mod error;
pub mod fallback;
pub mod generator;
pub mod prompt;
pub mod types;

pub use client::{LlmClient, LlmProvider};
pub use error::{FallbackError, LlmError};
pub use fallback::{FallbackProvider, TemplateFallback};
pub use generator::{GenerationService, ResilientGenerator};
pub use prompt::{PromptSet, build_prompt};
pub use types::{
    GeneratedValue, GenerationRequest, GenerationResult, OutputShape, Prompt, Recipe, RetryPolicy,
};

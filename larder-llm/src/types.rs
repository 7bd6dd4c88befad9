//! Core types for generation requests and results.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Shape of the value a request expects back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputShape {
    /// Plain prose.
    FreeText,
    /// A JSON record with `title`, `ingredients`, `instructions`.
    StructuredJson,
}

/// What to generate. Immutable once built.
///
/// Callers validate inputs (non-blank subject, at least one ingredient)
/// before building a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenerationRequest {
    /// A storage tip for one food item.
    Tip {
        /// Item name, e.g. "spinach".
        subject: String,
        /// Expiry date the tip should take into account.
        context_date: Option<NaiveDate>,
    },
    /// A recipe using the given ingredients.
    Recipe {
        /// Ingredient names, in the caller's order.
        ingredients: Vec<String>,
    },
}

impl GenerationRequest {
    /// Create a storage-tip request.
    #[must_use]
    pub fn tip(subject: impl Into<String>, context_date: Option<NaiveDate>) -> Self {
        Self::Tip {
            subject: subject.into(),
            context_date,
        }
    }

    /// Create a recipe request.
    #[must_use]
    pub fn recipe<I, S>(ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Recipe {
            ingredients: ingredients.into_iter().map(Into::into).collect(),
        }
    }

    /// The output shape this request expects.
    #[must_use]
    pub fn shape(&self) -> OutputShape {
        match self {
            Self::Tip { .. } => OutputShape::FreeText,
            Self::Recipe { .. } => OutputShape::StructuredJson,
        }
    }

    /// Short human-readable subject, for logs.
    #[must_use]
    pub fn subject(&self) -> String {
        match self {
            Self::Tip { subject, .. } => subject.clone(),
            Self::Recipe { ingredients } => ingredients.join(", "),
        }
    }
}

/// A structured recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Dish name.
    pub title: String,
    /// Ingredients, in order.
    pub ingredients: Vec<String>,
    /// Steps, in order.
    pub instructions: Vec<String>,
}

impl Recipe {
    /// Parse model output into a recipe.
    ///
    /// Accepts the JSON object bare or wrapped in a Markdown code fence.
    /// All three fields must be present and non-empty, with no blank list entries.
    ///
    /// # Errors
    /// Returns `LlmError::Malformed` if the text is not a complete recipe.
    pub fn parse(text: &str) -> Result<Self, LlmError> {
        let body = strip_code_fence(text);
        let recipe: Recipe = serde_json::from_str(body).map_err(|e| {
            LlmError::Malformed(format!("JSON parse error: {e}, raw text: '{}'", truncate(text, 200)))
        })?;

        if recipe.title.trim().is_empty() {
            return Err(LlmError::Malformed("recipe title is empty".into()));
        }
        if recipe.ingredients.is_empty() {
            return Err(LlmError::Malformed("recipe has no ingredients".into()));
        }
        if recipe.instructions.is_empty() {
            return Err(LlmError::Malformed("recipe has no instructions".into()));
        }
        if recipe.ingredients.iter().any(|s| s.trim().is_empty()) {
            return Err(LlmError::Malformed("recipe has a blank ingredient".into()));
        }
        if recipe.instructions.iter().any(|s| s.trim().is_empty()) {
            return Err(LlmError::Malformed("recipe has a blank instruction".into()));
        }
        Ok(recipe)
    }
}

/// Remove a surrounding ```` ``` ```` / ```` ```json ```` fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max_chars).collect();
        cut.push('…');
        cut
    }
}

/// A generated (or fallback) value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeneratedValue {
    /// Free text, for tips.
    Text(String),
    /// Structured record, for recipes.
    Recipe(Recipe),
}

impl GeneratedValue {
    /// Shape of this value.
    #[must_use]
    pub fn shape(&self) -> OutputShape {
        match self {
            Self::Text(_) => OutputShape::FreeText,
            Self::Recipe(_) => OutputShape::StructuredJson,
        }
    }

    /// Borrow the text, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Recipe(_) => None,
        }
    }

    /// Borrow the recipe, if this is a structured value.
    #[must_use]
    pub fn as_recipe(&self) -> Option<&Recipe> {
        match self {
            Self::Recipe(recipe) => Some(recipe),
            Self::Text(_) => None,
        }
    }
}

/// Outcome of [`crate::generator::ResilientGenerator::generate`].
///
/// Always carries a usable value. `used_fallback` tells the caller whether
/// it came from the service or from the canned fallback set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    /// The value, shaped as the request asked.
    pub value: GeneratedValue,
    /// Whether `value` is a fallback.
    pub used_fallback: bool,
    /// How many service attempts were made.
    pub attempts: u32,
}

/// Retry budget for one `generate` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 count as 1.
    pub max_attempts: u32,
    /// Timeout for each attempt. Resets per attempt.
    pub per_attempt_timeout: Duration,
}

impl RetryPolicy {
    /// Create a policy.
    #[must_use]
    pub fn new(max_attempts: u32, per_attempt_timeout: Duration) -> Self {
        Self {
            max_attempts,
            per_attempt_timeout,
        }
    }

    /// Attempt budget with the lower bound applied.
    #[must_use]
    pub fn attempt_budget(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Upper bound on the time spent in service calls.
    #[must_use]
    pub fn worst_case(&self) -> Duration {
        self.per_attempt_timeout * self.attempt_budget()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_secs(5))
    }
}

impl From<&larder_core::config::LlmConfig> for RetryPolicy {
    fn from(config: &larder_core::config::LlmConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.request_timeout_ms),
        )
    }
}

/// A rendered prompt ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    /// System instruction.
    pub system: String,
    /// User instruction.
    pub user: String,
}

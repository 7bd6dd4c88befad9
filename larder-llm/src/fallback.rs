//! Canned fallback values for when the generation service gives up.
//!
//! Selection is local and cannot fail: a tip is one of a fixed set of
//! templates filled with the subject, a recipe is one fixed record built
//! around the caller's ingredient list.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::FallbackError;
use crate::prompt::render_template;
use crate::types::{GeneratedValue, GenerationRequest, Recipe};

/// Supplies a value when every service attempt has failed.
///
/// Implementations must not depend on anything that can fail at runtime.
/// An `Err` here is treated as a programming error and surfaces to the
/// caller of `generate`.
pub trait FallbackProvider: Send + Sync {
    /// Produce a fallback value shaped for `request`.
    ///
    /// # Errors
    /// Only on a defect in the provider.
    fn fallback(&self, request: &GenerationRequest) -> Result<GeneratedValue, FallbackError>;
}

/// Storage tip templates. `{subject}` is replaced by the item name.
pub const TIP_TEMPLATES: [&str; 5] = [
    "Keep {subject} in an airtight container in the fridge and use it within a few days.",
    "Store {subject} somewhere cool, dry and dark, away from direct sunlight.",
    "Wrap {subject} loosely in a paper towel before refrigerating to absorb extra moisture.",
    "If you can't use {subject} soon, portion it and freeze it for later.",
    "Check {subject} daily and move it to the front of the fridge so it gets used first.",
];

/// Title of the fallback recipe.
pub const FALLBACK_RECIPE_TITLE: &str = "Simple pantry stir-fry";

/// Steps of the fallback recipe. Generic enough for any ingredient list.
pub const FALLBACK_RECIPE_STEPS: [&str; 4] = [
    "Wash and chop all ingredients into bite-sized pieces.",
    "Heat a little oil in a pan over medium heat.",
    "Cook the ingredients, firmest first, stirring until tender.",
    "Season with salt and pepper to taste and serve warm.",
];

/// Template-based fallback provider.
///
/// Tips are picked uniformly at random from [`TIP_TEMPLATES`]. Use
/// [`TemplateFallback::seeded`] for a reproducible sequence.
#[derive(Debug)]
pub struct TemplateFallback {
    rng: Mutex<StdRng>,
}

impl TemplateFallback {
    /// Provider seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Provider with a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Build the fallback tip for `subject` from template `index`.
    #[must_use]
    pub fn tip_for(subject: &str, index: usize) -> String {
        let template = TIP_TEMPLATES[index % TIP_TEMPLATES.len()];
        render_template(template, &[("subject", subject)])
    }

    /// Build the fallback recipe around `ingredients`, kept verbatim.
    #[must_use]
    pub fn recipe_for(ingredients: &[String]) -> Recipe {
        Recipe {
            title: FALLBACK_RECIPE_TITLE.to_string(),
            ingredients: ingredients.to_vec(),
            instructions: FALLBACK_RECIPE_STEPS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl Default for TemplateFallback {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackProvider for TemplateFallback {
    fn fallback(&self, request: &GenerationRequest) -> Result<GeneratedValue, FallbackError> {
        match request {
            GenerationRequest::Tip { subject, .. } => {
                let index = self.rng.lock().gen_range(0..TIP_TEMPLATES.len());
                Ok(GeneratedValue::Text(Self::tip_for(subject, index)))
            }
            GenerationRequest::Recipe { ingredients } => {
                Ok(GeneratedValue::Recipe(Self::recipe_for(ingredients)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tip_fallback_mentions_subject() {
        let provider = TemplateFallback::seeded(7);
        for _ in 0..20 {
            let value = provider
                .fallback(&GenerationRequest::tip("spinach", None))
                .expect("infallible");
            let text = value.as_text().expect("text");
            assert!(text.contains("spinach"));
            assert!((0..TIP_TEMPLATES.len()).any(|i| TemplateFallback::tip_for("spinach", i) == text));
        }
    }

    #[test]
    fn seeded_providers_agree() {
        let a = TemplateFallback::seeded(42);
        let b = TemplateFallback::seeded(42);
        let request = GenerationRequest::tip("leeks", None);
        for _ in 0..10 {
            assert_eq!(
                a.fallback(&request).expect("a"),
                b.fallback(&request).expect("b")
            );
        }
    }

    #[test]
    fn recipe_fallback_keeps_ingredients_verbatim() {
        let provider = TemplateFallback::new();
        let value = provider
            .fallback(&GenerationRequest::recipe(["egg", "rice"]))
            .expect("infallible");
        let recipe = value.as_recipe().expect("recipe");
        assert_eq!(recipe.ingredients, vec!["egg", "rice"]);
        assert_eq!(recipe.title, FALLBACK_RECIPE_TITLE);
        assert_eq!(recipe.instructions.len(), FALLBACK_RECIPE_STEPS.len());
    }
}

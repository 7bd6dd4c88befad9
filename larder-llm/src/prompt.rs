//! Prompt templates for tip and recipe generation.
//!
//! The built-in templates are compiled in. A deployment can override any of
//! them with a TOML file (see [`PromptSet::from_toml`]); missing entries keep
//! the built-in text.

use serde::Deserialize;

use crate::types::{GenerationRequest, Prompt};

/// Storage tip system prompt.
pub const TIP_SYSTEM: &str = r"You are a practical kitchen assistant that helps households waste less food.
Give one short storage tip (at most 3 sentences) for the item the user names.
Be concrete: temperature, container, where in the fridge or pantry.
Do not use Markdown. Do not add greetings.";

/// Storage tip user prompt. Placeholders: `{subject}`, `{expiry_note}`.
pub const TIP_USER: &str = r"Food item: {subject}
{expiry_note}
How should I store it so it lasts as long as possible?";

/// Recipe system prompt.
pub const RECIPE_SYSTEM: &str = r"You are a home cook who turns leftovers into simple meals.
Use the ingredients the user lists; you may assume salt, pepper, oil and water.
Your response must be valid JSON and nothing else.";

/// Recipe user prompt. Placeholder: `{ingredients}`.
pub const RECIPE_USER: &str = r#"Ingredients I need to use up:
{ingredients}

Return JSON:
{{"title": "dish name", "ingredients": ["ingredient", ...], "instructions": ["step", ...]}}"#;

/// Simple template interpolation for prompts.
///
/// Replaces `{key}` with the corresponding value in a single pass over the
/// template, so text inside a value is never treated as a placeholder.
/// `{{` and `}}` render as literal braces. Unknown `{key}` tokens are kept
/// as written.
#[must_use]
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('{') {
            if let Some(end) = tail.find('}') {
                let key = &tail[1..end];
                if let Some((_, value)) = vars.iter().find(|(k, _)| *k == key) {
                    out.push_str(value);
                    rest = &tail[end + 1..];
                    continue;
                }
            }
        }
        out.push_str(&tail[..1]);
        rest = &tail[1..];
    }
    out.push_str(rest);
    out
}

/// Optional overrides parsed from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
struct PromptOverrides {
    #[serde(default)]
    tip: Option<TemplatePair>,
    #[serde(default)]
    recipe: Option<TemplatePair>,
}

#[derive(Debug, Clone, Deserialize)]
struct TemplatePair {
    system: String,
    user: String,
}

/// The active set of templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    /// Tip system template.
    pub tip_system: String,
    /// Tip user template.
    pub tip_user: String,
    /// Recipe system template.
    pub recipe_system: String,
    /// Recipe user template.
    pub recipe_user: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptSet {
    /// The compiled-in templates.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            tip_system: TIP_SYSTEM.into(),
            tip_user: TIP_USER.into(),
            recipe_system: RECIPE_SYSTEM.into(),
            recipe_user: RECIPE_USER.into(),
        }
    }

    /// Built-in templates with `[tip]` / `[recipe]` tables from TOML applied.
    ///
    /// ```toml
    /// [tip]
    /// system = "..."
    /// user = "Item: {subject}. {expiry_note}"
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a message if the TOML cannot be parsed.
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        let overrides: PromptOverrides =
            toml::from_str(toml_str).map_err(|e| format!("failed to parse prompt overrides: {e}"))?;

        let mut set = Self::builtin();
        if let Some(tip) = overrides.tip {
            set.tip_system = tip.system;
            set.tip_user = tip.user;
        }
        if let Some(recipe) = overrides.recipe {
            set.recipe_system = recipe.system;
            set.recipe_user = recipe.user;
        }
        Ok(set)
    }

    /// Render the system and user prompt for a request.
    #[must_use]
    pub fn build(&self, request: &GenerationRequest) -> Prompt {
        match request {
            GenerationRequest::Tip {
                subject,
                context_date,
            } => {
                let expiry_note = context_date
                    .map(|d| format!("It expires on {}.", d.format("%Y-%m-%d")))
                    .unwrap_or_default();
                let vars = [("subject", subject.as_str()), ("expiry_note", expiry_note.as_str())];
                Prompt {
                    system: render_template(&self.tip_system, &vars),
                    user: render_template(&self.tip_user, &vars),
                }
            }
            GenerationRequest::Recipe { ingredients } => {
                let list = ingredients
                    .iter()
                    .map(|i| format!("- {i}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                let vars = [("ingredients", list.as_str())];
                Prompt {
                    system: render_template(&self.recipe_system, &vars),
                    user: render_template(&self.recipe_user, &vars),
                }
            }
        }
    }
}

/// Render a request with the built-in templates.
#[must_use]
pub fn build_prompt(request: &GenerationRequest) -> Prompt {
    PromptSet::builtin().build(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn template_rendering_works() {
        let rendered = render_template(
            "Store {subject} {where}.",
            &[("subject", "kale"), ("where", "in the crisper")],
        );
        assert_eq!(rendered, "Store kale in the crisper.");
    }

    #[test]
    fn template_handles_missing_vars() {
        let rendered = render_template("Hello {subject}, {unknown}.", &[("subject", "kale")]);
        assert_eq!(rendered, "Hello kale, {unknown}.");
    }

    #[test]
    fn template_does_not_expand_placeholders_inside_values() {
        let rendered = render_template(
            "{subject} / {expiry_note}",
            &[("subject", "jam {expiry_note}"), ("expiry_note", "soon")],
        );
        assert_eq!(rendered, "jam {expiry_note} / soon");
    }

    #[test]
    fn template_unescapes_doubled_braces() {
        let rendered = render_template(r#"{{"a": "{subject}"}} {{subject}}"#, &[("subject", "kale")]);
        assert_eq!(rendered, r#"{"a": "kale"} {subject}"#);
    }

    #[test]
    fn tip_prompt_mentions_subject_and_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).expect("date");
        let prompt = build_prompt(&GenerationRequest::tip("spinach", Some(date)));
        assert!(prompt.user.contains("spinach"));
        assert!(prompt.user.contains("2026-03-14"));
        assert!(!prompt.user.contains("{subject}"));
    }

    #[test]
    fn tip_subject_with_placeholder_text_is_verbatim() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).expect("date");
        let prompt = build_prompt(&GenerationRequest::tip("jam {expiry_note}", Some(date)));
        assert!(prompt.user.contains("Food item: jam {expiry_note}\n"));
        assert_eq!(prompt.user.matches("It expires on 2026-03-14.").count(), 1);
    }

    #[test]
    fn tip_prompt_without_date_has_no_placeholder() {
        let prompt = build_prompt(&GenerationRequest::tip("spinach", None));
        assert!(!prompt.user.contains("{expiry_note}"));
        assert!(!prompt.user.contains("expires"));
    }

    #[test]
    fn recipe_prompt_lists_ingredients_and_json_shape() {
        let prompt = build_prompt(&GenerationRequest::recipe(["egg", "rice"]));
        assert!(prompt.user.contains("- egg\n- rice"));
        assert!(prompt.user.contains(r#"{"title": "dish name""#));
        assert!(prompt.system.contains("valid JSON"));
    }

    #[test]
    fn toml_overrides_replace_only_given_templates() {
        let set = PromptSet::from_toml(
            r#"
            [tip]
            system = "Be brief."
            user = "Tip for {subject}."
            "#,
        )
        .expect("parse");
        assert_eq!(set.tip_system, "Be brief.");
        assert_eq!(set.recipe_user, RECIPE_USER);

        let prompt = set.build(&GenerationRequest::tip("leeks", None));
        assert_eq!(prompt.user, "Tip for leeks.");
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(PromptSet::from_toml("[tip\nsystem = ").is_err());
    }
}

//! Prompt quality evaluation: golden test set.
//!
//! A curated set of request → rendered-prompt expectations for the tip and
//! recipe templates.
//!
//! ## Usage
//!
//! - **Offline eval:** `cargo test -p larder-llm --test eval_golden` checks
//!   that templates render into well-formed prompts.
//! - **Online eval (requires Ollama):** set `LARDER_EVAL_LLM=1` to send the
//!   golden requests to a local model and check the answers parse.

use chrono::NaiveDate;
use larder_llm::{GenerationRequest, PromptSet, prompt};

/// A golden test case for prompt evaluation.
struct GoldenCase {
    /// Human-readable name for the test case.
    name: &'static str,
    /// Request to render.
    request: GenerationRequest,
    /// Strings that MUST appear in the rendered user prompt.
    prompt_must_contain: Vec<&'static str>,
    /// Strings that MUST NOT appear in either rendered prompt.
    prompt_must_not_contain: Vec<&'static str>,
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn golden_cases() -> Vec<GoldenCase> {
    vec![
        // ---------------------------------------------------------------
        // 1. Leafy greens close to expiry
        // ---------------------------------------------------------------
        GoldenCase {
            name: "spinach_with_expiry",
            request: GenerationRequest::tip("spinach", Some(date(2026, 3, 14))),
            prompt_must_contain: vec!["spinach", "2026-03-14", "store"],
            prompt_must_not_contain: vec!["{subject}", "{expiry_note}", "TODO"],
        },
        GoldenCase {
            name: "spinach_without_expiry",
            request: GenerationRequest::tip("spinach", None),
            prompt_must_contain: vec!["spinach"],
            prompt_must_not_contain: vec!["{expiry_note}", "expires on"],
        },
        // ---------------------------------------------------------------
        // 2. Names with punctuation and non-ASCII survive untouched
        // ---------------------------------------------------------------
        GoldenCase {
            name: "multiword_subject",
            request: GenerationRequest::tip("Greek yogurt (2% fat)", Some(date(2026, 1, 2))),
            prompt_must_contain: vec!["Greek yogurt (2% fat)", "2026-01-02"],
            prompt_must_not_contain: vec!["{subject}"],
        },
        GoldenCase {
            name: "unicode_subject",
            request: GenerationRequest::tip("crème fraîche", None),
            prompt_must_contain: vec!["crème fraîche"],
            prompt_must_not_contain: vec!["{subject}"],
        },
        GoldenCase {
            name: "subject_with_braces",
            request: GenerationRequest::tip("jam {{homemade}}", None),
            prompt_must_contain: vec!["jam {{homemade}}"],
            prompt_must_not_contain: vec!["{subject}"],
        },
        GoldenCase {
            name: "subject_naming_a_placeholder",
            request: GenerationRequest::tip("jam {expiry_note}", Some(date(2026, 3, 14))),
            prompt_must_contain: vec!["Food item: jam {expiry_note}\n", "2026-03-14"],
            prompt_must_not_contain: vec!["{subject}", "jam It expires"],
        },
        // ---------------------------------------------------------------
        // 3. Recipes
        // ---------------------------------------------------------------
        GoldenCase {
            name: "egg_and_rice",
            request: GenerationRequest::recipe(["egg", "rice"]),
            prompt_must_contain: vec!["- egg", "- rice", "\"title\"", "\"instructions\""],
            prompt_must_not_contain: vec!["{ingredients}", "{{"],
        },
        GoldenCase {
            name: "single_ingredient",
            request: GenerationRequest::recipe(["leftover chicken"]),
            prompt_must_contain: vec!["- leftover chicken", "JSON"],
            prompt_must_not_contain: vec!["{ingredients}"],
        },
        GoldenCase {
            name: "many_ingredients_keep_order",
            request: GenerationRequest::recipe([
                "tomato", "onion", "garlic", "basil", "pasta", "parmesan",
            ]),
            prompt_must_contain: vec!["- tomato\n- onion\n- garlic\n- basil\n- pasta\n- parmesan"],
            prompt_must_not_contain: vec!["{ingredients}"],
        },
        GoldenCase {
            name: "ingredient_with_quantity",
            request: GenerationRequest::recipe(["2 carrots", "half a cabbage"]),
            prompt_must_contain: vec!["- 2 carrots", "- half a cabbage"],
            prompt_must_not_contain: vec!["{ingredients}"],
        },
        GoldenCase {
            name: "stale_bread",
            request: GenerationRequest::tip("sourdough bread", Some(date(2026, 12, 31))),
            prompt_must_contain: vec!["sourdough bread", "2026-12-31"],
            prompt_must_not_contain: vec!["{subject}", "{expiry_note}"],
        },
    ]
}

// ---------------------------------------------------------------------------
// Offline Tests: Template Rendering Validation
// ---------------------------------------------------------------------------

#[test]
fn golden_prompts_render_without_unresolved_vars() {
    let prompts = PromptSet::builtin();

    for case in golden_cases() {
        let rendered = prompts.build(&case.request);

        for needle in &case.prompt_must_contain {
            assert!(
                rendered.user.contains(needle),
                "Golden case '{}': rendered prompt must contain '{}' but doesn't.\nRendered:\n{}",
                case.name,
                needle,
                rendered.user
            );
        }

        for needle in &case.prompt_must_not_contain {
            assert!(
                !rendered.user.contains(needle) && !rendered.system.contains(needle),
                "Golden case '{}': rendered prompt must NOT contain '{}' but does.\nRendered:\n{}\n{}",
                case.name,
                needle,
                rendered.system,
                rendered.user
            );
        }
    }
}

#[test]
fn substituted_values_are_not_rendered_again() {
    let prompts = PromptSet::builtin();
    let rendered = prompts.build(&GenerationRequest::tip(
        "jam {expiry_note} {subject}",
        Some(date(2026, 3, 14)),
    ));

    assert!(rendered.user.contains("jam {expiry_note} {subject}"));
    assert_eq!(rendered.user.matches("It expires on").count(), 1);
}

#[test]
fn golden_set_has_minimum_coverage() {
    let cases = golden_cases();
    assert!(
        cases.len() >= 10,
        "Golden set must have at least 10 test cases, got {}",
        cases.len()
    );
}

#[test]
fn recipe_prompts_have_json_output_instruction() {
    for template in [prompt::RECIPE_SYSTEM, prompt::RECIPE_USER] {
        assert!(template.contains("JSON"), "recipe prompt must ask for JSON");
    }
}

#[test]
fn system_prompts_have_role_instruction() {
    for (name, template) in [("tip", prompt::TIP_SYSTEM), ("recipe", prompt::RECIPE_SYSTEM)] {
        assert!(
            template.contains("You are"),
            "System prompt '{name}' must establish a role with 'You are'"
        );
    }
}

#[test]
fn tip_prompts_do_not_ask_for_json() {
    assert!(!prompt::TIP_SYSTEM.contains("JSON"));
    assert!(!prompt::TIP_USER.contains("JSON"));
}

// ---------------------------------------------------------------------------
// Online Eval (opt-in): needs a running Ollama
// ---------------------------------------------------------------------------

#[tokio::test]
async fn online_golden_requests_produce_usable_values() {
    if std::env::var("LARDER_EVAL_LLM").as_deref() != Ok("1") {
        return;
    }

    use std::sync::Arc;
    use std::time::Duration;

    use larder_llm::{LlmClient, LlmProvider, ResilientGenerator, RetryPolicy, TemplateFallback};

    let client = LlmClient::new(
        LlmProvider::Ollama {
            base_url: "http://localhost:11434".into(),
        },
        "qwen2.5:1.5b",
        400,
        0.7,
    );
    let generator = ResilientGenerator::new(Arc::new(client), Arc::new(TemplateFallback::new()));
    let policy = RetryPolicy::new(2, Duration::from_secs(30));

    for case in golden_cases() {
        let result = generator
            .generate(&case.request, &policy)
            .await
            .expect("fallback never fails");
        assert_eq!(result.value.shape(), case.request.shape(), "case '{}'", case.name);
        if result.used_fallback {
            eprintln!("case '{}' fell back after {} attempts", case.name, result.attempts);
        }
    }
}

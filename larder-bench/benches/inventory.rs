//! larder benchmark suite
//!
//! Targets:
//!   feed_build_300_entries ........... < 200μs
//!   search_foods_1000_items .......... < 2ms
//!   generate_fallback_after_2_fails .. < 50μs

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;

use larder_core::Store;
use larder_core::notifications::build_feed;
use larder_core::types::{
    FoodItem, NewFoodItem, Role, StoredSuggestion, SuggestionId, SuggestionKind, User, UserId,
};
use larder_llm::{
    GenerationRequest, GenerationService, LlmError, OutputShape, Prompt, ResilientGenerator,
    RetryPolicy, TemplateFallback,
};

const NAMES: [&str; 8] = [
    "spinach", "milk", "yogurt", "rice", "chicken", "carrots", "bread", "cheddar",
];

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).expect("valid date")
}

fn make_food(owner: UserId, i: u64) -> FoodItem {
    let expiry = if i % 2 == 0 {
        today() + Days::new(i % 30)
    } else {
        today() - Days::new(i % 30 + 1)
    };
    NewFoodItem {
        name: format!("{} #{i}", NAMES[(i % 8) as usize]),
        category: "produce".into(),
        quantity: 1.0,
        unit: "pcs".into(),
        expiry_date: expiry,
    }
    .into_item(owner)
}

/// Benchmark: merge 100 expiring, 100 expired, 100 suggestions (target: < 200μs).
fn bench_feed(c: &mut Criterion) {
    let owner = UserId::new();
    let expiring: Vec<FoodItem> = (0..100).map(|i| make_food(owner, i * 2)).collect();
    let expired: Vec<FoodItem> = (0..100).map(|i| make_food(owner, i * 2 + 1)).collect();
    let suggestions: Vec<StoredSuggestion> = (0..100)
        .map(|i| StoredSuggestion {
            id: SuggestionId::new(),
            owner,
            food_id: None,
            kind: if i % 2 == 0 {
                SuggestionKind::Tip
            } else {
                SuggestionKind::Recipe
            },
            payload: if i % 2 == 0 {
                json!(format!("Keep item {i} cold."))
            } else {
                json!({ "title": format!("Dish {i}"), "ingredients": ["egg"], "instructions": ["Cook."] })
            },
            used_fallback: i % 3 == 0,
            created_at: Utc::now(),
        })
        .collect();

    c.bench_function("feed_build_300_entries", |b| {
        b.iter(|| {
            let feed = build_feed(
                black_box(&expiring),
                black_box(&expired),
                black_box(&suggestions),
                today(),
            );
            black_box(feed);
        });
    });
}

/// Benchmark: substring search over 1000 items (target: < 2ms).
fn bench_search(c: &mut Criterion) {
    let store = Store::open_in_memory().expect("store");
    let user = User::new("bench@example.com", "Bench", Role::User);
    store.insert_user(&user).expect("user");
    for i in 0..1000 {
        store.insert_food(&make_food(user.id, i)).expect("food");
    }

    c.bench_function("search_foods_1000_items", |b| {
        b.iter(|| {
            let hits = store.search_foods(user.id, black_box("spin")).expect("search");
            black_box(hits);
        });
    });
}

struct AlwaysDown;

#[async_trait]
impl GenerationService for AlwaysDown {
    async fn complete(&self, _: &Prompt, _: OutputShape, _: Duration) -> Result<String, LlmError> {
        Err(LlmError::Unavailable("bench".into()))
    }
}

/// Benchmark: two failed attempts then the template fallback (target: < 50μs).
fn bench_fallback_path(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime");
    let generator = ResilientGenerator::new(Arc::new(AlwaysDown), Arc::new(TemplateFallback::seeded(1)));
    let policy = RetryPolicy::new(2, Duration::from_secs(1));
    let request = GenerationRequest::recipe(["egg", "rice", "scallions"]);

    c.bench_function("generate_fallback_after_2_fails", |b| {
        b.iter(|| {
            let result = runtime
                .block_on(generator.generate(black_box(&request), &policy))
                .expect("fallback");
            black_box(result);
        });
    });
}

criterion_group!(benches, bench_feed, bench_search, bench_fallback_path);
criterion_main!(benches);

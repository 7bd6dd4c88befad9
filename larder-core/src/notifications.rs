//! Notification feed: three query results merged into one date-sorted list.
//!
//! The feed is built from:
//! - items expiring within the configured window,
//! - items already past their expiry date,
//! - tips and recipes generated recently.
//!
//! Entries are sorted newest date first. On equal dates the
//! [`NotificationKind`] order applies (expired, expiring soon, suggestion),
//! and the sort is stable, so entries of the same kind and date keep the
//! order their query returned them in.

use chrono::NaiveDate;

use crate::types::{FoodItem, Notification, NotificationKind, StoredSuggestion, SuggestionKind};

/// Build the feed for one user.
#[must_use]
pub fn build_feed(
    expiring: &[FoodItem],
    expired: &[FoodItem],
    suggestions: &[StoredSuggestion],
    today: NaiveDate,
) -> Vec<Notification> {
    let mut feed: Vec<Notification> =
        Vec::with_capacity(expiring.len() + expired.len() + suggestions.len());

    feed.extend(expiring.iter().map(|item| expiring_entry(item, today)));
    feed.extend(expired.iter().map(|item| expired_entry(item, today)));
    feed.extend(suggestions.iter().map(suggestion_entry));

    feed.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.kind.cmp(&b.kind)));
    feed
}

fn expiring_entry(item: &FoodItem, today: NaiveDate) -> Notification {
    let days = item.days_until_expiry(today);
    let message = match days {
        0 => format!("{} expires today.", item.name),
        1 => format!("{} expires tomorrow.", item.name),
        n => format!("{} expires in {n} days.", item.name),
    };
    Notification {
        kind: NotificationKind::ExpiringSoon,
        title: format!("{} is expiring soon", item.name),
        message,
        date: item.expiry_date,
        food_id: Some(item.id),
    }
}

fn expired_entry(item: &FoodItem, today: NaiveDate) -> Notification {
    let days = -item.days_until_expiry(today);
    let message = if days == 1 {
        format!("{} expired yesterday.", item.name)
    } else {
        format!("{} expired {days} days ago.", item.name)
    };
    Notification {
        kind: NotificationKind::Expired,
        title: format!("{} has expired", item.name),
        message,
        date: item.expiry_date,
        food_id: Some(item.id),
    }
}

fn suggestion_entry(suggestion: &StoredSuggestion) -> Notification {
    let (title, message) = match suggestion.kind {
        SuggestionKind::Tip => (
            "New storage tip".to_string(),
            suggestion
                .payload
                .as_str()
                .unwrap_or("A storage tip is ready.")
                .to_string(),
        ),
        SuggestionKind::Recipe => {
            let recipe_title = suggestion
                .payload
                .get("title")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("a new recipe");
            ("New recipe idea".to_string(), format!("Try {recipe_title}."))
        }
    };
    Notification {
        kind: NotificationKind::Suggestion,
        title,
        message,
        date: suggestion.created_at.date_naive(),
        food_id: suggestion.food_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewFoodItem, SuggestionId, UserId};
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn food(name: &str, expiry: NaiveDate) -> FoodItem {
        NewFoodItem {
            name: name.into(),
            category: String::new(),
            quantity: 1.0,
            unit: String::new(),
            expiry_date: expiry,
        }
        .into_item(UserId::new())
    }

    fn recipe(title: &str, day: u32) -> StoredSuggestion {
        StoredSuggestion {
            id: SuggestionId::new(),
            owner: UserId::new(),
            food_id: None,
            kind: SuggestionKind::Recipe,
            payload: serde_json::json!({"title": title, "ingredients": ["egg"], "instructions": ["cook"]}),
            used_fallback: false,
            created_at: Utc
                .with_ymd_and_hms(2026, 3, day, 12, 0, 0)
                .single()
                .expect("valid time"),
        }
    }

    #[test]
    fn merges_three_sources_newest_first() {
        let today = date(2026, 3, 10);
        let expiring = vec![food("milk", date(2026, 3, 12)), food("cheese", date(2026, 3, 10))];
        let expired = vec![food("yogurt", date(2026, 3, 7))];
        let suggestions = vec![recipe("Egg fried rice", 9)];

        let feed = build_feed(&expiring, &expired, &suggestions, today);
        let dates: Vec<NaiveDate> = feed.iter().map(|n| n.date).collect();
        assert_eq!(
            dates,
            vec![date(2026, 3, 12), date(2026, 3, 10), date(2026, 3, 9), date(2026, 3, 7)]
        );
        assert_eq!(feed[2].kind, NotificationKind::Suggestion);
        assert_eq!(feed[2].message, "Try Egg fried rice.");
    }

    #[test]
    fn same_date_ties_follow_kind_order() {
        let today = date(2026, 3, 10);
        let expiring = vec![food("milk", date(2026, 3, 9))];
        let expired = vec![food("bread", date(2026, 3, 9))];
        let suggestions = vec![recipe("Toast", 9)];

        let feed = build_feed(&expiring, &expired, &suggestions, today);
        let kinds: Vec<NotificationKind> = feed.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NotificationKind::Expired,
                NotificationKind::ExpiringSoon,
                NotificationKind::Suggestion
            ]
        );
    }

    #[test]
    fn expiry_messages() {
        let today = date(2026, 3, 10);
        let feed = build_feed(
            &[food("milk", today), food("eggs", date(2026, 3, 11))],
            &[food("ham", date(2026, 3, 9)), food("fish", date(2026, 3, 6))],
            &[],
            today,
        );
        let messages: Vec<&str> = feed.iter().map(|n| n.message.as_str()).collect();
        assert!(messages.contains(&"milk expires today."));
        assert!(messages.contains(&"eggs expires tomorrow."));
        assert!(messages.contains(&"ham expired yesterday."));
        assert!(messages.contains(&"fish expired 4 days ago."));
    }

    #[test]
    fn empty_inputs_give_empty_feed() {
        assert!(build_feed(&[], &[], &[], date(2026, 1, 1)).is_empty());
    }
}

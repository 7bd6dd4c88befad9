//! Core type definitions for the larder inventory.
//!
//! All types are serializable so they can be stored as JSON columns or handed
//! straight to an API layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Unique identifier for a household member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Create a new random user ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a food item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FoodId(pub Uuid);

impl FoodId {
    /// Create a new random food ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FoodId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a stored AI suggestion (tip or recipe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SuggestionId(pub Uuid);

impl SuggestionId {
    /// Create a new random suggestion ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SuggestionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FoodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SuggestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Access level of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular household member. Sees only their own items.
    #[default]
    User,
    /// Can manage users and see every item.
    Admin,
}

impl Role {
    /// Stable string form used in the database.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Parse the database string form. Unknown values map to `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique ID.
    pub id: UserId,
    /// Login email, unique across users.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Access level.
    pub role: Role,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a fresh ID, registered now.
    #[must_use]
    pub fn new(email: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId::new(),
            email: email.into(),
            name: name.into(),
            role,
            created_at: Utc::now(),
        }
    }

    /// Whether this user has admin rights.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// ---------------------------------------------------------------------------
// Food items
// ---------------------------------------------------------------------------

/// A free-form note attached to a food item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Note text.
    pub text: String,
    /// When the note was appended.
    pub added_at: DateTime<Utc>,
}

/// A tracked item in the household inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    /// Unique ID.
    pub id: FoodId,
    /// Owning user.
    pub owner: UserId,
    /// Item name (e.g. "spinach").
    pub name: String,
    /// Free-form category (e.g. "vegetables").
    pub category: String,
    /// Amount on hand.
    pub quantity: f64,
    /// Unit for `quantity` (e.g. "g", "pcs").
    pub unit: String,
    /// Best-before / use-by date.
    pub expiry_date: NaiveDate,
    /// When the item was added.
    pub added_at: DateTime<Utc>,
    /// Appended notes, oldest first.
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl FoodItem {
    /// Days until expiry relative to `today`. Negative once expired.
    #[must_use]
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        (self.expiry_date - today).num_days()
    }

    /// Whether the item expired strictly before `today`.
    #[must_use]
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date < today
    }
}

/// Input for creating a food item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFoodItem {
    /// Item name.
    pub name: String,
    /// Category.
    #[serde(default)]
    pub category: String,
    /// Amount on hand.
    pub quantity: f64,
    /// Unit for `quantity`.
    #[serde(default)]
    pub unit: String,
    /// Expiry date.
    pub expiry_date: NaiveDate,
}

impl NewFoodItem {
    /// Turn the input into a stored item owned by `owner`.
    #[must_use]
    pub fn into_item(self, owner: UserId) -> FoodItem {
        FoodItem {
            id: FoodId::new(),
            owner,
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            quantity: self.quantity,
            unit: self.unit.trim().to_string(),
            expiry_date: self.expiry_date,
            added_at: Utc::now(),
            notes: Vec::new(),
        }
    }
}

/// Partial update for a food item. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodUpdate {
    /// New name.
    pub name: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// New quantity.
    pub quantity: Option<f64>,
    /// New unit.
    pub unit: Option<String>,
    /// New expiry date.
    pub expiry_date: Option<NaiveDate>,
}

impl FoodUpdate {
    /// Whether the update touches no field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.quantity.is_none()
            && self.unit.is_none()
            && self.expiry_date.is_none()
    }

    /// Apply the update in place.
    pub fn apply(self, item: &mut FoodItem) {
        if let Some(name) = self.name {
            item.name = name.trim().to_string();
        }
        if let Some(category) = self.category {
            item.category = category.trim().to_string();
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(unit) = self.unit {
            item.unit = unit.trim().to_string();
        }
        if let Some(expiry_date) = self.expiry_date {
            item.expiry_date = expiry_date;
        }
    }
}

// ---------------------------------------------------------------------------
// Suggestions
// ---------------------------------------------------------------------------

/// What kind of AI suggestion was stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    /// Free-text storage tip for one item.
    Tip,
    /// Structured recipe built from a list of ingredients.
    Recipe,
}

impl SuggestionKind {
    /// Stable string form used in the database.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tip => "tip",
            Self::Recipe => "recipe",
        }
    }

    /// Parse the database string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tip" => Some(Self::Tip),
            "recipe" => Some(Self::Recipe),
            _ => None,
        }
    }
}

/// A persisted tip or recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSuggestion {
    /// Unique ID.
    pub id: SuggestionId,
    /// User the suggestion was generated for.
    pub owner: UserId,
    /// Item the suggestion is about, for tips.
    pub food_id: Option<FoodId>,
    /// Tip or recipe.
    pub kind: SuggestionKind,
    /// The generated value as JSON (a string for tips, a record for recipes).
    pub payload: serde_json::Value,
    /// Whether the value came from the canned fallback set.
    pub used_fallback: bool,
    /// When it was stored.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Category of a feed entry. Declaration order is the tie-break order
/// within a single date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// An item already went past its expiry date.
    Expired,
    /// An item expires within the configured window.
    ExpiringSoon,
    /// A tip or recipe was generated.
    Suggestion,
}

/// One entry in a user's notification feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Category.
    pub kind: NotificationKind,
    /// Short headline.
    pub title: String,
    /// Longer message.
    pub message: String,
    /// Date the entry is sorted by.
    pub date: NaiveDate,
    /// Related item, if any.
    pub food_id: Option<FoodId>,
}

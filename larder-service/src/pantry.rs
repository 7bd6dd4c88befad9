//! The pantry: every user-facing operation, with access checks.
//!
//! `Pantry` owns the store and the generator. Store calls are synchronous
//! and run under a `parking_lot::Mutex`; the lock is never held across an
//! `.await`, so a slow model call does not block inventory reads.

use std::sync::Arc;

use chrono::{Days, NaiveDate, NaiveTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, instrument};

use larder_core::config::{InventoryConfig, LarderConfig};
use larder_core::notifications::build_feed;
use larder_core::types::{
    FoodId, FoodItem, FoodUpdate, NewFoodItem, Note, Notification, Role, StoredSuggestion,
    SuggestionId, SuggestionKind, User, UserId,
};
use larder_core::{CoreError, Store, validation};
use larder_llm::{
    GenerationRequest, GenerationResult, LlmClient, ResilientGenerator, RetryPolicy,
    TemplateFallback,
};

use crate::access::{Principal, TokenVerifier, require_admin, require_owner_or_admin};
use crate::error::{Result, ServiceError};

/// Food inventory with AI storage tips and recipes.
pub struct Pantry {
    store: Mutex<Store>,
    generator: ResilientGenerator,
    policy: RetryPolicy,
    inventory: InventoryConfig,
    verifier: Arc<dyn TokenVerifier>,
}

impl std::fmt::Debug for Pantry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pantry")
            .field("generator", &self.generator)
            .field("policy", &self.policy)
            .field("inventory", &self.inventory)
            .finish_non_exhaustive()
    }
}

impl Pantry {
    /// Assemble a pantry from its parts.
    #[must_use]
    pub fn new(
        store: Store,
        generator: ResilientGenerator,
        policy: RetryPolicy,
        inventory: InventoryConfig,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            store: Mutex::new(store),
            generator,
            policy,
            inventory,
            verifier,
        }
    }

    /// Open the database and build the LLM client from configuration.
    ///
    /// # Errors
    /// Database open failures, or `CoreError::Config` for a bad LLM section.
    pub fn from_config(config: &LarderConfig, verifier: Arc<dyn TokenVerifier>) -> Result<Self> {
        let store = Store::open(&config.persistence.db_path, &config.persistence)?;
        let client = LlmClient::from_config(&config.llm)
            .map_err(|e| CoreError::Config(e.to_string()))?;
        if !client.is_available() {
            info!("No LLM provider configured, every suggestion will use the fallback templates");
        }
        let generator = ResilientGenerator::new(Arc::new(client), Arc::new(TemplateFallback::new()))
            .with_concurrency_limit(config.llm.max_concurrent_calls);

        Ok(Self::new(
            store,
            generator,
            RetryPolicy::from(&config.llm),
            config.inventory.clone(),
            verifier,
        ))
    }

    // ------------------------------------------------------------------
    // Identity & users
    // ------------------------------------------------------------------

    /// Resolve a bearer token to a principal, with the role as currently
    /// stored.
    ///
    /// # Errors
    /// [`ServiceError::Unauthorized`] for a bad token or a deleted user.
    pub async fn authenticate(&self, token: &str) -> Result<Principal> {
        let user_id = self.verifier.verify(token).await?;
        let user = self
            .store
            .lock()
            .get_user(user_id)?
            .ok_or_else(|| ServiceError::Unauthorized("user no longer exists".into()))?;
        Ok(Principal {
            user: user.id,
            role: user.role,
        })
    }

    /// Create a regular user account.
    ///
    /// # Errors
    /// Validation failure for the email or name, or `Conflict` if the email
    /// is taken.
    pub fn register_user(&self, email: &str, name: &str) -> Result<User> {
        let email = validation::validate_email(email)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("name must not be empty".into()).into());
        }
        let user = User::new(email, name, Role::User);
        self.store.lock().insert_user(&user)?;
        info!(user = %user.id, "Registered user");
        Ok(user)
    }

    /// Load a user. Users may read themselves; admins may read anyone.
    ///
    /// # Errors
    /// `Forbidden`, or `UserNotFound`.
    pub fn get_user(&self, principal: &Principal, id: UserId) -> Result<User> {
        require_owner_or_admin(principal, id)?;
        Ok(self
            .store
            .lock()
            .get_user(id)?
            .ok_or(CoreError::UserNotFound(id))?)
    }

    /// All users. Admin only.
    ///
    /// # Errors
    /// `Forbidden` for non-admins.
    pub fn list_users(&self, principal: &Principal) -> Result<Vec<User>> {
        require_admin(principal)?;
        Ok(self.store.lock().list_users()?)
    }

    /// Grant or revoke the admin role. Admin only.
    ///
    /// # Errors
    /// `Forbidden` for non-admins, `UserNotFound` for an unknown target.
    pub fn set_role(&self, principal: &Principal, id: UserId, role: Role) -> Result<User> {
        require_admin(principal)?;
        let user = self.store.lock().update_user_role(id, role)?;
        info!(user = %id, role = %role, by = %principal.user, "Changed role");
        Ok(user)
    }

    /// Delete a user and everything they own. Admin only; admins cannot
    /// delete themselves.
    ///
    /// # Errors
    /// `Forbidden`, `Conflict` for self-deletion, `UserNotFound`.
    pub fn delete_user(&self, principal: &Principal, id: UserId) -> Result<()> {
        require_admin(principal)?;
        if principal.user == id {
            return Err(CoreError::Conflict("admins cannot delete their own account".into()).into());
        }
        if !self.store.lock().delete_user(id)? {
            return Err(CoreError::UserNotFound(id).into());
        }
        info!(user = %id, by = %principal.user, "Deleted user");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Food items
    // ------------------------------------------------------------------

    /// Add an item owned by the caller.
    ///
    /// # Errors
    /// Validation or database failures.
    pub fn add_food(&self, principal: &Principal, item: NewFoodItem) -> Result<FoodItem> {
        validation::validate_new_food(&item)?;
        let item = item.into_item(principal.user);
        self.store.lock().insert_food(&item)?;
        Ok(item)
    }

    /// Load one item.
    ///
    /// # Errors
    /// `FoodNotFound`, or `Forbidden` if the caller does not own it.
    pub fn get_food(&self, principal: &Principal, id: FoodId) -> Result<FoodItem> {
        let item = self
            .store
            .lock()
            .get_food(id)?
            .ok_or(CoreError::FoodNotFound(id))?;
        require_owner_or_admin(principal, item.owner)?;
        Ok(item)
    }

    /// The caller's items; for admins, every item.
    ///
    /// # Errors
    /// Database failures.
    pub fn list_foods(&self, principal: &Principal) -> Result<Vec<FoodItem>> {
        let store = self.store.lock();
        let items = if principal.is_admin() {
            store.list_all_foods()?
        } else {
            store.list_foods(principal.user)?
        };
        Ok(items)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    /// Validation, `FoodNotFound`, or `Forbidden`.
    pub fn update_food(
        &self,
        principal: &Principal,
        id: FoodId,
        update: FoodUpdate,
    ) -> Result<FoodItem> {
        validation::validate_food_update(&update)?;
        let store = self.store.lock();
        let item = store.get_food(id)?.ok_or(CoreError::FoodNotFound(id))?;
        require_owner_or_admin(principal, item.owner)?;
        Ok(store.update_food(id, update)?)
    }

    /// Delete an item.
    ///
    /// # Errors
    /// `FoodNotFound` or `Forbidden`.
    pub fn delete_food(&self, principal: &Principal, id: FoodId) -> Result<()> {
        let store = self.store.lock();
        let item = store.get_food(id)?.ok_or(CoreError::FoodNotFound(id))?;
        require_owner_or_admin(principal, item.owner)?;
        store.delete_food(id)?;
        debug!(food = %id, by = %principal.user, "Deleted food item");
        Ok(())
    }

    /// Append a note to an item.
    ///
    /// # Errors
    /// Validation, `FoodNotFound`, or `Forbidden`.
    pub fn add_note(&self, principal: &Principal, id: FoodId, text: &str) -> Result<FoodItem> {
        let text = validation::validate_note(text)?;
        let store = self.store.lock();
        let item = store.get_food(id)?.ok_or(CoreError::FoodNotFound(id))?;
        require_owner_or_admin(principal, item.owner)?;
        Ok(store.append_note(
            id,
            Note {
                text,
                added_at: Utc::now(),
            },
        )?)
    }

    /// Search the caller's items by name or category.
    ///
    /// # Errors
    /// Validation failure for a blank query.
    pub fn search(&self, principal: &Principal, query: &str) -> Result<Vec<FoodItem>> {
        if query.trim().is_empty() {
            return Err(CoreError::Validation("search query must not be empty".into()).into());
        }
        Ok(self.store.lock().search_foods(principal.user, query)?)
    }

    /// The caller's items expiring from `today` through the configured window.
    ///
    /// # Errors
    /// Database failures.
    pub fn nearly_expiring(&self, principal: &Principal, today: NaiveDate) -> Result<Vec<FoodItem>> {
        Ok(self.store.lock().nearly_expiring(
            principal.user,
            today,
            self.inventory.nearly_expiring_days,
        )?)
    }

    /// The caller's items already past their expiry date.
    ///
    /// # Errors
    /// Database failures.
    pub fn wasted(&self, principal: &Principal, today: NaiveDate) -> Result<Vec<FoodItem>> {
        Ok(self.store.lock().wasted(principal.user, today)?)
    }

    // ------------------------------------------------------------------
    // Suggestions
    // ------------------------------------------------------------------

    /// Generate a storage tip for one item and store it for the caller.
    ///
    /// The result is stored exactly once, fallback or not.
    ///
    /// # Errors
    /// `FoodNotFound`, `Forbidden`, or a fallback-provider defect.
    #[instrument(skip(self, principal), fields(user = %principal.user))]
    pub async fn storage_tip(&self, principal: &Principal, food_id: FoodId) -> Result<GenerationResult> {
        let item = self.get_food(principal, food_id)?;
        let subject = validation::validate_subject(&item.name)?;
        let request = GenerationRequest::tip(subject, Some(item.expiry_date));

        let result = self.generator.generate(&request, &self.policy).await?;
        self.persist(principal.user, Some(food_id), SuggestionKind::Tip, &result)?;
        Ok(result)
    }

    /// Generate a recipe from `ingredients` and store it for the caller.
    ///
    /// The result is stored exactly once, fallback or not.
    ///
    /// # Errors
    /// Validation failure for an empty list, or a fallback-provider defect.
    #[instrument(skip(self, principal, ingredients), fields(user = %principal.user))]
    pub async fn recipe(&self, principal: &Principal, ingredients: &[String]) -> Result<GenerationResult> {
        let ingredients = validation::validate_ingredients(ingredients)?;
        let request = GenerationRequest::Recipe { ingredients };

        let result = self.generator.generate(&request, &self.policy).await?;
        self.persist(principal.user, None, SuggestionKind::Recipe, &result)?;
        Ok(result)
    }

    fn persist(
        &self,
        owner: UserId,
        food_id: Option<FoodId>,
        kind: SuggestionKind,
        result: &GenerationResult,
    ) -> Result<()> {
        let suggestion = StoredSuggestion {
            id: SuggestionId::new(),
            owner,
            food_id,
            kind,
            payload: serde_json::to_value(&result.value).map_err(CoreError::from)?,
            used_fallback: result.used_fallback,
            created_at: Utc::now(),
        };
        self.store.lock().insert_suggestion(&suggestion)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    /// The caller's feed: expiring items, expired items, and suggestions
    /// from the lookback window, newest date first.
    ///
    /// # Errors
    /// Database failures.
    pub fn notifications(&self, principal: &Principal, today: NaiveDate) -> Result<Vec<Notification>> {
        let since = today
            .checked_sub_days(Days::new(u64::from(self.inventory.suggestion_lookback_days)))
            .unwrap_or(NaiveDate::MIN)
            .and_time(NaiveTime::MIN)
            .and_utc();

        let store = self.store.lock();
        let expiring =
            store.nearly_expiring(principal.user, today, self.inventory.nearly_expiring_days)?;
        let expired = store.wasted(principal.user, today)?;
        let suggestions = store.recent_suggestions(principal.user, since)?;
        drop(store);

        Ok(build_feed(&expiring, &expired, &suggestions, today))
    }
}

//! Input validation run before anything reaches the store or the generator.
//!
//! Every check returns [`CoreError::Validation`] with a message fit for an
//! end user.

use crate::error::{CoreError, Result};
use crate::types::{FoodUpdate, NewFoodItem};

/// Longest note accepted by [`validate_note`], in characters.
pub const MAX_NOTE_CHARS: usize = 500;

/// Check a new food item: non-empty name, positive finite quantity.
///
/// # Errors
/// Returns `CoreError::Validation` describing the first failing field.
pub fn validate_new_food(item: &NewFoodItem) -> Result<()> {
    if item.name.trim().is_empty() {
        return Err(CoreError::Validation("food name must not be empty".into()));
    }
    validate_quantity(item.quantity)
}

/// Check a partial update. Only present fields are validated.
///
/// # Errors
/// Returns `CoreError::Validation` if the update is empty or a field is invalid.
pub fn validate_food_update(update: &FoodUpdate) -> Result<()> {
    if update.is_empty() {
        return Err(CoreError::Validation("update contains no fields".into()));
    }
    if let Some(name) = &update.name {
        if name.trim().is_empty() {
            return Err(CoreError::Validation("food name must not be empty".into()));
        }
    }
    if let Some(quantity) = update.quantity {
        validate_quantity(quantity)?;
    }
    Ok(())
}

fn validate_quantity(quantity: f64) -> Result<()> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(CoreError::Validation(format!(
            "quantity must be a positive number, got {quantity}"
        )));
    }
    Ok(())
}

/// Check the subject of a storage-tip request and return it trimmed.
///
/// # Errors
/// Returns `CoreError::Validation` if the subject is blank.
pub fn validate_subject(subject: &str) -> Result<String> {
    let trimmed = subject.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("subject must not be empty".into()));
    }
    Ok(trimmed.to_string())
}

/// Check a recipe ingredient list.
///
/// Blank entries are dropped and the rest trimmed, preserving order.
///
/// # Errors
/// Returns `CoreError::Validation` if no non-blank ingredient remains.
pub fn validate_ingredients(ingredients: &[String]) -> Result<Vec<String>> {
    let cleaned: Vec<String> = ingredients
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .map(str::to_string)
        .collect();

    if cleaned.is_empty() {
        return Err(CoreError::Validation(
            "at least one ingredient is required".into(),
        ));
    }
    Ok(cleaned)
}

/// Minimal email shape check: exactly one `@` with text on both sides.
///
/// # Errors
/// Returns `CoreError::Validation` on a malformed address.
pub fn validate_email(email: &str) -> Result<String> {
    let trimmed = email.trim();
    let mut parts = trimmed.split('@');
    let ok = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty()
    );
    if !ok {
        return Err(CoreError::Validation(format!("invalid email address: '{trimmed}'")));
    }
    Ok(trimmed.to_lowercase())
}

/// Check a note before it is appended.
///
/// # Errors
/// Returns `CoreError::Validation` if the note is blank or too long.
pub fn validate_note(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("note must not be empty".into()));
    }
    let chars = trimmed.chars().count();
    if chars > MAX_NOTE_CHARS {
        return Err(CoreError::Validation(format!(
            "note is {chars} characters, limit is {MAX_NOTE_CHARS}"
        )));
    }
    Ok(trimmed.to_string())
}

//! # Larder Core Library
//!
//! Household food inventory and expiry tracking.
//!
//! - **Types**: users with a minimal admin role, food items with notes,
//!   stored AI suggestions, notification entries.
//! - **Validation**: input checks run before the store or the generator.
//! - **Persistence**: an SQLite [`Store`] with CRUD, text search and
//!   expiry-range queries.
//! - **Notifications**: the per-user feed merged from three queries.
//!
//! AI generation lives in `larder-llm`; `larder-service` wires the two
//! together.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod notifications;
pub mod persistence;
pub mod types;
pub mod validation;

pub use config::LarderConfig;
pub use error::CoreError;
pub use persistence::Store;
pub use types::*;

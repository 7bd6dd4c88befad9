//! # larder-service: the inventory backend's integration layer
//!
//! Wires `larder-core` (store, validation, feed) to `larder-llm` (resilient
//! generation) behind per-user access checks.
//!
//! ## Architecture
//!
//! ```text
//! token ──► access::TokenVerifier ──► Principal
//!                                        │
//!                                        ▼
//!                                  pantry::Pantry
//!                            ┌───────────┴────────────┐
//!                            ▼                        ▼
//!                 larder-core: Store, feed   larder-llm: ResilientGenerator
//! ```
//!
//! ## Modules
//!
//! - `access`: principals, token verification, role checks
//! - `pantry`: food CRUD, search, expiry queries, tips, recipes, feed
//! - `telemetry`: tracing subscriber setup
//! - `error`: [`ServiceError`]

pub mod access;
pub mod error;
pub mod pantry;
pub mod telemetry;

pub use access::{Principal, StaticTokens, TokenVerifier};
pub use error::ServiceError;
pub use pantry::Pantry;

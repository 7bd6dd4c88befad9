//! Who is calling, and what they may touch.
//!
//! Token verification is delegated to an external identity provider through
//! [`TokenVerifier`]. Roles are not taken from the token: they are loaded
//! from the store on every [`crate::pantry::Pantry::authenticate`], so a role
//! change applies on the next request.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use larder_core::types::{Role, UserId};

use crate::error::{Result, ServiceError};

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    /// The caller's user ID.
    pub user: UserId,
    /// The caller's role at authentication time.
    pub role: Role,
}

impl Principal {
    /// Whether the caller holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Resolves a bearer token to a user ID.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify `token`.
    ///
    /// # Errors
    /// [`ServiceError::Unauthorized`] for unknown, expired, or malformed tokens.
    async fn verify(&self, token: &str) -> Result<UserId>;
}

/// In-memory token table, for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct StaticTokens {
    tokens: RwLock<HashMap<String, UserId>>,
}

impl StaticTokens {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `token` for `user`, replacing any previous binding.
    pub fn insert(&self, token: impl Into<String>, user: UserId) {
        self.tokens.write().insert(token.into(), user);
    }

    /// Forget `token`. Returns whether it was present.
    pub fn revoke(&self, token: &str) -> bool {
        self.tokens.write().remove(token).is_some()
    }
}

#[async_trait]
impl TokenVerifier for StaticTokens {
    async fn verify(&self, token: &str) -> Result<UserId> {
        self.tokens
            .read()
            .get(token)
            .copied()
            .ok_or_else(|| ServiceError::Unauthorized("unknown token".into()))
    }
}

/// Allow only admins.
///
/// # Errors
/// [`ServiceError::Forbidden`] for non-admins.
pub fn require_admin(principal: &Principal) -> Result<()> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden("admin role required".into()))
    }
}

/// Allow the owner of a resource, or any admin.
///
/// # Errors
/// [`ServiceError::Forbidden`] for anyone else.
pub fn require_owner_or_admin(principal: &Principal, owner: UserId) -> Result<()> {
    if principal.user == owner || principal.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden("not the owner of this item".into()))
    }
}

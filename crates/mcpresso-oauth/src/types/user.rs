//! Resource-owner domain type.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A resource owner on whose behalf tokens are issued.
///
/// Login flows, MFA, and consent UI are the embedding application's
/// concern; the engine reads identity and scope eligibility only. The
/// optional password hash is carried so the embedding application can
/// verify credentials through [`User::verify_password`] without a second
/// user store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier.
    pub id: String,

    /// Login name.
    pub username: String,

    /// Contact email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Argon2id password hash in PHC format. `None` for users authenticated
    /// entirely outside the engine (SSO, etc.).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    /// Scopes this user is able to grant.
    /// Empty list means any scope may be granted.
    #[serde(default)]
    pub grantable_scopes: Vec<String>,

    /// When this user was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl User {
    /// Checks if the user can grant the given scope.
    ///
    /// An empty `grantable_scopes` list means any scope may be granted.
    #[must_use]
    pub fn can_grant_scope(&self, scope: &str) -> bool {
        if self.grantable_scopes.is_empty() {
            return true;
        }
        self.grantable_scopes.iter().any(|s| s == scope)
    }

    /// Checks that every space-delimited scope in `scope` can be granted.
    #[must_use]
    pub fn can_grant_scopes(&self, scope: &str) -> bool {
        scope.split_whitespace().all(|s| self.can_grant_scope(s))
    }

    /// Verifies a password against the stored Argon2id hash.
    ///
    /// Returns `Ok(false)` for users with no stored hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored hash is malformed.
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        match self.password_hash.as_deref() {
            Some(hash) => crate::secret::verify_secret(password, hash),
            None => Ok(false),
        }
    }
}

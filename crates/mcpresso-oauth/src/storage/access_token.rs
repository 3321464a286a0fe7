//! Access token storage trait.
//!
//! This module defines the storage interface for opaque access tokens.
//! Access tokens are validated by storage lookup, so revocation takes
//! effect immediately.

use async_trait::async_trait;
use uuid::Uuid;

use crate::types::access_token::AccessToken;
use crate::AuthResult;

/// Storage trait for access tokens.
///
/// Tokens are stored as SHA-256 hashes only.
#[async_trait]
pub trait AccessTokenStorage: Send + Sync {
    /// Stores a new access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be stored.
    async fn create(&self, token: &AccessToken) -> AuthResult<()>;

    /// Finds an access token by its hash.
    ///
    /// Returns `Some(token)` if found, `None` if not found.
    /// This returns tokens regardless of expiration/revocation status;
    /// callers should check `is_valid()` before using.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<AccessToken>>;

    /// Finds an access token by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<AccessToken>>;

    /// Revokes an access token.
    ///
    /// Sets the `revoked_at` timestamp to the current time. Revoking an
    /// already-revoked token is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not found or the operation fails.
    async fn revoke(&self, token_hash: &str) -> AuthResult<()>;

    /// Revokes all access tokens minted against a refresh token family.
    ///
    /// Returns the number of tokens revoked. Tokens without a family
    /// (issued standalone) are never matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    async fn revoke_family(&self, family_id: Uuid) -> AuthResult<u64>;

    /// Revokes all access tokens for a client.
    ///
    /// Returns the number of tokens revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    async fn revoke_by_client(&self, client_id: &str) -> AuthResult<u64>;

    /// Revokes all access tokens for a user.
    ///
    /// Returns the number of tokens revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    async fn revoke_by_user(&self, user_id: &str) -> AuthResult<u64>;

    /// Deletes expired and revoked tokens.
    ///
    /// Should be called periodically to clean up old tokens and prevent
    /// storage growth.
    ///
    /// Returns the number of tokens deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}

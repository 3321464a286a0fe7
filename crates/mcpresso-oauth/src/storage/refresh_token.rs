//! Refresh token storage trait.
//!
//! This module defines the storage interface for OAuth 2.1 refresh tokens.
//!
//! # Security Considerations
//!
//! - Tokens are stored as SHA-256 hashes only
//! - Rotation must be atomic (retire old, create new, first writer wins)
//! - Revocation must be atomic and immediate
//! - Expired tokens should be cleaned up periodically
//! - Access to this storage should be restricted

use async_trait::async_trait;
use uuid::Uuid;

use crate::types::refresh_token::RefreshToken;
use crate::AuthResult;

/// Outcome of an atomic refresh token rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationOutcome {
    /// The presented token was live; it is now retired and the replacement
    /// has been stored.
    Rotated,

    /// The presented token had already been rotated out or revoked by an
    /// earlier request. The replacement was NOT stored. This is the reuse
    /// signal the caller escalates on.
    AlreadyRotated,
}

/// Storage trait for refresh tokens.
///
/// This trait defines the interface for persisting and managing refresh
/// tokens. Implementations must ensure security properties like atomic
/// rotation, atomic revocation, and secure hash storage.
#[async_trait]
pub trait RefreshTokenStorage: Send + Sync {
    /// Stores a new refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be stored (e.g., duplicate hash,
    /// storage unavailable).
    async fn create(&self, token: &RefreshToken) -> AuthResult<()>;

    /// Finds a refresh token by its hash.
    ///
    /// Returns `Some(token)` if found, `None` if not found.
    /// This returns tokens regardless of expiration/revocation status;
    /// callers should check `is_valid()` before using.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>>;

    /// Finds a refresh token by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<RefreshToken>>;

    /// Atomically rotates a refresh token.
    ///
    /// Retires the token identified by `old_hash` (sets `revoked_at`) and
    /// stores `replacement` in one indivisible step. If the old token is
    /// already retired or revoked, nothing is written and
    /// [`RotationOutcome::AlreadyRotated`] is returned.
    ///
    /// Two concurrent rotations of the same token must observe exactly one
    /// `Rotated` and one `AlreadyRotated` outcome; first writer wins. A
    /// find-then-revoke-then-create sequence is not an acceptable
    /// implementation.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage operation itself fails, or if
    /// no token exists for `old_hash` (`InvalidGrant`).
    async fn rotate(&self, old_hash: &str, replacement: &RefreshToken)
        -> AuthResult<RotationOutcome>;

    /// Revokes a refresh token.
    ///
    /// Sets the `revoked_at` timestamp to the current time. This operation
    /// must be atomic - once revoked, the token cannot be used. Revoking an
    /// already-revoked token is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not found or the operation fails.
    async fn revoke(&self, token_hash: &str) -> AuthResult<()>;

    /// Revokes all refresh tokens in a rotation family.
    ///
    /// Used by reuse detection: when a retired family member is presented
    /// again, every descendant (including the currently-live one) must die.
    ///
    /// Returns the number of tokens revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    async fn revoke_family(&self, family_id: Uuid) -> AuthResult<u64>;

    /// Revokes all refresh tokens for a client.
    ///
    /// Used when a client is compromised or deleted to invalidate all
    /// outstanding tokens.
    ///
    /// Returns the number of tokens revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    async fn revoke_by_client(&self, client_id: &str) -> AuthResult<u64>;

    /// Revokes all refresh tokens for a user.
    ///
    /// Used when a user's session is invalidated (logout, password change,
    /// account compromise) to invalidate all outstanding tokens.
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

    /// Lists all active (non-revoked, non-expired) tokens for a user.
    ///
    /// Useful for user session management UI.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    async fn list_by_user(&self, user_id: &str) -> AuthResult<Vec<RefreshToken>>;
}

//! Refresh token domain type.
//!
//! This module defines the refresh token structure used for persisting
//! and managing OAuth 2.1 refresh tokens.
//!
//! # Security
//!
//! - Refresh tokens are stored as SHA-256 hashes, never plaintext
//! - Every token belongs to a rotation family; a presented token that has
//!   already been rotated out triggers revocation of the whole family
//! - Tokens can be revoked individually, by family, or by client/user

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Refresh token record.
///
/// Refresh tokens allow clients to obtain new access tokens without
/// requiring user re-authentication. They are long-lived, single-use
/// (rotated on every refresh), and must be stored securely.
///
/// # Storage Security
///
/// The token itself is never stored. Only a SHA-256 hash is persisted,
/// similar to password storage. When validating a refresh token:
///
/// 1. Hash the incoming token
/// 2. Look up by hash
/// 3. Validate expiration and revocation status
///
/// # Rotation families
///
/// Every refresh token descended from the same authorization grant shares a
/// `family_id`. When a retired member of a family is presented again, the
/// whole family is revoked: the old token has leaked, and either the attacker
/// or the legitimate client is holding the live descendant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshToken {
    /// Unique identifier for this refresh token record.
    pub id: Uuid,

    /// SHA-256 hash of the actual token value.
    /// The plaintext token is returned to the client but never stored.
    pub token_hash: String,

    /// Client ID that this token was issued to.
    pub client_id: String,

    /// User ID that authorized this token.
    pub user_id: String,

    /// Granted scopes (space-separated).
    pub scope: String,

    /// Rotation family this token belongs to. Assigned at the initial
    /// authorization-code exchange and inherited by every rotation.
    pub family_id: Uuid,

    /// When this token was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When this token expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// When this token was revoked (None = not revoked).
    ///
    /// A rotated-out token is recorded as revoked; presenting it again is
    /// what the reuse detector keys on.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub revoked_at: Option<OffsetDateTime>,
}

impl RefreshToken {
    /// Returns `true` if this token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }

    /// Returns `true` if this token has been revoked (including rotated out).
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Returns `true` if this token is valid (not expired and not revoked).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.is_revoked()
    }
}

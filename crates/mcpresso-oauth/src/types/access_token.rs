//! Access token domain type.
//!
//! Access tokens are opaque 256-bit bearer tokens, validated by storage
//! lookup. Like refresh tokens they are persisted as SHA-256 hashes only.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Access token record.
///
/// Short-lived bearer credential granting access to protected resources.
/// The plaintext token is returned to the client once and never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    /// Unique identifier for this access token record.
    pub id: Uuid,

    /// SHA-256 hash of the actual token value.
    pub token_hash: String,

    /// Client ID that this token was issued to.
    pub client_id: String,

    /// User ID on whose behalf this token acts.
    pub user_id: String,

    /// Granted scopes (space-separated).
    pub scope: String,

    /// Rotation family of the refresh token this access token was minted
    /// with, when it has one. Lets family revocation take the derived
    /// access tokens down too.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_id: Option<Uuid>,

    /// When this token was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When this token expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// When this token was revoked (None = not revoked).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub revoked_at: Option<OffsetDateTime>,
}

impl AccessToken {
    /// Returns `true` if this token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }

    /// Returns `true` if this token has been revoked.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Returns `true` if this token is valid (not expired and not revoked).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.is_revoked()
    }

    /// Seconds until expiry, clamped to zero for already-expired tokens.
    #[must_use]
    pub fn remaining_secs(&self) -> i64 {
        let remaining = (self.expires_at - OffsetDateTime::now_utc()).whole_seconds();
        remaining.max(0)
    }
}

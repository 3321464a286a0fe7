//! Authorization session management.
//!
//! This module provides types for managing authorization sessions during
//! the OAuth 2.1 authorization code flow. Sessions track the state of an
//! authorization grant from code issuance through code exchange.
//!
//! # Lifecycle
//!
//! 1. Session created when authorization request is validated and the user
//!    has authorized the client
//! 2. Authorization code is issued to the client
//! 3. Client exchanges code for tokens (session consumed, single-use)
//! 4. Session cleaned up after expiration
//!
//! # Security
//!
//! - Authorization codes are cryptographically random (256 bits)
//! - Sessions expire after a short time (default 10 minutes)
//! - Codes are single-use (consumed atomically on exchange)
//! - PKCE challenge is stored for verification at token exchange

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::types::generate_token;

/// Authorization session record.
///
/// Represents the state of an authorization grant from code issuance
/// through code exchange. The session stores all information needed
/// to validate the token request and issue tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationSession {
    /// Unique session identifier.
    pub id: Uuid,

    /// Authorization code (one-time use).
    /// 256-bit random value, base64url-encoded.
    pub code: String,

    /// Client identifier that initiated the request.
    pub client_id: String,

    /// Redirect URI from the authorization request.
    /// Must byte-exactly match the redirect_uri in the token request.
    pub redirect_uri: String,

    /// Granted scopes (space-separated).
    pub scope: String,

    /// State parameter from the authorization request.
    /// Stored for audit/debugging purposes.
    pub state: String,

    /// PKCE code challenge from the authorization request.
    pub code_challenge: String,

    /// PKCE challenge method (always "S256").
    pub code_challenge_method: String,

    /// User who authorized the request.
    pub user_id: String,

    /// Timestamp when the session was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Timestamp when the session expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// Timestamp when the code was exchanged (consumed).
    /// None until the code is used.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub consumed_at: Option<OffsetDateTime>,
}

impl AuthorizationSession {
    /// Generates a new cryptographically secure authorization code.
    ///
    /// The code is 256 bits (32 bytes) of random data, encoded as
    /// base64url without padding (43 characters).
    ///
    /// # Security
    ///
    /// Uses the system's cryptographically secure random number generator.
    /// The resulting code has 256 bits of entropy, exceeding the OAuth 2.0
    /// recommendation of at least 128 bits.
    #[must_use]
    pub fn generate_code() -> String {
        generate_token()
    }

    /// Returns `true` if the session has expired.
    ///
    /// Expired sessions should not be used for code exchange.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }

    /// Returns `true` if the authorization code has been consumed.
    ///
    /// Consumed codes cannot be used again (single-use requirement).
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }

    /// Returns `true` if the session is valid for code exchange.
    ///
    /// A session is valid if it is not expired and not consumed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.is_consumed()
    }
}

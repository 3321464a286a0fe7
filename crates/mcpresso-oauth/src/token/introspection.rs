//! Token introspection (RFC 7662).
//!
//! Introspection lets a resource server ask whether an opaque token is
//! live and what it grants. Anything other than a fully valid token
//! yields the bare `{"active": false}` response; no metadata leaks for
//! expired, revoked, or unknown tokens.

use serde::{Deserialize, Serialize};

use crate::types::access_token::AccessToken;

/// Introspection response per RFC 7662 Section 2.2.
///
/// All fields other than `active` are omitted when the token is not
/// active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectionResponse {
    /// Whether the token is currently live.
    pub active: bool,

    /// Space-delimited scope granted to the token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Client the token was issued to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Token type. Always "Bearer" for active tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Expiration time as a Unix timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issuance time as a Unix timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Subject (resource owner) of the token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
}

impl IntrospectionResponse {
    /// The response for an unknown, expired, or revoked token.
    #[must_use]
    pub fn inactive() -> Self {
        Self {
            active: false,
            scope: None,
            client_id: None,
            token_type: None,
            exp: None,
            iat: None,
            sub: None,
        }
    }

    /// Builds an active response from a valid access token record.
    ///
    /// The caller is responsible for having checked `is_valid()` first.
    #[must_use]
    pub fn from_access_token(token: &AccessToken) -> Self {
        Self {
            active: true,
            scope: Some(token.scope.clone()),
            client_id: Some(token.client_id.clone()),
            token_type: Some("Bearer".to_string()),
            exp: Some(token.expires_at.unix_timestamp()),
            iat: Some(token.created_at.unix_timestamp()),
            sub: Some(token.user_id.clone()),
        }
    }
}

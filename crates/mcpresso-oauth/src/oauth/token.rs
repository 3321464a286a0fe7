//! Token endpoint types.
//!
//! This module provides types for the OAuth 2.1 token endpoint,
//! including request parsing, response generation, and error handling.
//!
//! # Supported Grant Types
//!
//! - `authorization_code` - Exchange authorization code for tokens
//! - `refresh_token` - Refresh an access token (with rotation)

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AuthError;

/// Token request parameters.
///
/// This structure handles both supported grant types. Different fields
/// are required depending on the `grant_type`:
///
/// - `authorization_code`: code, redirect_uri, code_verifier, client_id
/// - `refresh_token`: refresh_token, (optional) scope
///
/// # Client Authentication
///
/// Clients authenticate using one of:
/// - `client_id` + `client_secret` in body (confidential clients)
/// - `client_id` only (public clients, PKCE mandatory)
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    /// OAuth 2.0 grant type.
    /// Required. One of: "authorization_code", "refresh_token"
    pub grant_type: String,

    /// Authorization code (for authorization_code grant).
    #[serde(default)]
    pub code: Option<String>,

    /// Redirect URI (must match authorization request).
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// PKCE code verifier (for authorization_code grant).
    #[serde(default)]
    pub code_verifier: Option<String>,

    /// Client ID.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret (for confidential clients).
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Refresh token (for refresh_token grant).
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Requested scope (for refresh_token grant, must be subset of original).
    #[serde(default)]
    pub scope: Option<String>,
}

/// Successful token response.
///
/// Returned when a token request succeeds. Contains the access token
/// and optionally a refresh token.
///
/// # Example Response
///
/// ```json
/// {
///   "access_token": "x3pO...",
///   "token_type": "Bearer",
///   "expires_in": 3600,
///   "scope": "read write",
///   "refresh_token": "abc123..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    /// The opaque access token.
    pub access_token: String,

    /// Token type, always "Bearer".
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: u64,

    /// Granted scopes (space-separated).
    pub scope: String,

    /// Refresh token for obtaining new access tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl TokenResponse {
    /// Creates a new token response with required fields.
    #[must_use]
    pub fn new(access_token: String, expires_in: u64, scope: String) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            scope,
            refresh_token: None,
        }
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, token: String) -> Self {
        self.refresh_token = Some(token);
        self
    }
}

/// Token error response.
///
/// Returned when a token request fails. Contains an error code and
/// optional description.
///
/// # Example Response
///
/// ```json
/// {
///   "error": "invalid_grant",
///   "error_description": "Invalid, expired, or revoked grant"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct TokenError {
    /// OAuth 2.0 error code.
    pub error: TokenErrorCode,

    /// Human-readable error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl TokenError {
    /// Creates a new token error.
    #[must_use]
    pub fn new(error: TokenErrorCode) -> Self {
        Self {
            error,
            error_description: None,
        }
    }

    /// Creates a new token error with description.
    #[must_use]
    pub fn with_description(error: TokenErrorCode, description: impl Into<String>) -> Self {
        Self {
            error,
            error_description: Some(description.into()),
        }
    }

    /// Creates an invalid_request error.
    #[must_use]
    pub fn invalid_request(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::InvalidRequest, description)
    }

    /// Creates an invalid_client error.
    #[must_use]
    pub fn invalid_client(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::InvalidClient, description)
    }

    /// Creates an invalid_grant error.
    #[must_use]
    pub fn invalid_grant(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::InvalidGrant, description)
    }

    /// Creates an unsupported_grant_type error.
    #[must_use]
    pub fn unsupported_grant_type(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::UnsupportedGrantType, description)
    }

    /// Creates an invalid_scope error.
    #[must_use]
    pub fn invalid_scope(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::InvalidScope, description)
    }
}

impl From<&AuthError> for TokenError {
    /// Maps an engine error to the wire representation.
    ///
    /// Grant-side failures keep a deliberately generic description so the
    /// response does not leak which validation step failed.
    fn from(err: &AuthError) -> Self {
        match err {
            AuthError::InvalidRequest { message } => Self::invalid_request(message.clone()),
            AuthError::InvalidClient { .. } => {
                Self::invalid_client("Client authentication failed")
            }
            AuthError::InvalidGrant { .. } | AuthError::TokenReuseDetected => {
                Self::invalid_grant("Invalid, expired, or revoked grant")
            }
            AuthError::InvalidScope { message } => Self::invalid_scope(message.clone()),
            AuthError::UnauthorizedClient { message } => {
                Self::with_description(TokenErrorCode::UnauthorizedClient, message.clone())
            }
            AuthError::UnsupportedGrantType { grant_type } => {
                Self::unsupported_grant_type(format!("Unsupported grant type: {grant_type}"))
            }
            AuthError::Storage { .. } | AuthError::Internal { .. } => {
                Self::with_description(TokenErrorCode::ServerError, "Internal server error")
            }
        }
    }
}

/// OAuth 2.0 token error codes.
///
/// Defined in RFC 6749 Section 5.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenErrorCode {
    /// The request is missing a required parameter, includes an unsupported
    /// parameter value, includes a parameter more than once, or is otherwise
    /// malformed.
    InvalidRequest,

    /// Client authentication failed (unknown client, no client authentication
    /// included, or unsupported authentication method).
    InvalidClient,

    /// The provided authorization grant or refresh token is invalid, expired,
    /// revoked, or was issued to another client.
    InvalidGrant,

    /// The authenticated client is not authorized to use this authorization
    /// grant type.
    UnauthorizedClient,

    /// The authorization grant type is not supported by the authorization server.
    UnsupportedGrantType,

    /// The requested scope is invalid, unknown, malformed, or exceeds the scope
    /// granted by the resource owner.
    InvalidScope,

    /// The authorization server encountered an unexpected condition.
    ServerError,
}

impl TokenErrorCode {
    /// Returns the string representation of the error code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::InvalidGrant => "invalid_grant",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::InvalidScope => "invalid_scope",
            Self::ServerError => "server_error",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidClient => 401,
            Self::ServerError => 500,
            Self::InvalidRequest
            | Self::InvalidGrant
            | Self::UnauthorizedClient
            | Self::UnsupportedGrantType
            | Self::InvalidScope => 400,
        }
    }
}

impl fmt::Display for TokenErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! OAuth 2.1 Client domain types.
//!
//! This module defines the `Client` struct and related types for OAuth client
//! registrations.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// =============================================================================
// Grant Type
// =============================================================================

/// OAuth 2.1 grant types.
///
/// Defines the authorization flows a client is allowed to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Authorization Code flow with mandatory PKCE.
    AuthorizationCode,
    /// Refresh Token flow.
    RefreshToken,
}

impl GrantType {
    /// Returns the OAuth 2.0 grant_type parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
        }
    }

    /// Parses an OAuth 2.0 grant_type parameter value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "authorization_code" => Some(Self::AuthorizationCode),
            "refresh_token" => Some(Self::RefreshToken),
            _ => None,
        }
    }
}

impl std::fmt::Display for GrantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Client
// =============================================================================

/// OAuth 2.1 Client registration.
///
/// Represents a registered client application with credentials and
/// configuration. The `client_secret` field holds an Argon2id hash, never the
/// plaintext secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Unique client identifier used in OAuth flows.
    pub client_id: String,

    /// Argon2id-hashed client secret (for confidential clients).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Human-readable display name.
    pub name: String,

    /// Allowed redirect URIs for authorization code flow.
    ///
    /// Matched by exact byte equality. No prefix or pattern matching.
    #[serde(default)]
    pub redirect_uris: Vec<String>,

    /// OAuth scopes this client is allowed to request.
    /// Empty list means all scopes are allowed.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// OAuth 2.1 grant types this client is allowed to use.
    pub grant_types: Vec<GrantType>,

    /// Whether this is a confidential client (has client secret).
    pub confidential: bool,

    /// Whether this client is currently active and can be used.
    pub active: bool,

    /// Access token lifetime in seconds, overriding the issuer default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_lifetime: Option<i64>,

    /// Refresh token lifetime in seconds, overriding the issuer default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token_lifetime: Option<i64>,

    /// When this client was registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Client {
    /// Validates the client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client configuration is invalid.
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if self.client_id.is_empty() {
            return Err(ClientValidationError::EmptyClientId);
        }

        if self.name.is_empty() {
            return Err(ClientValidationError::EmptyName);
        }

        if self.grant_types.is_empty() {
            return Err(ClientValidationError::NoGrantTypes);
        }

        // Confidential clients must have a client secret
        if self.confidential && self.client_secret.is_none() {
            return Err(ClientValidationError::MissingSecret);
        }

        // Authorization code flow requires redirect URIs
        if self.grant_types.contains(&GrantType::AuthorizationCode) && self.redirect_uris.is_empty()
        {
            return Err(ClientValidationError::NoRedirectUris);
        }

        Ok(())
    }

    /// Checks if the given redirect URI is allowed for this client.
    ///
    /// Exact byte equality against the registered URIs. `https://app.example/cb`
    /// does not authorize `https://app.example/cb/evil` or any other variant.
    #[must_use]
    pub fn is_redirect_uri_allowed(&self, uri: &str) -> bool {
        self.redirect_uris.iter().any(|allowed| allowed == uri)
    }

    /// Checks if the given scope is allowed for this client.
    ///
    /// An empty scopes list means all scopes are allowed.
    #[must_use]
    pub fn is_scope_allowed(&self, scope: &str) -> bool {
        if self.scopes.is_empty() {
            return true;
        }
        self.scopes.iter().any(|allowed| allowed == scope)
    }

    /// Checks that every space-delimited scope in `scope` is allowed.
    #[must_use]
    pub fn are_scopes_allowed(&self, scope: &str) -> bool {
        scope.split_whitespace().all(|s| self.is_scope_allowed(s))
    }

    /// Checks if the given grant type is allowed for this client.
    #[must_use]
    pub fn is_grant_type_allowed(&self, grant_type: GrantType) -> bool {
        self.grant_types.contains(&grant_type)
    }

    /// Returns the access token lifetime in seconds.
    ///
    /// Defaults to 3600 (1 hour) if not specified.
    #[must_use]
    pub fn access_token_lifetime_secs(&self) -> i64 {
        self.access_token_lifetime.unwrap_or(3600)
    }

    /// Returns the refresh token lifetime in seconds.
    ///
    /// Defaults to 2592000 (30 days) if not specified.
    #[must_use]
    pub fn refresh_token_lifetime_secs(&self) -> i64 {
        self.refresh_token_lifetime.unwrap_or(2_592_000)
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Errors that can occur during client validation.
#[derive(Debug, thiserror::Error)]
pub enum ClientValidationError {
    /// Client ID cannot be empty.
    #[error("Client ID cannot be empty")]
    EmptyClientId,

    /// Client name cannot be empty.
    #[error("Client name cannot be empty")]
    EmptyName,

    /// At least one grant type is required.
    #[error("At least one grant type is required")]
    NoGrantTypes,

    /// Authorization code flow requires redirect URIs.
    #[error("Authorization code flow requires redirect URIs")]
    NoRedirectUris,

    /// Confidential clients require a client secret.
    #[error("Confidential clients require a client secret")]
    MissingSecret,
}

// =============================================================================
// Tests
// =============================================================================

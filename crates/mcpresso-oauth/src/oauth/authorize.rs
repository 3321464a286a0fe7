//! Authorization endpoint types.
//!
//! This module provides types for the OAuth 2.1 authorization endpoint,
//! including request parsing, response generation, and error handling.
//!
//! # OAuth 2.1 Authorization Code Flow
//!
//! The authorization endpoint is the first step in the authorization code flow:
//!
//! 1. Client redirects user to authorization endpoint with request parameters
//! 2. User authenticates and authorizes the request
//! 3. Server redirects back to client with authorization code
//! 4. Client exchanges code for tokens at token endpoint
//!
//! # Security Requirements
//!
//! - PKCE is required (code_challenge and code_challenge_method)
//! - Only S256 challenge method is supported (plain is forbidden)
//! - Redirect URIs are matched by exact byte equality

use serde::{Deserialize, Serialize};
use std::fmt;

/// Authorization request parameters.
///
/// These parameters are received as query string parameters on the
/// authorization endpoint. All required parameters must be present
/// for a valid authorization request.
///
/// # Example
///
/// ```ignore
/// GET /authorize?
///   response_type=code
///   &client_id=demo-client
///   &redirect_uri=https://app.example.com/callback
///   &scope=read write
///   &state=abc123xyz
///   &code_challenge=E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM
///   &code_challenge_method=S256
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizationRequest {
    /// Must be "code" for authorization code flow.
    pub response_type: String,

    /// Client identifier issued during registration.
    pub client_id: String,

    /// Redirect URI where the response will be sent.
    /// Must exactly match one of the registered redirect URIs.
    pub redirect_uri: String,

    /// Requested scopes (space-separated).
    pub scope: String,

    /// CSRF protection state parameter.
    pub state: String,

    /// PKCE code challenge.
    /// Base64url-encoded SHA-256 hash of the code verifier.
    pub code_challenge: String,

    /// PKCE code challenge method.
    /// Must be "S256" (plain is forbidden per OAuth 2.1).
    pub code_challenge_method: String,
}

/// Authorization response parameters.
///
/// These parameters are returned as query string parameters on the
/// redirect URI after successful authorization.
///
/// # Example
///
/// ```ignore
/// HTTP/1.1 302 Found
/// Location: https://app.example.com/callback?
///   code=SplxlOBeZQQYbYS6WxSbIA
///   &state=abc123xyz
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationResponse {
    /// Authorization code to be exchanged for tokens.
    /// This code is single-use and expires after a short time (typically 10 minutes).
    pub code: String,

    /// Echoed state parameter for CSRF validation.
    /// The client must verify this matches the state sent in the request.
    pub state: String,
}

impl AuthorizationResponse {
    /// Creates a new authorization response.
    #[must_use]
    pub fn new(code: String, state: String) -> Self {
        Self { code, state }
    }

    /// Builds the redirect URL with response parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the redirect URI cannot be parsed.
    pub fn to_redirect_url(&self, redirect_uri: &str) -> Result<String, url::ParseError> {
        let mut url = url::Url::parse(redirect_uri)?;
        url.query_pairs_mut()
            .append_pair("code", &self.code)
            .append_pair("state", &self.state);
        Ok(url.to_string())
    }
}

/// Authorization error response.
///
/// Returned when the authorization request fails. The error is communicated
/// via redirect to the client's redirect URI (if valid) or displayed to
/// the user (if redirect URI is invalid).
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationErrorResponse {
    /// OAuth 2.0 error code.
    pub error: AuthorizationErrorCode,

    /// Human-readable error description (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,

    /// Echoed state parameter for CSRF validation.
    pub state: String,
}

impl AuthorizationErrorResponse {
    /// Creates a new authorization error.
    #[must_use]
    pub fn new(error: AuthorizationErrorCode, state: String) -> Self {
        Self {
            error,
            error_description: None,
            state,
        }
    }

    /// Creates a new authorization error with description.
    #[must_use]
    pub fn with_description(
        error: AuthorizationErrorCode,
        description: impl Into<String>,
        state: String,
    ) -> Self {
        Self {
            error,
            error_description: Some(description.into()),
            state,
        }
    }

    /// Builds the redirect URL with error parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the redirect URI cannot be parsed.
    pub fn to_redirect_url(&self, redirect_uri: &str) -> Result<String, url::ParseError> {
        let mut url = url::Url::parse(redirect_uri)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("error", self.error.as_str());
            if let Some(ref desc) = self.error_description {
                pairs.append_pair("error_description", desc);
            }
            pairs.append_pair("state", &self.state);
        }
        Ok(url.to_string())
    }
}

/// OAuth 2.0 authorization error codes.
///
/// These error codes are defined in RFC 6749 Section 4.1.2.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationErrorCode {
    /// The request is missing a required parameter, includes an invalid
    /// parameter value, includes a parameter more than once, or is
    /// otherwise malformed.
    InvalidRequest,

    /// The client is not authorized to request an authorization code
    /// using this method.
    UnauthorizedClient,

    /// The resource owner or authorization server denied the request.
    AccessDenied,

    /// The authorization server does not support obtaining an authorization
    /// code using this method.
    UnsupportedResponseType,

    /// The requested scope is invalid, unknown, or malformed.
    InvalidScope,

    /// The authorization server encountered an unexpected condition that
    /// prevented it from fulfilling the request.
    ServerError,

    /// The authorization server is currently unable to handle the request
    /// due to temporary overloading or maintenance.
    TemporarilyUnavailable,
}

impl AuthorizationErrorCode {
    /// Returns the string representation of the error code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::AccessDenied => "access_denied",
            Self::UnsupportedResponseType => "unsupported_response_type",
            Self::InvalidScope => "invalid_scope",
            Self::ServerError => "server_error",
            Self::TemporarilyUnavailable => "temporarily_unavailable",
        }
    }
}

impl fmt::Display for AuthorizationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! Authorization engine error types.
//!
//! This module defines all error types that can occur during OAuth
//! authorization and token operations.
//!
//! # Anti-enumeration
//!
//! Grant-side failures (unknown code, expired code, consumed code, client or
//! redirect URI mismatch, PKCE failure) are deliberately collapsed into a
//! single undifferentiated [`AuthError::InvalidGrant`] by the services, so a
//! caller cannot probe which check failed. The distinguishing detail is only
//! emitted to the tracing log.

/// Errors that can occur during authorization and token operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request is malformed or missing a required parameter.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of why the request is invalid.
        message: String,
    },

    /// The client is unknown, inactive, or failed authentication.
    #[error("Invalid client: {message}")]
    InvalidClient {
        /// Description of why the client is invalid.
        message: String,
    },

    /// The authorization code or refresh token is invalid, expired,
    /// consumed, revoked, or was issued to another client.
    #[error("Invalid grant: {message}")]
    InvalidGrant {
        /// Description of why the grant is invalid.
        message: String,
    },

    /// The requested scope is not allowed for the client or the user.
    #[error("Invalid scope: {message}")]
    InvalidScope {
        /// Description of why the scope is invalid.
        message: String,
    },

    /// The client is not authorized to use the requested grant type.
    #[error("Unauthorized client: {message}")]
    UnauthorizedClient {
        /// Description of why the client is unauthorized.
        message: String,
    },

    /// The grant type is not supported by this server.
    #[error("Unsupported grant type: {grant_type}")]
    UnsupportedGrantType {
        /// The unsupported grant type.
        grant_type: String,
    },

    /// A retired refresh token was presented again.
    ///
    /// This is a theft signal: the token's entire rotation family has been
    /// revoked as a side effect. The client-facing response is still a
    /// generic `invalid_grant`.
    #[error("Refresh token reuse detected")]
    TokenReuseDetected,

    /// An error occurred while storing or retrieving auth data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidClient` error.
    #[must_use]
    pub fn invalid_client(message: impl Into<String>) -> Self {
        Self::InvalidClient {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidGrant` error.
    #[must_use]
    pub fn invalid_grant(message: impl Into<String>) -> Self {
        Self::InvalidGrant {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidScope` error.
    #[must_use]
    pub fn invalid_scope(message: impl Into<String>) -> Self {
        Self::InvalidScope {
            message: message.into(),
        }
    }

    /// Creates a new `UnauthorizedClient` error.
    #[must_use]
    pub fn unauthorized_client(message: impl Into<String>) -> Self {
        Self::UnauthorizedClient {
            message: message.into(),
        }
    }

    /// Creates a new `UnsupportedGrantType` error.
    #[must_use]
    pub fn unsupported_grant_type(grant_type: impl Into<String>) -> Self {
        Self::UnsupportedGrantType {
            grant_type: grant_type.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest { .. }
                | Self::InvalidClient { .. }
                | Self::InvalidGrant { .. }
                | Self::InvalidScope { .. }
                | Self::UnauthorizedClient { .. }
                | Self::UnsupportedGrantType { .. }
                | Self::TokenReuseDetected
        )
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Internal { .. })
    }

    /// Returns `true` if this error is a security event worth alerting on.
    #[must_use]
    pub fn is_security_event(&self) -> bool {
        matches!(self, Self::TokenReuseDetected)
    }

    /// Returns the OAuth 2.0 error code for this error.
    ///
    /// `TokenReuseDetected` maps to plain `invalid_grant`: reuse detection
    /// must not be observable from the response body.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request",
            Self::InvalidClient { .. } => "invalid_client",
            Self::InvalidGrant { .. } | Self::TokenReuseDetected => "invalid_grant",
            Self::InvalidScope { .. } => "invalid_scope",
            Self::UnauthorizedClient { .. } => "unauthorized_client",
            Self::UnsupportedGrantType { .. } => "unsupported_grant_type",
            Self::Storage { .. } | Self::Internal { .. } => "server_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::invalid_client("client not found");
        assert_eq!(err.to_string(), "Invalid client: client not found");

        let err = AuthError::invalid_grant("expired authorization code");
        assert_eq!(err.to_string(), "Invalid grant: expired authorization code");

        let err = AuthError::TokenReuseDetected;
        assert_eq!(err.to_string(), "Refresh token reuse detected");

        let err = AuthError::unsupported_grant_type("implicit");
        assert_eq!(err.to_string(), "Unsupported grant type: implicit");
    }

    #[test]
    fn test_error_predicates() {
        let err = AuthError::invalid_grant("test");
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
        assert!(!err.is_security_event());

        let err = AuthError::TokenReuseDetected;
        assert!(err.is_client_error());
        assert!(err.is_security_event());

        let err = AuthError::storage("database down");
        assert!(!err.is_client_error());
        assert!(err.is_server_error());
    }

    #[test]
    fn test_oauth_error_code() {
        assert_eq!(
            AuthError::invalid_request("test").oauth_error_code(),
            "invalid_request"
        );
        assert_eq!(
            AuthError::invalid_client("test").oauth_error_code(),
            "invalid_client"
        );
        assert_eq!(
            AuthError::invalid_grant("test").oauth_error_code(),
            "invalid_grant"
        );
        assert_eq!(
            AuthError::invalid_scope("test").oauth_error_code(),
            "invalid_scope"
        );
        assert_eq!(
            AuthError::unauthorized_client("test").oauth_error_code(),
            "unauthorized_client"
        );
        assert_eq!(
            AuthError::unsupported_grant_type("implicit").oauth_error_code(),
            "unsupported_grant_type"
        );
        assert_eq!(AuthError::storage("test").oauth_error_code(), "server_error");
    }

    #[test]
    fn test_reuse_detection_not_observable() {
        // Reuse detection must look like any other invalid_grant to clients.
        assert_eq!(
            AuthError::TokenReuseDetected.oauth_error_code(),
            AuthError::invalid_grant("x").oauth_error_code()
        );
    }
}

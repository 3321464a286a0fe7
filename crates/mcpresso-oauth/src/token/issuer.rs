//! Token issuance service.
//!
//! This module provides the token service that handles OAuth 2.1 token
//! operations:
//!
//! - Access/refresh token pair issuance after code exchange
//! - Refresh token rotation with reuse detection
//! - Access token validation by storage lookup
//!
//! # Usage
//!
//! ```ignore
//! use mcpresso_oauth::token::{TokenService, TokenConfig};
//!
//! let service = TokenService::new(access_storage, refresh_storage, TokenConfig::default());
//! let response = service.issue_pair(&client, "alice", "read write").await?;
//! ```

use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AuthError;
use crate::oauth::token::{TokenRequest, TokenResponse};
use crate::token::introspection::IntrospectionResponse;
use crate::token::revocation::RevocationService;
use crate::storage::access_token::AccessTokenStorage;
use crate::storage::refresh_token::{RefreshTokenStorage, RotationOutcome};
use crate::types::access_token::AccessToken;
use crate::types::refresh_token::RefreshToken;
use crate::types::{generate_token, hash_token, Client, GrantType};
use crate::AuthResult;

/// Configuration for the token service.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Default access token lifetime.
    /// Can be overridden per-client.
    pub access_token_lifetime: Duration,

    /// Default refresh token lifetime.
    /// Can be overridden per-client.
    pub refresh_token_lifetime: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime: Duration::hours(1),
            refresh_token_lifetime: Duration::days(30),
        }
    }
}

impl TokenConfig {
    /// Creates a new token configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the access token lifetime.
    #[must_use]
    pub fn with_access_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.access_token_lifetime = lifetime;
        self
    }

    /// Sets the refresh token lifetime.
    #[must_use]
    pub fn with_refresh_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.refresh_token_lifetime = lifetime;
        self
    }
}

/// Token service for generating and managing OAuth tokens.
///
/// Tokens are opaque 256-bit values validated by storage lookup; only
/// SHA-256 hashes are ever persisted.
pub struct TokenService {
    /// Access token storage.
    access_token_storage: Arc<dyn AccessTokenStorage>,

    /// Refresh token storage.
    refresh_token_storage: Arc<dyn RefreshTokenStorage>,

    /// Used to take down whole rotation families on reuse detection.
    revocation: RevocationService,

    /// Service configuration.
    config: TokenConfig,
}

impl TokenService {
    /// Creates a new token service.
    #[must_use]
    pub fn new(
        access_token_storage: Arc<dyn AccessTokenStorage>,
        refresh_token_storage: Arc<dyn RefreshTokenStorage>,
        config: TokenConfig,
    ) -> Self {
        let revocation =
            RevocationService::new(access_token_storage.clone(), refresh_token_storage.clone());
        Self {
            access_token_storage,
            refresh_token_storage,
            revocation,
            config,
        }
    }

    /// Gets the service configuration.
    #[must_use]
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Issues an access/refresh token pair for a granted authorization.
    ///
    /// Called after a successful authorization-code exchange. Starts a new
    /// refresh token rotation family.
    ///
    /// # Errors
    ///
    /// Returns an error if token storage fails.
    pub async fn issue_pair(
        &self,
        client: &Client,
        user_id: &str,
        scope: &str,
    ) -> AuthResult<TokenResponse> {
        let access_lifetime = self.access_lifetime(client);
        let refresh_lifetime = self.refresh_lifetime(client);
        let now = OffsetDateTime::now_utc();

        // New grant, new rotation family; the access token carries it so
        // family revocation reaches it too
        let family_id = Uuid::new_v4();
        let access_token = self
            .create_access_token(client, user_id, scope, Some(family_id), access_lifetime)
            .await?;

        let refresh_value = generate_token();
        let refresh_record = RefreshToken {
            id: Uuid::new_v4(),
            token_hash: hash_token(&refresh_value),
            client_id: client.client_id.clone(),
            user_id: user_id.to_string(),
            scope: scope.to_string(),
            family_id,
            created_at: now,
            expires_at: now + refresh_lifetime,
            revoked_at: None,
        };
        self.refresh_token_storage.create(&refresh_record).await?;

        debug!(
            client_id = %client.client_id,
            family_id = %family_id,
            "issued token pair"
        );

        Ok(TokenResponse::new(
            access_token,
            access_lifetime.whole_seconds() as u64,
            scope.to_string(),
        )
        .with_refresh_token(refresh_value))
    }

    /// Issues a standalone access token with no refresh token.
    ///
    /// For grants that do not hand out refresh tokens. The token belongs to
    /// no rotation family, so family revocation never matches it.
    ///
    /// # Errors
    ///
    /// Returns an error if token storage fails.
    pub async fn issue_access_token(
        &self,
        client: &Client,
        user_id: &str,
        scope: &str,
    ) -> AuthResult<TokenResponse> {
        let access_lifetime = self.access_lifetime(client);
        let access_token = self
            .create_access_token(client, user_id, scope, None, access_lifetime)
            .await?;

        debug!(client_id = %client.client_id, "issued standalone access token");

        Ok(TokenResponse::new(
            access_token,
            access_lifetime.whole_seconds() as u64,
            scope.to_string(),
        ))
    }

    /// Exchanges a refresh token for a new token pair.
    ///
    /// The presented token is atomically rotated: it is retired and a
    /// replacement in the same family is stored. Presenting a retired token
    /// is treated as theft and revokes the whole family.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `grant_type` is not "refresh_token"
    /// - Client is not authorized for refresh_token grant
    /// - Refresh token is missing, unknown, expired, or belongs to another
    ///   client (all surfaced as `InvalidGrant`)
    /// - The token was already rotated out or revoked (`TokenReuseDetected`,
    ///   after revoking the family)
    ///
    /// # Security
    ///
    /// - Rotation is a single atomic storage operation; a race between two
    ///   holders of the same token lets exactly one win
    /// - Scope can be narrowed on refresh, never expanded
    pub async fn refresh(
        &self,
        request: &TokenRequest,
        client: &Client,
    ) -> AuthResult<TokenResponse> {
        // 1. Validate grant type
        if request.grant_type != "refresh_token" {
            return Err(AuthError::unsupported_grant_type(&request.grant_type));
        }

        // 2. Validate client is allowed refresh_token grant
        if !client.is_grant_type_allowed(GrantType::RefreshToken) {
            return Err(AuthError::unauthorized_client(
                "Client not authorized for refresh_token grant",
            ));
        }

        // 3. Get refresh token from request
        let refresh_token_value = request.refresh_token.as_ref().ok_or_else(|| {
            AuthError::invalid_request("Missing refresh_token parameter")
        })?;

        // 4. Hash and lookup token
        let token_hash = hash_token(refresh_token_value);
        let stored_token = match self.refresh_token_storage.find_by_hash(&token_hash).await? {
            Some(token) => token,
            None => {
                debug!("refresh token not found");
                return Err(AuthError::invalid_grant("Invalid refresh token"));
            }
        };

        // 5. A revoked token presented again is the reuse signal
        if stored_token.is_revoked() {
            return self.handle_reuse(&stored_token).await;
        }

        if stored_token.is_expired() {
            debug!(token_id = %stored_token.id, "refresh token expired");
            return Err(AuthError::invalid_grant("Refresh token has expired"));
        }

        if stored_token.client_id != client.client_id {
            debug!(
                token_id = %stored_token.id,
                "refresh token presented by a different client"
            );
            return Err(AuthError::invalid_grant(
                "Refresh token was issued to a different client",
            ));
        }

        // 6. Determine scope (can be narrowed, not expanded)
        let scope = Self::determine_refresh_scope(request, &stored_token)?;

        // 7. Atomically rotate: retire old, store replacement, same family
        let now = OffsetDateTime::now_utc();
        let new_refresh_value = generate_token();
        let replacement = RefreshToken {
            id: Uuid::new_v4(),
            token_hash: hash_token(&new_refresh_value),
            client_id: client.client_id.clone(),
            user_id: stored_token.user_id.clone(),
            scope: scope.clone(),
            family_id: stored_token.family_id,
            created_at: now,
            // The family's absolute expiry does not extend on rotation
            expires_at: stored_token.expires_at,
            revoked_at: None,
        };

        match self
            .refresh_token_storage
            .rotate(&token_hash, &replacement)
            .await?
        {
            RotationOutcome::Rotated => {}
            RotationOutcome::AlreadyRotated => {
                // Lost a race against another holder of the same token.
                // Indistinguishable from replay, so treat it the same way.
                return self.handle_reuse(&stored_token).await;
            }
        }

        // 8. Issue the new access token, tied to the same family
        let access_lifetime = self.access_lifetime(client);
        let access_token = self
            .create_access_token(
                client,
                &stored_token.user_id,
                &scope,
                Some(stored_token.family_id),
                access_lifetime,
            )
            .await?;

        debug!(
            client_id = %client.client_id,
            family_id = %stored_token.family_id,
            "rotated refresh token"
        );

        Ok(TokenResponse::new(
            access_token,
            access_lifetime.whole_seconds() as u64,
            scope,
        )
        .with_refresh_token(new_refresh_value))
    }

    /// Validates an opaque access token and returns its record.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGrant` if the token is unknown, expired, or revoked.
    pub async fn validate_access_token(&self, token: &str) -> AuthResult<AccessToken> {
        let token_hash = hash_token(token);
        let stored = self
            .access_token_storage
            .find_by_hash(&token_hash)
            .await?
            .ok_or_else(|| AuthError::invalid_grant("Invalid access token"))?;

        if !stored.is_valid() {
            return Err(AuthError::invalid_grant("Access token expired or revoked"));
        }

        Ok(stored)
    }

    /// Introspects an opaque access token (RFC 7662).
    ///
    /// Unknown, expired, and revoked tokens all yield the bare inactive
    /// response; no metadata leaks for dead tokens.
    ///
    /// # Errors
    ///
    /// Returns an error only if storage fails.
    pub async fn introspect(&self, token: &str) -> AuthResult<IntrospectionResponse> {
        let token_hash = hash_token(token);
        match self.access_token_storage.find_by_hash(&token_hash).await? {
            Some(stored) if stored.is_valid() => {
                Ok(IntrospectionResponse::from_access_token(&stored))
            }
            _ => Ok(IntrospectionResponse::inactive()),
        }
    }

    /// Generates and stores an access token, returning the plaintext value.
    async fn create_access_token(
        &self,
        client: &Client,
        user_id: &str,
        scope: &str,
        family_id: Option<Uuid>,
        lifetime: Duration,
    ) -> AuthResult<String> {
        let now = OffsetDateTime::now_utc();
        let token_value = generate_token();

        let record = AccessToken {
            id: Uuid::new_v4(),
            token_hash: hash_token(&token_value),
            client_id: client.client_id.clone(),
            user_id: user_id.to_string(),
            scope: scope.to_string(),
            family_id,
            created_at: now,
            expires_at: now + lifetime,
            revoked_at: None,
        };
        self.access_token_storage.create(&record).await?;

        Ok(token_value)
    }

    /// Contains a detected refresh token reuse: revokes the whole rotation
    /// family, access tokens included, and fails the request.
    async fn handle_reuse(&self, stored_token: &RefreshToken) -> AuthResult<TokenResponse> {
        let revoked = self.revocation.revoke_family(stored_token.family_id).await?;

        warn!(
            family_id = %stored_token.family_id,
            client_id = %stored_token.client_id,
            tokens_revoked = revoked,
            "refresh token reuse detected, family revoked"
        );

        Err(AuthError::TokenReuseDetected)
    }

    fn access_lifetime(&self, client: &Client) -> Duration {
        client
            .access_token_lifetime
            .map(Duration::seconds)
            .unwrap_or(self.config.access_token_lifetime)
    }

    fn refresh_lifetime(&self, client: &Client) -> Duration {
        client
            .refresh_token_lifetime
            .map(Duration::seconds)
            .unwrap_or(self.config.refresh_token_lifetime)
    }

    /// Determines the scope to use for a refreshed token.
    ///
    /// Per OAuth 2.0 spec, the scope can be narrowed but not expanded.
    fn determine_refresh_scope(
        request: &TokenRequest,
        stored_token: &RefreshToken,
    ) -> AuthResult<String> {
        match request.scope.as_deref() {
            None => Ok(stored_token.scope.clone()),
            Some(requested) => {
                let original_scopes: std::collections::HashSet<&str> =
                    stored_token.scope.split_whitespace().collect();
                let requested_scopes: std::collections::HashSet<&str> =
                    requested.split_whitespace().collect();

                if !requested_scopes.is_subset(&original_scopes) {
                    return Err(AuthError::invalid_scope(
                        "Requested scope exceeds original grant",
                    ));
                }

                Ok(requested.to_string())
            }
        }
    }
}

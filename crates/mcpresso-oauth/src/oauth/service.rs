//! Authorization flow orchestration.
//!
//! This module ties the authorization endpoint types, PKCE validation, and
//! session storage together into the two operations of the authorization
//! code flow: granting a code and exchanging it for tokens.

use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AuthError;
use crate::oauth::authorize::{AuthorizationRequest, AuthorizationResponse};
use crate::oauth::pkce::{PkceChallenge, PkceChallengeMethod, PkceVerifier};
use crate::oauth::session::AuthorizationSession;
use crate::oauth::token::{TokenRequest, TokenResponse};
use crate::storage::client::ClientStorage;
use crate::storage::session::{CodeConsumption, SessionStorage};
use crate::storage::user::UserStorage;
use crate::token::issuer::TokenService;
use crate::token::revocation::RevocationService;
use crate::types::{Client, GrantType};
use crate::AuthResult;

/// Configuration for the authorization service.
#[derive(Debug, Clone)]
pub struct AuthorizationConfig {
    /// Authorization code lifetime. OAuth 2.1 recommends at most 10 minutes.
    pub code_lifetime: Duration,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            code_lifetime: Duration::seconds(600),
        }
    }
}

impl AuthorizationConfig {
    /// Creates a new authorization configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the authorization code lifetime.
    #[must_use]
    pub fn with_code_lifetime(mut self, lifetime: Duration) -> Self {
        self.code_lifetime = lifetime;
        self
    }
}

/// Service implementing the OAuth 2.1 authorization code flow.
///
/// Handles the grant step (validating an authorization request and minting
/// a single-use code) and the exchange step (consuming the code, verifying
/// PKCE, and delegating token issuance).
pub struct AuthorizationService {
    client_storage: Arc<dyn ClientStorage>,
    user_storage: Arc<dyn UserStorage>,
    session_storage: Arc<dyn SessionStorage>,
    revocation: RevocationService,
    token_service: Arc<TokenService>,
    config: AuthorizationConfig,
}

impl AuthorizationService {
    /// Creates a new authorization service.
    #[must_use]
    pub fn new(
        client_storage: Arc<dyn ClientStorage>,
        user_storage: Arc<dyn UserStorage>,
        session_storage: Arc<dyn SessionStorage>,
        revocation: RevocationService,
        token_service: Arc<TokenService>,
        config: AuthorizationConfig,
    ) -> Self {
        Self {
            client_storage,
            user_storage,
            session_storage,
            revocation,
            token_service,
            config,
        }
    }

    /// Processes an authorization request on behalf of an authenticated user.
    ///
    /// Validates the client, redirect URI, scope, and PKCE parameters, then
    /// creates an authorization session and returns the code.
    ///
    /// The caller (the HTTP layer) has already authenticated the user and
    /// obtained their consent; `user_id` identifies who is granting.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `response_type` is not "code"
    /// - Client is unknown or inactive (`InvalidClient`)
    /// - Client is not authorized for the authorization_code grant
    /// - `redirect_uri` is not registered for the client (the caller must
    ///   NOT redirect in this case)
    /// - Requested scope exceeds the client's or the user's allowed scopes
    /// - PKCE parameters are missing or use a method other than S256
    pub async fn authorize(
        &self,
        request: &AuthorizationRequest,
        user_id: &str,
    ) -> AuthResult<AuthorizationResponse> {
        // 1. Validate response type
        if request.response_type != "code" {
            return Err(AuthError::invalid_request(format!(
                "Unsupported response_type: {}",
                request.response_type
            )));
        }

        // 2. Validate client
        let client = self
            .client_storage
            .find_by_id(&request.client_id)
            .await?
            .ok_or_else(|| AuthError::invalid_client("Unknown client"))?;

        if !client.active {
            return Err(AuthError::invalid_client("Client is deactivated"));
        }

        if !client.is_grant_type_allowed(GrantType::AuthorizationCode) {
            return Err(AuthError::unauthorized_client(
                "Client not authorized for authorization_code grant",
            ));
        }

        // 3. Validate redirect URI (exact match, no prefix or pattern logic)
        if !client.is_redirect_uri_allowed(&request.redirect_uri) {
            return Err(AuthError::invalid_request("Invalid redirect_uri"));
        }

        // 4. Validate requested scope against the client registration
        if !client.are_scopes_allowed(&request.scope) {
            return Err(AuthError::invalid_scope(
                "Requested scope exceeds client registration",
            ));
        }

        // 5. Validate the granting user
        let user = self
            .user_storage
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::invalid_request("Unknown user"))?;

        if !user.can_grant_scopes(&request.scope) {
            return Err(AuthError::invalid_scope(
                "User cannot grant the requested scope",
            ));
        }

        // 6. Validate PKCE parameters. S256 only; "plain" is rejected here.
        let method = PkceChallengeMethod::parse(&request.code_challenge_method)
            .map_err(|e| AuthError::invalid_request(e.to_string()))?;
        let challenge = PkceChallenge::new(request.code_challenge.clone())
            .map_err(|e| AuthError::invalid_request(e.to_string()))?;

        // 7. Create the session
        let now = OffsetDateTime::now_utc();
        let session = AuthorizationSession {
            id: Uuid::new_v4(),
            code: AuthorizationSession::generate_code(),
            client_id: client.client_id.clone(),
            redirect_uri: request.redirect_uri.clone(),
            scope: request.scope.clone(),
            state: request.state.clone(),
            code_challenge: challenge.into_inner(),
            code_challenge_method: method.as_str().to_string(),
            user_id: user.id.clone(),
            created_at: now,
            expires_at: now + self.config.code_lifetime,
            consumed_at: None,
        };
        self.session_storage.create(&session).await?;

        debug!(
            client_id = %client.client_id,
            session_id = %session.id,
            "authorization code issued"
        );

        Ok(AuthorizationResponse::new(session.code, session.state))
    }

    /// Exchanges an authorization code for a token pair.
    ///
    /// The code is consumed atomically; a second exchange of the same code
    /// observes the replay and triggers containment. The client has already
    /// been authenticated by the caller.
    ///
    /// # Errors
    ///
    /// Unknown, expired, replayed, and mismatched codes, as well as PKCE
    /// failures, all surface as `InvalidGrant`. The distinctions exist only
    /// in debug logs; the wire response never differentiates them.
    pub async fn exchange_code(
        &self,
        request: &TokenRequest,
        client: &Client,
    ) -> AuthResult<TokenResponse> {
        // 1. Validate grant type
        if request.grant_type != "authorization_code" {
            return Err(AuthError::unsupported_grant_type(&request.grant_type));
        }

        if !client.is_grant_type_allowed(GrantType::AuthorizationCode) {
            return Err(AuthError::unauthorized_client(
                "Client not authorized for authorization_code grant",
            ));
        }

        // 2. Extract required parameters
        let code = request
            .code
            .as_ref()
            .ok_or_else(|| AuthError::invalid_request("Missing code parameter"))?;
        let redirect_uri = request
            .redirect_uri
            .as_ref()
            .ok_or_else(|| AuthError::invalid_request("Missing redirect_uri parameter"))?;
        let code_verifier = request
            .code_verifier
            .as_ref()
            .ok_or_else(|| AuthError::invalid_request("Missing code_verifier parameter"))?;

        // 3. Consume the code atomically
        let session = match self.session_storage.consume(code).await? {
            CodeConsumption::Consumed(session) => session,
            CodeConsumption::NotFound => {
                debug!("authorization code not found");
                return Err(AuthError::invalid_grant("Invalid authorization code"));
            }
            CodeConsumption::Replayed(session) => {
                return self.handle_code_replay(&session).await;
            }
        };

        // 4. Validate the consumed session
        if session.is_expired() {
            debug!(session_id = %session.id, "authorization code expired");
            return Err(AuthError::invalid_grant("Authorization code has expired"));
        }

        if session.client_id != client.client_id {
            debug!(
                session_id = %session.id,
                "authorization code presented by a different client"
            );
            return Err(AuthError::invalid_grant(
                "Authorization code was issued to a different client",
            ));
        }

        // Byte-exact comparison against the URI from the authorization request
        if session.redirect_uri != *redirect_uri {
            debug!(session_id = %session.id, "redirect_uri mismatch");
            return Err(AuthError::invalid_grant("Redirect URI mismatch"));
        }

        // 5. Verify PKCE
        let verifier = PkceVerifier::new(code_verifier.clone())
            .map_err(|e| AuthError::invalid_grant(e.to_string()))?;
        let challenge = PkceChallenge::new(session.code_challenge.clone())
            .map_err(|e| AuthError::internal(e.to_string()))?;
        challenge.verify(&verifier).map_err(|e| {
            debug!(session_id = %session.id, "PKCE verification failed");
            AuthError::invalid_grant(e.to_string())
        })?;

        // 6. Mint the token pair for the granted scope
        self.token_service
            .issue_pair(client, &session.user_id, &session.scope)
            .await
    }

    /// Contains a replayed authorization code.
    ///
    /// A replayed code means the code leaked (or the legitimate client
    /// retried after a network failure; indistinguishable from here). As a
    /// precaution, every refresh token family this client holds for the
    /// granting user is revoked.
    async fn handle_code_replay(
        &self,
        session: &AuthorizationSession,
    ) -> AuthResult<TokenResponse> {
        let revoked = self
            .revocation
            .revoke_user_client_tokens(&session.user_id, &session.client_id)
            .await?;

        warn!(
            session_id = %session.id,
            client_id = %session.client_id,
            tokens_revoked = revoked,
            "authorization code replay detected, token families revoked"
        );

        Err(AuthError::invalid_grant("Invalid authorization code"))
    }
}

//! Token revocation (RFC 7009).
//!
//! Revocation is immediate: tokens are validated by storage lookup, so a
//! revoked token fails on its next use with no propagation delay.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::storage::access_token::AccessTokenStorage;
use crate::storage::refresh_token::RefreshTokenStorage;
use crate::types::hash_token;
use crate::AuthResult;

/// Hint for which kind of token is being revoked (RFC 7009 Section 2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenTypeHint {
    AccessToken,
    RefreshToken,
}

/// Revocation request per RFC 7009 Section 2.1.
#[derive(Debug, Clone, Deserialize)]
pub struct RevocationRequest {
    /// The plaintext token the client wants invalidated.
    pub token: String,

    /// Optional hint; a wrong hint only costs an extra lookup.
    #[serde(default)]
    pub token_type_hint: Option<TokenTypeHint>,
}

/// Service for revoking issued tokens.
///
/// Revoking a refresh token kills its whole rotation family; a client
/// that gives up a grant should not retain siblings of the surrendered
/// token.
#[derive(Clone)]
pub struct RevocationService {
    access_token_storage: Arc<dyn AccessTokenStorage>,
    refresh_token_storage: Arc<dyn RefreshTokenStorage>,
}

impl RevocationService {
    /// Creates a new revocation service.
    #[must_use]
    pub fn new(
        access_token_storage: Arc<dyn AccessTokenStorage>,
        refresh_token_storage: Arc<dyn RefreshTokenStorage>,
    ) -> Self {
        Self {
            access_token_storage,
            refresh_token_storage,
        }
    }

    /// Revokes a token presented by the client that owns it.
    ///
    /// Per RFC 7009 the endpoint succeeds even when the token is unknown,
    /// already revoked, or belongs to a different client; a caller must
    /// not be able to probe the token store through this path.
    ///
    /// # Errors
    ///
    /// Returns an error only if storage fails.
    pub async fn revoke(&self, request: &RevocationRequest, client_id: &str) -> AuthResult<()> {
        let token_hash = hash_token(&request.token);

        // Try the hinted kind first, then the other
        match request.token_type_hint {
            Some(TokenTypeHint::AccessToken) => {
                if self.try_revoke_access(&token_hash, client_id).await? {
                    return Ok(());
                }
                self.try_revoke_refresh(&token_hash, client_id).await?;
            }
            _ => {
                if self.try_revoke_refresh(&token_hash, client_id).await? {
                    return Ok(());
                }
                self.try_revoke_access(&token_hash, client_id).await?;
            }
        }

        Ok(())
    }

    /// Revokes every token in a refresh token rotation family, along with
    /// the access tokens minted from it.
    ///
    /// Returns the total number of tokens revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub async fn revoke_family(&self, family_id: Uuid) -> AuthResult<u64> {
        let refresh = self.refresh_token_storage.revoke_family(family_id).await?;
        let access = self.access_token_storage.revoke_family(family_id).await?;
        info!(
            family_id = %family_id,
            refresh_revoked = refresh,
            access_revoked = access,
            "revoked token family"
        );
        Ok(refresh + access)
    }

    /// Revokes every token a user holds with one specific client.
    ///
    /// Each of the user's active refresh tokens for that client names a
    /// rotation family; all of those families go down, access tokens
    /// included. Returns the total number of tokens revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub async fn revoke_user_client_tokens(
        &self,
        user_id: &str,
        client_id: &str,
    ) -> AuthResult<u64> {
        let families: std::collections::HashSet<Uuid> = self
            .refresh_token_storage
            .list_by_user(user_id)
            .await?
            .into_iter()
            .filter(|t| t.client_id == client_id)
            .map(|t| t.family_id)
            .collect();

        let mut revoked = 0;
        for family_id in families {
            revoked += self.revoke_family(family_id).await?;
        }
        Ok(revoked)
    }

    /// Revokes all tokens issued to a user, across clients.
    ///
    /// Used on logout-everywhere, password change, or account compromise.
    /// Returns the total number of tokens revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub async fn revoke_user_tokens(&self, user_id: &str) -> AuthResult<u64> {
        let access = self.access_token_storage.revoke_by_user(user_id).await?;
        let refresh = self.refresh_token_storage.revoke_by_user(user_id).await?;
        info!(
            user_id = %user_id,
            access_revoked = access,
            refresh_revoked = refresh,
            "revoked all user tokens"
        );
        Ok(access + refresh)
    }

    /// Revokes all tokens issued to a client.
    ///
    /// Used when a client registration is deleted or compromised.
    /// Returns the total number of tokens revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub async fn revoke_client_tokens(&self, client_id: &str) -> AuthResult<u64> {
        let access = self.access_token_storage.revoke_by_client(client_id).await?;
        let refresh = self
            .refresh_token_storage
            .revoke_by_client(client_id)
            .await?;
        info!(
            client_id = %client_id,
            access_revoked = access,
            refresh_revoked = refresh,
            "revoked all client tokens"
        );
        Ok(access + refresh)
    }

    async fn try_revoke_access(&self, token_hash: &str, client_id: &str) -> AuthResult<bool> {
        match self.access_token_storage.find_by_hash(token_hash).await? {
            Some(token) if token.client_id == client_id => {
                self.access_token_storage.revoke(token_hash).await?;
                debug!(client_id = %client_id, "revoked access token");
                Ok(true)
            }
            Some(_) => {
                // Token belongs to a different client; silently ignore
                debug!("revocation request for another client's token ignored");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn try_revoke_refresh(&self, token_hash: &str, client_id: &str) -> AuthResult<bool> {
        match self.refresh_token_storage.find_by_hash(token_hash).await? {
            Some(token) if token.client_id == client_id => {
                self.revoke_family(token.family_id).await?;
                Ok(true)
            }
            Some(_) => {
                debug!("revocation request for another client's token ignored");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

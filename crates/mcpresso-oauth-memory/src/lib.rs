//! In-memory storage backend for the mcpresso OAuth engine.
//!
//! Implements every storage trait the engine depends on over
//! `tokio::sync::RwLock`-guarded maps. The two atomic primitives — code
//! consumption and refresh token rotation — each run under a single write
//! lock, so concurrent exchanges observe exactly one winner.
//!
//! Suitable for tests, demos, and single-process deployments; state does
//! not survive a restart.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mcpresso_oauth_memory::MemoryStorage;
//!
//! let storage = Arc::new(MemoryStorage::new());
//! // storage implements ClientStorage, UserStorage, SessionStorage,
//! // AccessTokenStorage, and RefreshTokenStorage
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use mcpresso_oauth::error::AuthError;
use mcpresso_oauth::oauth::AuthorizationSession;
use mcpresso_oauth::storage::{
    AccessTokenStorage, ClientStorage, CodeConsumption, RefreshTokenStorage, RotationOutcome,
    SessionStorage, UserStorage,
};
use mcpresso_oauth::types::{AccessToken, Client, RefreshToken, User};
use mcpresso_oauth::AuthResult;

/// In-memory implementation of all engine storage traits.
///
/// Sessions are keyed by authorization code, tokens by their SHA-256 hash,
/// clients and users by id.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    sessions: RwLock<HashMap<String, AuthorizationSession>>,
    refresh_tokens: RwLock<HashMap<String, RefreshToken>>,
    access_tokens: RwLock<HashMap<String, AccessToken>>,
    clients: RwLock<HashMap<String, Client>>,
    users: RwLock<HashMap<String, User>>,
}

impl MemoryStorage {
    /// Creates a new empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user.
    ///
    /// Convenience for seeding test and demo users. Unlike
    /// `UserStorage::create` this replaces any existing user with the
    /// same id.
    pub async fn add_user(&self, user: User) {
        let mut users = self.users.write().await;
        users.insert(user.id.clone(), user);
    }

    /// Removes a user.
    ///
    /// Returns `true` if a user was removed. Issued tokens are not touched;
    /// revoke them separately.
    pub async fn remove_user(&self, user_id: &str) -> bool {
        let mut users = self.users.write().await;
        users.remove(user_id).is_some()
    }
}

// ===== SessionStorage =====

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn create(&self, session: &AuthorizationSession) -> AuthResult<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.code) {
            return Err(AuthError::storage("Duplicate authorization code"));
        }
        sessions.insert(session.code.clone(), session.clone());
        Ok(())
    }

    async fn find_by_code(&self, code: &str) -> AuthResult<Option<AuthorizationSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(code).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<AuthorizationSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.values().find(|s| s.id == id).cloned())
    }

    async fn consume(&self, code: &str) -> AuthResult<CodeConsumption> {
        // Single write lock covers the check and the flip, so two
        // concurrent exchanges of the same code serialize here.
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(code) {
            None => Ok(CodeConsumption::NotFound),
            Some(session) if session.consumed_at.is_some() => {
                Ok(CodeConsumption::Replayed(session.clone()))
            }
            Some(session) => {
                let snapshot = session.clone();
                session.consumed_at = Some(OffsetDateTime::now_utc());
                Ok(CodeConsumption::Consumed(snapshot))
            }
        }
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        let removed = (before - sessions.len()) as u64;
        if removed > 0 {
            debug!(removed, "cleaned up expired sessions");
        }
        Ok(removed)
    }

    async fn delete_by_client(&self, client_id: &str) -> AuthResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.client_id != client_id);
        Ok((before - sessions.len()) as u64)
    }
}

// ===== RefreshTokenStorage =====

#[async_trait]
impl RefreshTokenStorage for MemoryStorage {
    async fn create(&self, token: &RefreshToken) -> AuthResult<()> {
        let mut tokens = self.refresh_tokens.write().await;
        if tokens.contains_key(&token.token_hash) {
            return Err(AuthError::storage("Duplicate refresh token hash"));
        }
        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>> {
        let tokens = self.refresh_tokens.read().await;
        Ok(tokens.get(token_hash).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<RefreshToken>> {
        let tokens = self.refresh_tokens.read().await;
        Ok(tokens.values().find(|t| t.id == id).cloned())
    }

    async fn rotate(
        &self,
        old_hash: &str,
        replacement: &RefreshToken,
    ) -> AuthResult<RotationOutcome> {
        // Retire-and-replace under one write lock; two concurrent
        // rotations of the same token see exactly one Rotated outcome.
        let mut tokens = self.refresh_tokens.write().await;
        match tokens.get_mut(old_hash) {
            None => Err(AuthError::invalid_grant("Invalid refresh token")),
            Some(old) if old.revoked_at.is_some() => Ok(RotationOutcome::AlreadyRotated),
            Some(old) => {
                old.revoked_at = Some(OffsetDateTime::now_utc());
                tokens.insert(replacement.token_hash.clone(), replacement.clone());
                Ok(RotationOutcome::Rotated)
            }
        }
    }

    async fn revoke(&self, token_hash: &str) -> AuthResult<()> {
        let mut tokens = self.refresh_tokens.write().await;
        let token = tokens
            .get_mut(token_hash)
            .ok_or_else(|| AuthError::invalid_grant("Refresh token not found"))?;
        if token.revoked_at.is_none() {
            token.revoked_at = Some(OffsetDateTime::now_utc());
        }
        Ok(())
    }

    async fn revoke_family(&self, family_id: Uuid) -> AuthResult<u64> {
        let mut tokens = self.refresh_tokens.write().await;
        let now = OffsetDateTime::now_utc();
        let mut revoked = 0;
        for token in tokens.values_mut() {
            if token.family_id == family_id && token.revoked_at.is_none() {
                token.revoked_at = Some(now);
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn revoke_by_client(&self, client_id: &str) -> AuthResult<u64> {
        let mut tokens = self.refresh_tokens.write().await;
        let now = OffsetDateTime::now_utc();
        let mut revoked = 0;
        for token in tokens.values_mut() {
            if token.client_id == client_id && token.revoked_at.is_none() {
                token.revoked_at = Some(now);
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn revoke_by_user(&self, user_id: &str) -> AuthResult<u64> {
        let mut tokens = self.refresh_tokens.write().await;
        let now = OffsetDateTime::now_utc();
        let mut revoked = 0;
        for token in tokens.values_mut() {
            if token.user_id == user_id && token.revoked_at.is_none() {
                token.revoked_at = Some(now);
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut tokens = self.refresh_tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| t.is_valid());
        let removed = (before - tokens.len()) as u64;
        if removed > 0 {
            debug!(removed, "cleaned up expired refresh tokens");
        }
        Ok(removed)
    }

    async fn list_by_user(&self, user_id: &str) -> AuthResult<Vec<RefreshToken>> {
        let tokens = self.refresh_tokens.read().await;
        Ok(tokens
            .values()
            .filter(|t| t.user_id == user_id && t.is_valid())
            .cloned()
            .collect())
    }
}

// ===== AccessTokenStorage =====

#[async_trait]
impl AccessTokenStorage for MemoryStorage {
    async fn create(&self, token: &AccessToken) -> AuthResult<()> {
        let mut tokens = self.access_tokens.write().await;
        if tokens.contains_key(&token.token_hash) {
            return Err(AuthError::storage("Duplicate access token hash"));
        }
        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<AccessToken>> {
        let tokens = self.access_tokens.read().await;
        Ok(tokens.get(token_hash).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<AccessToken>> {
        let tokens = self.access_tokens.read().await;
        Ok(tokens.values().find(|t| t.id == id).cloned())
    }

    async fn revoke(&self, token_hash: &str) -> AuthResult<()> {
        let mut tokens = self.access_tokens.write().await;
        let token = tokens
            .get_mut(token_hash)
            .ok_or_else(|| AuthError::invalid_grant("Access token not found"))?;
        if token.revoked_at.is_none() {
            token.revoked_at = Some(OffsetDateTime::now_utc());
        }
        Ok(())
    }

    async fn revoke_family(&self, family_id: Uuid) -> AuthResult<u64> {
        let mut tokens = self.access_tokens.write().await;
        let now = OffsetDateTime::now_utc();
        let mut revoked = 0;
        for token in tokens.values_mut() {
            if token.family_id == Some(family_id) && token.revoked_at.is_none() {
                token.revoked_at = Some(now);
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn revoke_by_client(&self, client_id: &str) -> AuthResult<u64> {
        let mut tokens = self.access_tokens.write().await;
        let now = OffsetDateTime::now_utc();
        let mut revoked = 0;
        for token in tokens.values_mut() {
            if token.client_id == client_id && token.revoked_at.is_none() {
                token.revoked_at = Some(now);
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn revoke_by_user(&self, user_id: &str) -> AuthResult<u64> {
        let mut tokens = self.access_tokens.write().await;
        let now = OffsetDateTime::now_utc();
        let mut revoked = 0;
        for token in tokens.values_mut() {
            if token.user_id == user_id && token.revoked_at.is_none() {
                token.revoked_at = Some(now);
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut tokens = self.access_tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| t.is_valid());
        let removed = (before - tokens.len()) as u64;
        if removed > 0 {
            debug!(removed, "cleaned up expired access tokens");
        }
        Ok(removed)
    }
}

// ===== ClientStorage =====

#[async_trait]
impl ClientStorage for MemoryStorage {
    async fn create(&self, client: &Client) -> AuthResult<()> {
        let mut clients = self.clients.write().await;
        if clients.contains_key(&client.client_id) {
            return Err(AuthError::storage("Client already registered"));
        }
        clients.insert(client.client_id.clone(), client.clone());
        Ok(())
    }

    async fn find_by_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
        let clients = self.clients.read().await;
        Ok(clients.get(client_id).cloned())
    }

    async fn update(&self, client: &Client) -> AuthResult<()> {
        let mut clients = self.clients.write().await;
        if !clients.contains_key(&client.client_id) {
            return Err(AuthError::storage("Client not found"));
        }
        clients.insert(client.client_id.clone(), client.clone());
        Ok(())
    }

    async fn delete(&self, client_id: &str) -> AuthResult<bool> {
        let mut clients = self.clients.write().await;
        Ok(clients.remove(client_id).is_some())
    }

    async fn list(&self) -> AuthResult<Vec<Client>> {
        let clients = self.clients.read().await;
        Ok(clients.values().cloned().collect())
    }
}

// ===== UserStorage =====

#[async_trait]
impl UserStorage for MemoryStorage {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(AuthError::storage("User already exists"));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &str) -> AuthResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }
}

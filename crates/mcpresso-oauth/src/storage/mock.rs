//! In-memory mock storages for unit tests.
//!
//! These mirror the semantics the traits demand (including atomic consume
//! and rotate under a single write lock) without pulling in a real backend.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AuthError;
use crate::oauth::session::AuthorizationSession;
use crate::storage::access_token::AccessTokenStorage;
use crate::storage::client::ClientStorage;
use crate::storage::refresh_token::{RefreshTokenStorage, RotationOutcome};
use crate::storage::session::{CodeConsumption, SessionStorage};
use crate::storage::user::UserStorage;
use crate::types::access_token::AccessToken;
use crate::types::client::Client;
use crate::types::refresh_token::RefreshToken;
use crate::types::user::User;
use crate::AuthResult;

fn lock_poisoned() -> AuthError {
    AuthError::internal("mock storage lock poisoned")
}

// ===== Sessions =====

#[derive(Default)]
pub struct MockSessionStorage {
    // keyed by authorization code
    sessions: RwLock<HashMap<String, AuthorizationSession>>,
}

impl MockSessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for MockSessionStorage {
    async fn create(&self, session: &AuthorizationSession) -> AuthResult<()> {
        let mut sessions = self.sessions.write().map_err(|_| lock_poisoned())?;
        sessions.insert(session.code.clone(), session.clone());
        Ok(())
    }

    async fn find_by_code(&self, code: &str) -> AuthResult<Option<AuthorizationSession>> {
        let sessions = self.sessions.read().map_err(|_| lock_poisoned())?;
        Ok(sessions.get(code).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<AuthorizationSession>> {
        let sessions = self.sessions.read().map_err(|_| lock_poisoned())?;
        Ok(sessions.values().find(|s| s.id == id).cloned())
    }

    async fn consume(&self, code: &str) -> AuthResult<CodeConsumption> {
        let mut sessions = self.sessions.write().map_err(|_| lock_poisoned())?;
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
        let mut sessions = self.sessions.write().map_err(|_| lock_poisoned())?;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        Ok((before - sessions.len()) as u64)
    }

    async fn delete_by_client(&self, client_id: &str) -> AuthResult<u64> {
        let mut sessions = self.sessions.write().map_err(|_| lock_poisoned())?;
        let before = sessions.len();
        sessions.retain(|_, s| s.client_id != client_id);
        Ok((before - sessions.len()) as u64)
    }
}

// ===== Refresh tokens =====

#[derive(Default)]
pub struct MockRefreshTokenStorage {
    // keyed by token hash
    tokens: RwLock<HashMap<String, RefreshToken>>,
}

impl MockRefreshTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenStorage for MockRefreshTokenStorage {
    async fn create(&self, token: &RefreshToken) -> AuthResult<()> {
        let mut tokens = self.tokens.write().map_err(|_| lock_poisoned())?;
        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>> {
        let tokens = self.tokens.read().map_err(|_| lock_poisoned())?;
        Ok(tokens.get(token_hash).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<RefreshToken>> {
        let tokens = self.tokens.read().map_err(|_| lock_poisoned())?;
        Ok(tokens.values().find(|t| t.id == id).cloned())
    }

    async fn rotate(
        &self,
        old_hash: &str,
        replacement: &RefreshToken,
    ) -> AuthResult<RotationOutcome> {
        let mut tokens = self.tokens.write().map_err(|_| lock_poisoned())?;
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
        let mut tokens = self.tokens.write().map_err(|_| lock_poisoned())?;
        let token = tokens
            .get_mut(token_hash)
            .ok_or_else(|| AuthError::invalid_grant("Refresh token not found"))?;
        if token.revoked_at.is_none() {
            token.revoked_at = Some(OffsetDateTime::now_utc());
        }
        Ok(())
    }

    async fn revoke_family(&self, family_id: Uuid) -> AuthResult<u64> {
        let mut tokens = self.tokens.write().map_err(|_| lock_poisoned())?;
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
        let mut tokens = self.tokens.write().map_err(|_| lock_poisoned())?;
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
        let mut tokens = self.tokens.write().map_err(|_| lock_poisoned())?;
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
        let mut tokens = self.tokens.write().map_err(|_| lock_poisoned())?;
        let before = tokens.len();
        tokens.retain(|_, t| t.is_valid());
        Ok((before - tokens.len()) as u64)
    }

    async fn list_by_user(&self, user_id: &str) -> AuthResult<Vec<RefreshToken>> {
        let tokens = self.tokens.read().map_err(|_| lock_poisoned())?;
        Ok(tokens
            .values()
            .filter(|t| t.user_id == user_id && t.is_valid())
            .cloned()
            .collect())
    }
}

// ===== Access tokens =====

#[derive(Default)]
pub struct MockAccessTokenStorage {
    tokens: RwLock<HashMap<String, AccessToken>>,
}

impl MockAccessTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessTokenStorage for MockAccessTokenStorage {
    async fn create(&self, token: &AccessToken) -> AuthResult<()> {
        let mut tokens = self.tokens.write().map_err(|_| lock_poisoned())?;
        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<AccessToken>> {
        let tokens = self.tokens.read().map_err(|_| lock_poisoned())?;
        Ok(tokens.get(token_hash).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<AccessToken>> {
        let tokens = self.tokens.read().map_err(|_| lock_poisoned())?;
        Ok(tokens.values().find(|t| t.id == id).cloned())
    }

    async fn revoke(&self, token_hash: &str) -> AuthResult<()> {
        let mut tokens = self.tokens.write().map_err(|_| lock_poisoned())?;
        let token = tokens
            .get_mut(token_hash)
            .ok_or_else(|| AuthError::invalid_grant("Access token not found"))?;
        if token.revoked_at.is_none() {
            token.revoked_at = Some(OffsetDateTime::now_utc());
        }
        Ok(())
    }

    async fn revoke_family(&self, family_id: Uuid) -> AuthResult<u64> {
        let mut tokens = self.tokens.write().map_err(|_| lock_poisoned())?;
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
        let mut tokens = self.tokens.write().map_err(|_| lock_poisoned())?;
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
        let mut tokens = self.tokens.write().map_err(|_| lock_poisoned())?;
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
        let mut tokens = self.tokens.write().map_err(|_| lock_poisoned())?;
        let before = tokens.len();
        tokens.retain(|_, t| t.is_valid());
        Ok((before - tokens.len()) as u64)
    }
}

// ===== Clients =====

#[derive(Default)]
pub struct MockClientStorage {
    clients: RwLock<HashMap<String, Client>>,
}

impl MockClientStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientStorage for MockClientStorage {
    async fn create(&self, client: &Client) -> AuthResult<()> {
        let mut clients = self.clients.write().map_err(|_| lock_poisoned())?;
        if clients.contains_key(&client.client_id) {
            return Err(AuthError::invalid_request("Client already registered"));
        }
        clients.insert(client.client_id.clone(), client.clone());
        Ok(())
    }

    async fn find_by_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
        let clients = self.clients.read().map_err(|_| lock_poisoned())?;
        Ok(clients.get(client_id).cloned())
    }

    async fn update(&self, client: &Client) -> AuthResult<()> {
        let mut clients = self.clients.write().map_err(|_| lock_poisoned())?;
        if !clients.contains_key(&client.client_id) {
            return Err(AuthError::invalid_client("Client not found"));
        }
        clients.insert(client.client_id.clone(), client.clone());
        Ok(())
    }

    async fn delete(&self, client_id: &str) -> AuthResult<bool> {
        let mut clients = self.clients.write().map_err(|_| lock_poisoned())?;
        Ok(clients.remove(client_id).is_some())
    }

    async fn list(&self) -> AuthResult<Vec<Client>> {
        let clients = self.clients.read().map_err(|_| lock_poisoned())?;
        Ok(clients.values().cloned().collect())
    }
}

// ===== Users =====

#[derive(Default)]
pub struct MockUserStorage {
    users: RwLock<HashMap<String, User>>,
}

impl MockUserStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: User) -> Self {
        self.users
            .write()
            .expect("fresh lock")
            .insert(user.id.clone(), user);
        self
    }
}

#[async_trait]
impl UserStorage for MockUserStorage {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().map_err(|_| lock_poisoned())?;
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &str) -> AuthResult<Option<User>> {
        let users = self.users.read().map_err(|_| lock_poisoned())?;
        Ok(users.get(user_id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let users = self.users.read().map_err(|_| lock_poisoned())?;
        Ok(users.values().find(|u| u.username == username).cloned())
    }
}

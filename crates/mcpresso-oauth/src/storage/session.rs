//! Authorization session storage trait.
//!
//! This module defines the storage interface for authorization sessions
//! used during the OAuth 2.1 authorization code flow.
//!
//! # Implementation Notes
//!
//! Implementations should:
//!
//! - Store sessions securely (authorization codes are sensitive)
//! - Support efficient lookup by authorization code
//! - Ensure atomicity for consume operations (prevent replay attacks)
//! - Clean up expired sessions periodically
//!
//! # Security Considerations
//!
//! - Never log authorization codes
//! - Ensure consume is atomic to prevent race conditions
//! - Implement proper access controls on the storage backend

use async_trait::async_trait;
use uuid::Uuid;

use crate::oauth::session::AuthorizationSession;
use crate::AuthResult;

/// Outcome of an atomic code-consume operation.
///
/// The distinction between `Consumed` and `Replayed` matters: a replayed
/// code is a sign the code leaked, and the caller is expected to contain
/// the damage (revoke tokens derived from the session).
#[derive(Debug, Clone)]
pub enum CodeConsumption {
    /// No session exists for this code.
    NotFound,

    /// The code was live and has now been marked consumed.
    /// Carries the session as it was before consumption.
    Consumed(AuthorizationSession),

    /// The code had already been consumed by an earlier exchange.
    /// Carries the session so the caller can identify what leaked.
    Replayed(AuthorizationSession),
}

/// Storage trait for authorization sessions.
///
/// This trait defines the interface for persisting authorization sessions
/// during the OAuth 2.1 authorization code flow. Sessions are created when
/// an authorization request is granted and consumed when the code is
/// exchanged for tokens.
///
/// # Example Implementation
///
/// ```ignore
/// use mcpresso_oauth::storage::SessionStorage;
/// use mcpresso_oauth::oauth::AuthorizationSession;
/// use mcpresso_oauth::AuthResult;
///
/// struct InMemorySessionStorage {
///     sessions: std::sync::RwLock<std::collections::HashMap<String, AuthorizationSession>>,
/// }
///
/// #[async_trait::async_trait]
/// impl SessionStorage for InMemorySessionStorage {
///     async fn create(&self, session: &AuthorizationSession) -> AuthResult<()> {
///         let mut sessions = self.sessions.write().unwrap();
///         sessions.insert(session.code.clone(), session.clone());
///         Ok(())
///     }
///     // ... other methods
/// }
/// ```
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Creates a new authorization session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be stored (e.g., duplicate code,
    /// storage unavailable).
    async fn create(&self, session: &AuthorizationSession) -> AuthResult<()>;

    /// Finds a session by authorization code.
    ///
    /// Returns `Some(session)` if found, `None` if not found.
    /// This method returns sessions regardless of their consumed/expired status;
    /// callers should check `is_valid()` before using.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_code(&self, code: &str) -> AuthResult<Option<AuthorizationSession>>;

    /// Finds a session by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<AuthorizationSession>>;

    /// Consumes an authorization code (marks as used).
    ///
    /// This operation must be atomic: two concurrent exchanges of the same
    /// code must observe exactly one `Consumed` and one `Replayed` outcome.
    /// Checking the session and then marking it in two steps is not an
    /// acceptable implementation.
    ///
    /// Expiry is NOT checked here; the caller validates `expires_at` on the
    /// returned session. Keeping the primitive purely about single-use makes
    /// the atomicity requirement implementable as a single conditional
    /// update.
    ///
    /// # Atomicity
    ///
    /// A SQL backend would implement this as:
    ///
    /// ```sql
    /// UPDATE sessions
    /// SET consumed_at = NOW()
    /// WHERE code = $1 AND consumed_at IS NULL
    /// RETURNING *
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage operation itself fails. All
    /// grant-level outcomes are expressed through [`CodeConsumption`].
    async fn consume(&self, code: &str) -> AuthResult<CodeConsumption>;

    /// Deletes expired sessions.
    ///
    /// Should be called periodically to clean up old sessions and
    /// prevent storage growth.
    ///
    /// Returns the number of sessions deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;

    /// Deletes all sessions for a specific client.
    ///
    /// Used when a client is deleted or compromised to invalidate
    /// all pending authorizations.
    ///
    /// Returns the number of sessions deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion fails.
    async fn delete_by_client(&self, client_id: &str) -> AuthResult<u64>;
}

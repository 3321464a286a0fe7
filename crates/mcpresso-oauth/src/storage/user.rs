//! User storage trait.

use async_trait::async_trait;

use crate::types::user::User;
use crate::AuthResult;

/// Storage trait for resource owners.
///
/// The engine itself only reads users; account management belongs to the
/// embedding application, which writes through `create`.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Stores a new user.
    ///
    /// # Errors
    ///
    /// Returns an error if the user cannot be stored (e.g., duplicate id).
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Finds a user by id.
    ///
    /// Returns `Some(user)` if found, `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, user_id: &str) -> AuthResult<Option<User>>;

    /// Finds a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>>;
}

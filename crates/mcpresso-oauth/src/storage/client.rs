//! Client storage trait.
//!
//! This module defines the storage interface for OAuth client registrations.

use async_trait::async_trait;

use crate::types::client::Client;
use crate::AuthResult;

/// Storage trait for OAuth client registrations.
///
/// Client records hold only hashed secrets; implementations never see a
/// plaintext credential.
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Stores a new client registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be stored (e.g., duplicate
    /// client_id, storage unavailable).
    async fn create(&self, client: &Client) -> AuthResult<()>;

    /// Finds a client by its client_id.
    ///
    /// Returns `Some(client)` if found, `None` if not found. Inactive
    /// clients are returned too; callers check `active` themselves.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, client_id: &str) -> AuthResult<Option<Client>>;

    /// Updates an existing client registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not found or the update fails.
    async fn update(&self, client: &Client) -> AuthResult<()>;

    /// Deletes a client registration.
    ///
    /// Returns `true` if a client was deleted, `false` if none existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion fails.
    async fn delete(&self, client_id: &str) -> AuthResult<bool>;

    /// Lists all registered clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    async fn list(&self) -> AuthResult<Vec<Client>>;
}

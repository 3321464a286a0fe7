//! Client registration and authentication.
//!
//! The registry owns the client lifecycle: registration (with credential
//! generation), lookup, and authentication at the token endpoint. Secrets
//! are returned exactly once at registration and stored only as Argon2id
//! hashes.

use std::sync::Arc;

use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::error::AuthError;
use crate::secret::{generate_client_id, generate_client_secret, hash_secret, verify_secret};
use crate::storage::client::ClientStorage;
use crate::types::{Client, GrantType};
use crate::AuthResult;

/// Metadata supplied when registering a new client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRegistration {
    /// Human-readable client name.
    pub name: String,

    /// Allowed redirect URIs (exact-match set).
    pub redirect_uris: Vec<String>,

    /// Scopes the client may request. Empty means any scope.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Grant types the client may use.
    pub grant_types: Vec<GrantType>,

    /// Whether the client can keep a secret. Confidential clients get a
    /// generated secret and must authenticate at the token endpoint.
    pub confidential: bool,

    /// Per-client access token lifetime override, in seconds.
    #[serde(default)]
    pub access_token_lifetime: Option<i64>,

    /// Per-client refresh token lifetime override, in seconds.
    #[serde(default)]
    pub refresh_token_lifetime: Option<i64>,
}

/// Result of a successful client registration.
///
/// `client_secret` is the only place the plaintext secret ever appears;
/// it cannot be recovered afterwards.
#[derive(Debug, Clone)]
pub struct RegisteredClient {
    /// The stored client record (secret hashed).
    pub client: Client,

    /// Plaintext secret for confidential clients. `None` for public clients.
    pub client_secret: Option<String>,
}

/// Registry for OAuth client registrations.
pub struct ClientRegistry {
    client_storage: Arc<dyn ClientStorage>,
}

impl ClientRegistry {
    /// Creates a new client registry.
    #[must_use]
    pub fn new(client_storage: Arc<dyn ClientStorage>) -> Self {
        Self { client_storage }
    }

    /// Registers a new client.
    ///
    /// Generates a client id, and for confidential clients a secret. The
    /// secret is returned in plaintext exactly once; only its Argon2id hash
    /// is stored.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the registration metadata is invalid,
    /// `Internal` if secret hashing fails, or a storage error.
    pub async fn register(&self, registration: ClientRegistration) -> AuthResult<RegisteredClient> {
        let client_id = generate_client_id();

        let (plaintext_secret, secret_hash) = if registration.confidential {
            let secret = generate_client_secret();
            let hash = hash_secret(&secret)
                .map_err(|e| AuthError::internal(format!("Secret hashing failed: {e}")))?;
            (Some(secret), Some(hash))
        } else {
            (None, None)
        };

        let client = Client {
            client_id,
            client_secret: secret_hash,
            name: registration.name,
            redirect_uris: registration.redirect_uris,
            scopes: registration.scopes,
            grant_types: registration.grant_types,
            confidential: registration.confidential,
            active: true,
            access_token_lifetime: registration.access_token_lifetime,
            refresh_token_lifetime: registration.refresh_token_lifetime,
            created_at: OffsetDateTime::now_utc(),
        };

        client
            .validate()
            .map_err(|e| AuthError::invalid_request(e.to_string()))?;

        self.client_storage.create(&client).await?;

        info!(
            client_id = %client.client_id,
            confidential = client.confidential,
            "registered client"
        );

        Ok(RegisteredClient {
            client,
            client_secret: plaintext_secret,
        })
    }

    /// Looks up a client by id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClient` if no client with the id exists.
    pub async fn lookup(&self, client_id: &str) -> AuthResult<Client> {
        self.client_storage
            .find_by_id(client_id)
            .await?
            .ok_or_else(|| AuthError::invalid_client("Unknown client"))
    }

    /// Authenticates a client at the token endpoint.
    ///
    /// Confidential clients must present their secret, which is verified
    /// against the stored Argon2id hash. Public clients present no secret
    /// (PKCE carries the proof for them); supplying one anyway is rejected.
    ///
    /// # Errors
    ///
    /// All authentication failures surface as `InvalidClient` with no
    /// distinction between unknown id, wrong secret, and deactivation.
    pub async fn authenticate(
        &self,
        client_id: &str,
        client_secret: Option<&str>,
    ) -> AuthResult<Client> {
        let client = self.lookup(client_id).await?;

        if !client.active {
            debug!(client_id = %client_id, "authentication attempt for deactivated client");
            return Err(AuthError::invalid_client("Client authentication failed"));
        }

        if client.confidential {
            let secret = client_secret
                .ok_or_else(|| AuthError::invalid_client("Client authentication failed"))?;
            let hash = client
                .client_secret
                .as_deref()
                .ok_or_else(|| AuthError::internal("Confidential client has no stored secret"))?;

            let valid = verify_secret(secret, hash)
                .map_err(|e| AuthError::internal(format!("Secret verification failed: {e}")))?;
            if !valid {
                debug!(client_id = %client_id, "client secret mismatch");
                return Err(AuthError::invalid_client("Client authentication failed"));
            }
        } else if client_secret.is_some() {
            debug!(client_id = %client_id, "public client presented a secret");
            return Err(AuthError::invalid_client("Client authentication failed"));
        }

        Ok(client)
    }

    /// Deactivates a client without deleting its registration.
    ///
    /// Deactivated clients fail authentication and authorization; issued
    /// tokens should be revoked separately.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClient` if the client does not exist.
    pub async fn deactivate(&self, client_id: &str) -> AuthResult<()> {
        let mut client = self.lookup(client_id).await?;
        client.active = false;
        self.client_storage.update(&client).await?;
        info!(client_id = %client_id, "deactivated client");
        Ok(())
    }

    /// Deletes a client registration.
    ///
    /// Returns `true` if a client was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub async fn delete(&self, client_id: &str) -> AuthResult<bool> {
        let deleted = self.client_storage.delete(client_id).await?;
        if deleted {
            info!(client_id = %client_id, "deleted client");
        }
        Ok(deleted)
    }

    /// Lists all registered clients.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub async fn list(&self) -> AuthResult<Vec<Client>> {
        self.client_storage.list().await
    }
}

//! Client credential generation and verification.
//!
//! This module provides cryptographically secure client-id/secret generation
//! and Argon2-based hashing for client authentication.
//!
//! # Security
//!
//! - Client ids embed 128 bits of randomness with a "client_" prefix
//! - Secrets are 256-bit random values (32 bytes), base64url-encoded
//! - Hashing uses Argon2id (hybrid mode) with default parameters
//! - Salts are generated using OsRng (cryptographically secure RNG)
//!
//! # Example
//!
//! ```
//! use mcpresso_oauth::secret::{generate_client_secret, hash_secret, verify_secret};
//!
//! // Generate a new secret
//! let secret = generate_client_secret();
//!
//! // Hash for storage
//! let hash = hash_secret(&secret).unwrap();
//!
//! // Verify later
//! assert!(verify_secret(&secret, &hash).unwrap());
//! ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;

/// Generate a new client identifier.
///
/// # Format
///
/// `client_{32 hex characters}` (39 characters total), embedding 128 bits of
/// randomness.
///
/// # Example
///
/// ```
/// use mcpresso_oauth::secret::generate_client_id;
///
/// let id = generate_client_id();
/// assert!(id.starts_with("client_"));
/// assert_eq!(id.len(), 39); // "client_" + 32 hex chars
/// ```
#[must_use]
pub fn generate_client_id() -> String {
    let bytes: [u8; 16] = rand::thread_rng().r#gen();
    format!("client_{}", hex::encode(bytes))
}

/// Generate a new cryptographically secure client secret.
///
/// The secret is a 256-bit (32 bytes) random value, base64url-encoded without
/// padding (43 characters).
#[must_use]
pub fn generate_client_secret() -> String {
    let bytes: [u8; 32] = rand::thread_rng().r#gen();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a secret (client secret or user password) for storage using Argon2id.
///
/// Uses Argon2id (hybrid mode) with:
/// - Cryptographically secure random salt (OsRng)
/// - Default parameters (memory cost, time cost, parallelism)
/// - PHC string format for storage
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if hashing fails (rare).
pub fn hash_secret(secret: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(secret.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a secret against a stored Argon2 hash.
///
/// # Returns
///
/// `Ok(true)` if the secret matches the hash, `Ok(false)` if it doesn't match.
/// Returns `Err` only if the hash format is invalid.
pub fn verify_secret(
    secret: &str,
    hash: &str,
) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    let result = Argon2::default().verify_password(secret.as_bytes(), &parsed_hash);
    Ok(result.is_ok())
}

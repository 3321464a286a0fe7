//! Domain types for clients, users, and tokens.

pub mod access_token;
pub mod client;
pub mod refresh_token;
pub mod user;

pub use access_token::AccessToken;
pub use client::{Client, ClientValidationError, GrantType};
pub use refresh_token::RefreshToken;
pub use user::User;

/// Generate a cryptographically secure opaque token.
///
/// Returns a 256-bit random value encoded as base64url (43 characters).
/// Used for authorization codes, access tokens, and refresh tokens alike.
#[must_use]
pub fn generate_token() -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    let mut bytes = [0u8; 32];
    rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a token value using SHA-256.
///
/// Used both when storing new tokens and when looking up tokens for
/// validation. Opaque tokens carry 256 bits of entropy, so a fast
/// unsalted hash is sufficient here (unlike client secrets, which a
/// user may have chosen and which get Argon2id).
#[must_use]
pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_format() {
        let token = generate_token();

        // 32 bytes base64url encoded = 43 characters
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_generate_token_uniqueness() {
        let tokens: Vec<String> = (0..100).map(|_| generate_token()).collect();

        let mut unique = tokens.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(tokens.len(), unique.len());
    }

    #[test]
    fn test_hash_token() {
        let token = "test-token-value";
        let hash = hash_token(token);

        // SHA-256 produces 64 hex characters
        assert_eq!(hash.len(), 64);

        // Same input produces same hash
        assert_eq!(hash, hash_token(token));

        // Different input produces different hash
        assert_ne!(hash, hash_token("different-token"));
    }
}

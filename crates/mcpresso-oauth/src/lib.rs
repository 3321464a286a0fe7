//! # mcpresso-oauth
//!
//! OAuth 2.1 authorization engine with mandatory PKCE, opaque tokens, and
//! refresh token rotation with reuse detection.
//!
//! This crate implements the core grant machinery of an OAuth 2.1
//! authorization server, independent of any HTTP framework:
//!
//! - Authorization code flow with PKCE (S256 only; "plain" is rejected)
//! - Opaque 256-bit access and refresh tokens, validated by storage lookup
//! - Refresh token rotation in families, with theft detection: reuse of a
//!   rotated-out token revokes the entire family
//! - Client registration with Argon2id-hashed secrets
//! - Pluggable storage via async traits, with two atomic primitives
//!   (code consumption and token rotation) that close the TOCTOU windows
//!   in the flow
//!
//! The HTTP layer is deliberately out of scope; an embedding server maps
//! requests onto [`AuthorizationService`], [`TokenService`],
//! [`RevocationService`], and [`ClientRegistry`] and renders the responses.
//!
//! ## Modules
//!
//! - [`error`] - Error types with OAuth error-code mapping
//! - [`oauth`] - Authorization code flow, PKCE, endpoint types
//! - [`registry`] - Client registration and authentication
//! - [`secret`] - Credential generation and Argon2id hashing
//! - [`storage`] - Storage traits the engine depends on
//! - [`token`] - Token issuance, introspection, and revocation
//! - [`types`] - Domain types for clients, users, and tokens

pub mod error;
pub mod oauth;
pub mod registry;
pub mod secret;
pub mod storage;
pub mod token;
pub mod types;

pub use error::AuthError;
pub use oauth::{
    AuthorizationConfig, AuthorizationRequest, AuthorizationResponse, AuthorizationService,
    AuthorizationSession, PkceChallenge, PkceChallengeMethod, PkceError, PkceVerifier,
    TokenRequest, TokenResponse,
};
pub use registry::{ClientRegistration, ClientRegistry, RegisteredClient};
pub use storage::{
    AccessTokenStorage, ClientStorage, CodeConsumption, RefreshTokenStorage, RotationOutcome,
    SessionStorage, UserStorage,
};
pub use token::{
    IntrospectionResponse, RevocationRequest, RevocationService, TokenConfig, TokenService,
    TokenTypeHint,
};
pub use types::{AccessToken, Client, GrantType, RefreshToken, User};

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

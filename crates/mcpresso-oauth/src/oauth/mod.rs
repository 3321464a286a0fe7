//! OAuth 2.1 authorization code flow.
//!
//! Endpoint request/response types, PKCE validation, authorization
//! sessions, and the service that orchestrates the grant and exchange
//! steps.

pub mod authorize;
pub mod pkce;
pub mod service;
pub mod session;
pub mod token;

pub use authorize::{
    AuthorizationErrorCode, AuthorizationErrorResponse, AuthorizationRequest,
    AuthorizationResponse,
};
pub use pkce::{PkceChallenge, PkceChallengeMethod, PkceError, PkceVerifier};
pub use service::{AuthorizationConfig, AuthorizationService};
pub use session::AuthorizationSession;
pub use token::{TokenError, TokenErrorCode, TokenRequest, TokenResponse};

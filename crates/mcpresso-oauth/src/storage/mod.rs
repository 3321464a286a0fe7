//! Storage traits for auth data persistence.
//!
//! Each entity gets its own async trait so backends can be composed or
//! split across stores. The two operations with correctness-critical
//! atomicity requirements — code consumption and refresh token rotation —
//! return explicit outcome enums rather than folding races into errors.

pub mod access_token;
pub mod client;
#[cfg(test)]
pub(crate) mod mock;
pub mod refresh_token;
pub mod session;
pub mod user;

pub use access_token::AccessTokenStorage;
pub use client::ClientStorage;
pub use refresh_token::{RefreshTokenStorage, RotationOutcome};
pub use session::{CodeConsumption, SessionStorage};
pub use user::UserStorage;

//! Token issuance, introspection, and revocation services.

pub mod introspection;
pub mod issuer;
pub mod revocation;

pub use introspection::IntrospectionResponse;
pub use issuer::{TokenConfig, TokenService};
pub use revocation::{RevocationRequest, RevocationService, TokenTypeHint};

//! Authentication and authorization
//!
//! - [`JwtService`] - session token signing and validation
//! - [`Session`] - explicit per-request identity + role
//! - [`authorize`] - the `(Role, Operation)` permission table
//! - [`extractor`] - axum extractors building a [`Session`] from a bearer token

pub mod extractor;
pub mod jwt;
pub mod permissions;
pub mod session;

pub use extractor::BearerToken;
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use permissions::{Operation, authorize};
pub use session::Session;

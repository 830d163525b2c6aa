//! Authentication infrastructure module
//!
//! This module provides JWT signing and the authenticator that issues and
//! verifies tokens against a user directory.

mod authenticator;
mod jwt;

pub use authenticator::{Authenticator, IssuedToken};
pub use jwt::{
    DEFAULT_TOKEN_LIFETIME_HOURS, JwtCodec, JwtConfig, MAX_TOKEN_LIFETIME_HOURS, SigningAlgorithm,
};

//! Domain layer - Core business logic and entities

pub mod auth;
pub mod error;
pub mod user;

pub use auth::{AuthError, AuthErrorKind, Clock, SystemClock, TokenClaims, UncheckedClaims};
pub use error::DomainError;
pub use user::{User, UserDirectory, UserId, UserRole};

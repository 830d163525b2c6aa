//! User domain
//!
//! Identity records and the directory trait the authenticator resolves
//! credentials and token subjects through.

mod directory;
mod entity;

pub use directory::UserDirectory;
pub use entity::{User, UserId, UserRole};

#[cfg(test)]
pub use directory::MockUserDirectory;

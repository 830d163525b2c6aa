//! User infrastructure module
//!
//! Directory implementations the authenticator can resolve users through.

mod directory;
mod postgres_directory;

pub use directory::InMemoryUserDirectory;
pub use postgres_directory::PostgresUserDirectory;

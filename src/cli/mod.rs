//! CLI module for the token authentication service
//!
//! Provides subcommands:
//! - `serve`: run the HTTP API
//! - `issue`: issue a token for a set of credentials
//! - `verify`: verify a token and print the user it belongs to

pub mod serve;
pub mod token;

use clap::{Parser, Subcommand};

/// Token authentication service - issues and verifies signed access tokens
#[derive(Parser)]
#[command(name = "token-auth")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Issue a token for the given credentials
    Issue(token::IssueArgs),

    /// Verify a token and print the resolved user
    Verify(token::VerifyArgs),
}

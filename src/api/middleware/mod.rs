//! API middleware components

pub mod user_auth;

pub use user_auth::{RequireUser, extract_bearer_token, report_auth_failure};

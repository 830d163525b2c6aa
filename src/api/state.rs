//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::auth::Authenticator;

/// Application state shared by all handlers
#[derive(Clone, Debug)]
pub struct AppState {
    pub authenticator: Arc<Authenticator>,
}

impl AppState {
    pub fn new(authenticator: Arc<Authenticator>) -> Self {
        Self { authenticator }
    }
}

//! User authentication extractor using bearer tokens

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use tracing::{debug, error, warn};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::{AuthError, User};

/// Extractor that requires a valid token in `Authorization: Bearer <token>`
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;

        debug!("Verifying bearer token");

        let user = state
            .authenticator
            .verify(token)
            .await
            .map_err(report_auth_failure)?;

        Ok(RequireUser(user))
    }
}

/// Log an authentication failure by kind and convert it for the client
pub fn report_auth_failure(err: AuthError) -> ApiError {
    if err.is_rejection() {
        warn!(kind = %err.kind(), "Authentication rejected: {}", err);
    } else {
        error!(kind = %err.kind(), "Authentication failed: {}", err);
    }

    err.into()
}

/// Extract the bearer token from the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| ApiError::bad_request("Invalid Authorization header encoding"))?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Ok(token);
            }
        }
    }

    Err(ApiError::unauthorized(
        "Authentication required. Provide a token via 'Authorization: Bearer <token>' header",
    ))
}

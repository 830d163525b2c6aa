//! Authentication API endpoints
//!
//! Provides login and current-user endpoints for token-based authentication.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::middleware::{RequireUser, report_auth_failure};
use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::User;

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(get_current_user))
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
    pub user: UserResponse,
}

/// User response (safe to expose)
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: u64,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl UserResponse {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id().value(),
            email: user.email().to_string(),
            name: user.name().to_string(),
            role: user.role().as_str().to_string(),
        }
    }
}

/// Login with email and password
///
/// POST /auth/login
///
/// Returns a signed token on successful authentication.
pub async fn login(
    State(state): State<AppState>,
    request: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = request.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let issued = state
        .authenticator
        .issue_token(&request.email, &request.password)
        .await
        .map_err(report_auth_failure)?;

    info!(user_id = %issued.user.id(), "Issued token");

    Ok(Json(LoginResponse {
        user: UserResponse::from_user(&issued.user),
        expires_at: issued.expires_at.to_rfc3339(),
        token: issued.token,
    }))
}

/// Get current authenticated user
///
/// GET /auth/me
pub async fn get_current_user(
    RequireUser(user): RequireUser,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(UserResponse::from_user(&user)))
}

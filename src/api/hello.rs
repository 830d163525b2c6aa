//! Plain demo endpoints exercising the success, error and panic paths

use axum::http::StatusCode;
use tracing::error;

use crate::api::types::ApiError;

/// GET /hello
pub async fn hello() -> (StatusCode, &'static str) {
    (StatusCode::OK, "Hello, world!")
}

/// GET /error
pub async fn error_example() -> ApiError {
    error!("some error");
    ApiError::internal("some error")
}

/// GET /panic - recovered by the router's panic layer
pub async fn panic_example() -> &'static str {
    panic!("some error")
}

use std::any::Any;

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::error;

use super::auth;
use super::health;
use super::hello;
use super::state::AppState;
use super::types::ApiError;

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .route("/hello", get(hello::hello))
        .route("/error", get(hello::error_example))
        .route("/panic", get(hello::panic_example))
        .nest("/auth", auth::create_auth_router())
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    error!(panic = %detail, "Request handler panicked");

    ApiError::internal("Internal server error").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::auth::{LoginResponse, UserResponse};
    use crate::infrastructure::auth::{Authenticator, JwtConfig};
    use crate::infrastructure::user::InMemoryUserDirectory;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use chrono::Duration;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn create_app() -> Router {
        let directory = Arc::new(InMemoryUserDirectory::seeded());
        let authenticator = Authenticator::new(
            &JwtConfig::new("router-test-secret", Duration::hours(48)),
            directory,
        )
        .unwrap();

        create_router(AppState::new(Arc::new(authenticator)))
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    fn login_request(email: &str, password: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({ "email": email, "password": password }).to_string(),
            ))
            .unwrap()
    }

    fn me_request(token: &str) -> Request<Body> {
        Request::builder()
            .uri("/auth/me")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_hello() {
        let response = create_app()
            .oneshot(Request::builder().uri("/hello").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"Hello, world!");
    }

    #[tokio::test]
    async fn test_error_route() {
        let response = create_app()
            .oneshot(Request::builder().uri("/error").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["error"]["message"], "some error");
    }

    #[tokio::test]
    async fn test_panic_is_recovered() {
        let response = create_app()
            .oneshot(Request::builder().uri("/panic").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["error"]["type"], "server_error");
    }

    #[tokio::test]
    async fn test_health() {
        let response = create_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_login_then_me() {
        let app = create_app();

        let response = app
            .clone()
            .oneshot(login_request("user1@gmail.com", "user1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let login: LoginResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(login.user.id, 42);
        assert_eq!(login.user.email, "user1@gmail.com");
        assert!(!login.expires_at.is_empty());

        let response = app.oneshot(me_request(&login.token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = body_bytes(response).await;
        let me: UserResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(me.id, 42);
        assert_eq!(me.name, "User Friendly");
        assert_eq!(me.role, "user");
        assert!(!String::from_utf8_lossy(&bytes).contains("password"));
    }

    #[tokio::test]
    async fn test_login_with_bad_credentials() {
        for (email, password) in [("user1@gmail.com", "wrong"), ("nobody@gmail.com", "user1")] {
            let response = create_app()
                .oneshot(login_request(email, password))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

            let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
            assert_eq!(body["error"]["code"], "invalid_credentials");
            assert_eq!(body["error"]["message"], "Invalid email or password");
        }
    }

    #[tokio::test]
    async fn test_login_with_invalid_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"email\": 1}"))
            .unwrap();

        let response = create_app().oneshot(request).await.unwrap();
        assert!(response.status().is_client_error());
        assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_me_with_invalid_token() {
        let response = create_app().oneshot(me_request("garbage")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["error"]["code"], "malformed_token");
        assert_eq!(body["error"]["message"], "Invalid or expired token");
    }

    #[tokio::test]
    async fn test_me_without_token() {
        let request = Request::builder().uri("/auth/me").body(Body::empty()).unwrap();
        let response = create_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

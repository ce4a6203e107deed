// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{auth::auth_middleware, error::ApiError, state::AppState};

pub mod auth;
pub mod health;

/// Build the gateway: auth endpoints and health probes, plus `downstream`,
/// all behind the authentication gate.
///
/// `downstream` is the routing layer. Whatever it serves, including its
/// fallback, is only reached through the gate.
pub fn router(state: AppState, downstream: Router) -> Router {
    let gateway_routes = Router::new()
        .route("/v1/login", post(auth::login))
        .route("/v1/refresh/token", post(auth::refresh_token))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state.clone());

    gateway_routes
        .merge(downstream)
        .layer(middleware::from_fn_with_state(state, auth_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(CorsLayer::permissive())
}

/// Downstream used when no routing layer is attached: every path is 404.
pub fn unrouted() -> Router {
    Router::new().fallback(not_found)
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header::AUTHORIZATION, HeaderMap, Request, StatusCode},
        response::Response,
        Json,
    };
    use chrono::Utc;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::{
        Auth, BypassPolicy, ClaimSet, Identity, SigningKey, TokenCodec, TokenLifetimes, TokenType,
    };
    use crate::identity::{IdentityError, IdentityFuture, IdentityVerifier};

    struct StubVerifier;

    impl IdentityVerifier for StubVerifier {
        fn verify<'a>(&'a self, account: &'a str, password: &'a str) -> IdentityFuture<'a> {
            Box::pin(async move {
                match (account, password) {
                    ("ace", "secret") => Ok(Identity::new("1", "ace")),
                    ("down", _) => Err(IdentityError::Unavailable("connection refused".into())),
                    _ => Err(IdentityError::Rejected),
                }
            })
        }
    }

    fn key() -> SigningKey {
        SigningKey::from_bytes(vec![42u8; 32]).unwrap()
    }

    /// Echoes what the gate forwarded.
    async fn echo(Auth(identity): Auth, headers: HeaderMap) -> Json<Value> {
        Json(json!({
            "userId": identity.user_id,
            "headerUserId": headers.get("x-user-id").and_then(|v| v.to_str().ok()),
            "headerUserName": headers.get("x-user-name").and_then(|v| v.to_str().ok()),
        }))
    }

    async fn webhook(headers: HeaderMap) -> Json<Value> {
        Json(json!({ "spoofed": headers.contains_key("x-user-id") }))
    }

    fn app() -> Router {
        let state = AppState::new(
            &key(),
            TokenLifetimes::default(),
            BypassPolicy::default(),
            Arc::new(StubVerifier),
        );
        let downstream = Router::new()
            .route("/v1/orders", get(echo))
            .route("/webhook/line", post(webhook))
            .fallback(not_found);
        router(state, downstream)
    }

    fn post_json(path: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_with_token(path: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(path)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn login(app: &Router) -> Value {
        let response = app
            .clone()
            .oneshot(post_json("/v1/login", json!({"account": "ace", "password": "secret"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }

    fn token_with_key(key: &SigningKey, token_type: TokenType, iat: i64, exp: i64) -> String {
        let claims = ClaimSet::new(&Identity::new("1", "ace"), token_type, iat, exp).unwrap();
        TokenCodec::new(key).encode(&claims).unwrap().into_string()
    }

    async fn assert_unauthorized(response: Response) {
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body, json!({"status": 1, "message": "Unauthorized", "data": null}));
    }

    #[tokio::test]
    async fn login_then_call_guarded_route() {
        let app = app();
        let body = login(&app).await;
        assert_eq!(body["status"], 0);
        assert_eq!(body["data"]["id"], "1");
        assert_eq!(body["data"]["userName"], "ace");

        let token = body["data"]["token"].as_str().unwrap();
        let response = app.oneshot(get_with_token("/v1/orders", token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let echoed = body_json(response).await;
        assert_eq!(echoed["userId"], "1");
        assert_eq!(echoed["headerUserId"], "1");
        assert_eq!(echoed["headerUserName"], "ace");
    }

    #[tokio::test]
    async fn refresh_issues_working_access_token() {
        let app = app();
        let body = login(&app).await;
        let refresh_token = body["data"]["refreshToken"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(post_json("/v1/refresh/token", json!({ "refreshToken": refresh_token })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let refreshed = body_json(response).await;
        assert_eq!(refreshed["data"]["id"], "1");
        assert_eq!(refreshed["data"]["userName"], "ace");
        assert_eq!(refreshed["data"]["refreshToken"], refresh_token.as_str());

        let token = refreshed["data"]["token"].as_str().unwrap();
        let claims = TokenCodec::new(&key()).decode(token).unwrap();
        assert_eq!(claims.token_type(), TokenType::Access);
        assert!(claims.expires_at() > Utc::now().timestamp());

        let response = app.oneshot(get_with_token("/v1/orders", token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn expired_access_token_is_rejected() {
        let now = Utc::now().timestamp();
        let expired = token_with_key(&key(), TokenType::Access, now - 1000, now - 100);

        let response = app().oneshot(get_with_token("/v1/orders", &expired)).await.unwrap();
        assert_unauthorized(response).await;
    }

    #[tokio::test]
    async fn token_signed_with_other_key_is_rejected() {
        let now = Utc::now().timestamp();
        let other = SigningKey::from_bytes(vec![7u8; 32]).unwrap();
        let forged = token_with_key(&other, TokenType::Access, now, now + 900);

        let response = app().oneshot(get_with_token("/v1/orders", &forged)).await.unwrap();
        assert_unauthorized(response).await;
    }

    #[tokio::test]
    async fn health_needs_no_authorization() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["checks"]["signing_key"], "persistent");

        let response = app()
            .oneshot(Request::builder().uri("/health/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn refresh_token_is_not_an_access_token() {
        let app = app();
        let body = login(&app).await;
        let refresh_token = body["data"]["refreshToken"].as_str().unwrap();

        let response = app.oneshot(get_with_token("/v1/orders", refresh_token)).await.unwrap();
        assert_unauthorized(response).await;
    }

    #[tokio::test]
    async fn access_token_cannot_refresh() {
        let app = app();
        let body = login(&app).await;
        let access_token = body["data"]["token"].as_str().unwrap();

        let response = app
            .oneshot(post_json("/v1/refresh/token", json!({ "refreshToken": access_token })))
            .await
            .unwrap();
        assert_unauthorized(response).await;
    }

    #[tokio::test]
    async fn missing_authorization_is_rejected() {
        let response = app()
            .oneshot(Request::builder().uri("/v1/orders").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_unauthorized(response).await;
    }

    #[tokio::test]
    async fn unknown_path_is_gated_before_not_found() {
        let app = app();
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/v1/unknown").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_unauthorized(response).await;

        let body = login(&app).await;
        let token = body["data"]["token"].as_str().unwrap();
        let response = app.oneshot(get_with_token("/v1/unknown", token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["message"], "Not Found");
    }

    #[tokio::test]
    async fn spoofed_identity_never_reaches_bypass_route() {
        let request = Request::builder()
            .method("POST")
            .uri("/webhook/line")
            .header("x-user-id", "999")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["spoofed"], false);
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        for body in [
            json!({}),
            json!({"account": "ace"}),
            json!({"account": "  ", "password": "secret"}),
            json!({"account": "ace", "password": ""}),
        ] {
            let response = app().oneshot(post_json("/v1/login", body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                body_json(response).await,
                json!({"status": 1, "message": "Account and password are required", "data": null})
            );
        }
    }

    #[tokio::test]
    async fn unreadable_body_is_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/v1/login")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn blank_refresh_token_is_bad_request() {
        let response = app()
            .oneshot(post_json("/v1/refresh/token", json!({"refreshToken": " "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Refresh token is required");
    }

    #[tokio::test]
    async fn rejected_credentials_are_unauthorized() {
        let response = app()
            .oneshot(post_json("/v1/login", json!({"account": "ace", "password": "wrong"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn unavailable_account_service_is_server_error() {
        let response = app()
            .oneshot(post_json("/v1/login", json!({"account": "down", "password": "x"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["message"], "Internal Server Error");
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let response = app()
            .oneshot(Request::builder().uri("/v1/orders").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));

        let request = Request::builder()
            .uri("/health/live")
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }

    #[tokio::test]
    async fn error_responses_are_json() {
        let response = app()
            .oneshot(Request::builder().uri("/v1/orders").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.headers()["content-type"], "application/json");
    }
}

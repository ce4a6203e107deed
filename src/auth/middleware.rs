// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request authentication gate.
//!
//! Every inbound request passes through [`auth_middleware`] before routing.
//!
//! ## Flow
//!
//! 1. Caller-supplied `X-User-ID` / `X-User-Name` headers are removed
//! 2. Bypass paths are forwarded as-is
//! 3. Guarded paths need `Authorization: Bearer <token>` holding a live
//!    access token
//! 4. On success the identity is written to the trust headers and to the
//!    request extensions, and the rebuilt request is forwarded
//!
//! Rejections never say why the token failed; the cause is logged.

use axum::{
    extract::{Request, State},
    http::{
        header::AUTHORIZATION,
        HeaderMap, HeaderName, HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error, warn};

use super::claims::{Identity, TokenType};
use super::error::AuthError;
use super::policy::{BypassPolicy, Gate};
use super::validator::TokenValidator;
use crate::state::AppState;

/// Trust header carrying the caller's user ID downstream.
pub const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");

/// Trust header carrying the caller's user name downstream.
pub const USER_NAME_HEADER: HeaderName = HeaderName::from_static("x-user-name");

const REQUEST_ID_HEADER: &str = "x-request-id";
const BEARER_PREFIX: &str = "Bearer ";

/// Result of authenticating a guarded request.
#[derive(Debug)]
pub enum AuthOutcome {
    Authenticated(Identity),
    Rejected(AuthError),
}

impl AuthOutcome {
    pub fn into_result(self) -> Result<Identity, AuthError> {
        match self {
            AuthOutcome::Authenticated(identity) => Ok(identity),
            AuthOutcome::Rejected(error) => Err(error),
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingOrMalformedHeader)?
        .to_str()
        .map_err(|_| AuthError::MissingOrMalformedHeader)?;

    match value.strip_prefix(BEARER_PREFIX) {
        Some(token) if !token.is_empty() && token.trim() == token => Ok(token),
        _ => Err(AuthError::MissingOrMalformedHeader),
    }
}

/// Authenticate a guarded request from its headers.
pub fn authenticate(headers: &HeaderMap, validator: &TokenValidator) -> AuthOutcome {
    let token = match bearer_token(headers) {
        Ok(token) => token,
        Err(e) => return AuthOutcome::Rejected(e),
    };

    match validator.validate(token, TokenType::Access) {
        Ok(claims) => AuthOutcome::Authenticated(claims.identity()),
        Err(e) => AuthOutcome::Rejected(e.into()),
    }
}

/// Decide what happens to `request`.
///
/// Returns the request to forward, rebuilt with trust headers when the
/// caller authenticated, or the rejection.
pub fn gate_request(
    request: Request,
    validator: &TokenValidator,
    policy: &BypassPolicy,
) -> Result<Request, AuthError> {
    let (mut parts, body) = request.into_parts();
    parts.headers.remove(&USER_ID_HEADER);
    parts.headers.remove(&USER_NAME_HEADER);

    if policy.classify(parts.uri.path()) == Gate::Bypass {
        return Ok(Request::from_parts(parts, body));
    }

    let identity = authenticate(&parts.headers, validator).into_result()?;

    let user_id = trust_header_value(&identity.user_id)?;
    let user_name = trust_header_value(&identity.user_name)?;
    parts.headers.insert(USER_ID_HEADER, user_id);
    parts.headers.insert(USER_NAME_HEADER, user_name);
    parts.extensions.insert(identity);

    Ok(Request::from_parts(parts, body))
}

fn trust_header_value(value: &str) -> Result<HeaderValue, AuthError> {
    HeaderValue::from_bytes(value.as_bytes())
        .map_err(|_| AuthError::Internal("identity cannot be carried in a header".to_string()))
}

/// Axum middleware wrapping [`gate_request`].
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/v1/orders", get(list_orders))
///     .layer(axum::middleware::from_fn_with_state(state.clone(), auth_middleware));
/// ```
pub async fn auth_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_owned();

    match gate_request(request, &state.validator, &state.policy) {
        Ok(request) => {
            match request.extensions().get::<Identity>() {
                Some(identity) => debug!(
                    request_id = %request_id,
                    path = %path,
                    user_id = %identity.user_id,
                    "Request authenticated"
                ),
                None => debug!(request_id = %request_id, path = %path, "Auth bypassed"),
            }
            next.run(request).await
        }
        Err(e) => {
            if e.is_server_error() {
                error!(request_id = %request_id, path = %path, reason = e.error_code(), error = %e, "Request failed authentication");
            } else {
                warn!(request_id = %request_id, path = %path, reason = e.error_code(), "Request rejected");
            }
            e.into_response()
        }
    }
}

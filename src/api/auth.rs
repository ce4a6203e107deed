// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login and token refresh endpoints.
//!
//! Both sit on bypass paths; they are how a client gets a token in the
//! first place. Passwords and tokens are never logged.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{error, info, warn};

use crate::{
    auth::AuthError,
    error::ApiResponse,
    models::{non_blank, LoginRequest, RefreshTokenRequest, TokenResponse},
    state::AppState,
};

const CREDENTIALS_REQUIRED: &str = "Account and password are required";
const REFRESH_TOKEN_REQUIRED: &str = "Refresh token is required";

/// `POST /v1/login`
///
/// Verifies the credentials with the account service and issues an
/// access/refresh token pair for the identity it returns.
pub async fn login(
    State(state): State<AppState>,
    request: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiResponse<TokenResponse>, AuthError> {
    let Json(request) = request.map_err(|e| {
        warn!(error = %e, "Login failed: unreadable body");
        AuthError::MissingInput(CREDENTIALS_REQUIRED)
    })?;

    let account = non_blank(request.account.as_deref());
    let password = request
        .password
        .as_deref()
        .filter(|p| !p.trim().is_empty());
    let (Some(account), Some(password)) = (account, password) else {
        warn!("Login failed: missing account or password");
        return Err(AuthError::MissingInput(CREDENTIALS_REQUIRED));
    };

    let identity = state
        .identity
        .verify(account, password)
        .await
        .map_err(|e| {
            let err = AuthError::from(e);
            if err.is_server_error() {
                error!(account, error = %err, "Login failed: account service error");
            } else {
                warn!(account, reason = err.error_code(), "Login failed");
            }
            err
        })?;

    let pair = state.issuer.issue_pair(&identity).map_err(|e| {
        error!(account, error = %e, "Login failed: token issuance");
        AuthError::from(e)
    })?;

    info!(account, user_id = %identity.user_id, "Login successful");
    Ok(ApiResponse::success(TokenResponse::new(
        identity,
        pair.access_token,
        pair.refresh_token.into_string(),
    )))
}

/// `POST /v1/refresh/token`
///
/// Trades a refresh token for a new access token. The refresh token is
/// returned unchanged; it is not rotated.
pub async fn refresh_token(
    State(state): State<AppState>,
    request: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<ApiResponse<TokenResponse>, AuthError> {
    let Json(request) = request.map_err(|e| {
        warn!(error = %e, "Token refresh failed: unreadable body");
        AuthError::MissingInput(REFRESH_TOKEN_REQUIRED)
    })?;

    let Some(refresh_token) = non_blank(request.refresh_token.as_deref()) else {
        warn!("Token refresh failed: missing refreshToken");
        return Err(AuthError::MissingInput(REFRESH_TOKEN_REQUIRED));
    };

    let grant = state.issuer.refresh(refresh_token).map_err(|e| {
        let err = AuthError::from(e);
        if err.is_server_error() {
            error!(error = %err, "Token refresh failed");
        } else {
            warn!(reason = err.error_code(), "Token refresh rejected");
        }
        err
    })?;

    info!(user_id = %grant.identity.user_id, "Access token refreshed");
    Ok(ApiResponse::success(TokenResponse::new(
        grant.identity,
        grant.access_token,
        refresh_token,
    )))
}

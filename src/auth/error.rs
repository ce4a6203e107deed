// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! `TokenError` is what the codec, issuer and validator report. `AuthError`
//! is what reaches the HTTP boundary; its detail goes to the logs, while the
//! client only ever sees the generic message for the status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::claims::TokenType;
use crate::error::ApiError;
use crate::identity::IdentityError;

/// Token codec and validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Token structure, encoding, or claims could not be parsed
    #[error("token is malformed")]
    Malformed,

    /// Signature does not verify against the signing key
    #[error("token signature is invalid")]
    InvalidSignature,

    /// `exp` is at or before the current time
    #[error("token has expired")]
    Expired,

    /// Access token used where a refresh token is required, or the reverse
    #[error("expected {expected} token, got {actual}")]
    WrongTokenType { expected: TokenType, actual: TokenType },

    /// Claims violate the subject or lifetime invariants
    #[error("invalid claims: {0}")]
    InvalidClaims(&'static str),

    /// Signing failed while issuing a token
    #[error("token could not be issued: {0}")]
    Issuance(String),
}

impl TokenError {
    /// Short machine-readable kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::Expired => "expired",
            TokenError::WrongTokenType { .. } => "wrong_token_type",
            TokenError::InvalidClaims(_) => "invalid_claims",
            TokenError::Issuance(_) => "issuance_failed",
        }
    }
}

/// Authentication error type at the HTTP boundary.
#[derive(Debug)]
pub enum AuthError {
    /// No `Authorization` header, or not of the form `Bearer <token>`
    MissingOrMalformedHeader,
    /// Token failed decoding or validation
    InvalidToken(TokenError),
    /// Required request input is blank or unreadable
    MissingInput(&'static str),
    /// Account service rejected the credentials or could not be reached
    UpstreamIdentityFailure(IdentityError),
    /// Internal error
    Internal(String),
}

/// Message for every token rejection, whatever the cause.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";
const INTERNAL_MESSAGE: &str = "Internal Server Error";

impl AuthError {
    /// Get the error code for this error. Logged, never sent to clients.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingOrMalformedHeader => "missing_or_malformed_header",
            AuthError::InvalidToken(e) => e.kind(),
            AuthError::MissingInput(_) => "missing_input",
            AuthError::UpstreamIdentityFailure(IdentityError::Rejected) => "credentials_rejected",
            AuthError::UpstreamIdentityFailure(IdentityError::Unavailable(_)) => {
                "identity_service_unavailable"
            }
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingOrMalformedHeader
            | AuthError::InvalidToken(_)
            | AuthError::UpstreamIdentityFailure(IdentityError::Rejected) => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::MissingInput(_) => StatusCode::BAD_REQUEST,
            AuthError::UpstreamIdentityFailure(IdentityError::Unavailable(_))
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message clients see.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::MissingOrMalformedHeader | AuthError::InvalidToken(_) => {
                UNAUTHORIZED_MESSAGE
            }
            AuthError::MissingInput(message) => *message,
            AuthError::UpstreamIdentityFailure(IdentityError::Rejected) => {
                INVALID_CREDENTIALS_MESSAGE
            }
            AuthError::UpstreamIdentityFailure(IdentityError::Unavailable(_))
            | AuthError::Internal(_) => INTERNAL_MESSAGE,
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl From<TokenError> for AuthError {
    fn from(error: TokenError) -> Self {
        match error {
            TokenError::Issuance(_) | TokenError::InvalidClaims(_) => {
                AuthError::Internal(error.to_string())
            }
            other => AuthError::InvalidToken(other),
        }
    }
}

impl From<IdentityError> for AuthError {
    fn from(error: IdentityError) -> Self {
        AuthError::UpstreamIdentityFailure(error)
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingOrMalformedHeader => {
                write!(f, "Missing or malformed authorization header (expected 'Bearer <token>')")
            }
            AuthError::InvalidToken(e) => write!(f, "Token rejected: {e}"),
            AuthError::MissingInput(msg) => write!(f, "{msg}"),
            AuthError::UpstreamIdentityFailure(e) => write!(f, "Identity verification failed: {e}"),
            AuthError::Internal(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::new(self.status_code(), self.public_message()).into_response()
    }
}

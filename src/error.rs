// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Response envelope shared by every endpoint and rejection site.
//!
//! ```json
//! { "status": 0, "message": "OK", "data": { ... } }
//! { "status": 1, "message": "Unauthorized", "data": null }
//! ```
//!
//! Field names are part of the public contract.

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// `status` value of a successful response.
pub const STATUS_OK: i32 = 0;
/// `status` value of an error response.
pub const STATUS_ERROR: i32 = 1;

/// Written when the envelope itself cannot be serialized.
pub const FALLBACK_ERROR_BODY: &str = r#"{"status":1,"message":"Server Error","data":null}"#;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: i32,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: STATUS_OK,
            message: "OK".to_string(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR,
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        json_response(StatusCode::OK, &self)
    }
}

/// Serialize `body` as the response payload, falling back to
/// [`FALLBACK_ERROR_BODY`] with a 500 if serialization fails.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    let (status, bytes) = match serde_json::to_vec(body) {
        Ok(bytes) => (status, bytes),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response body");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                FALLBACK_ERROR_BODY.as_bytes().to_vec(),
            )
        }
    };
    (
        status,
        [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        bytes,
    )
        .into_response()
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        json_response(self.status, &ApiResponse::<()>::error(self.message))
    }
}

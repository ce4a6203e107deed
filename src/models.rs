// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the login and refresh endpoints. Field
//! names are part of the client contract.
//!
//! Request fields are optional so that a missing field and a blank one are
//! both answered with the same `400`, instead of a deserialization error.

use serde::{Deserialize, Serialize};

use crate::auth::{Identity, SignedToken};

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub account: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

/// Returns the trimmed value, or `None` when it is missing or blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// =============================================================================
// Responses
// =============================================================================

/// Returned by login and refresh alike.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub id: String,
    pub user_name: String,
    pub token: String,
    pub refresh_token: String,
}

impl TokenResponse {
    pub fn new(identity: Identity, token: SignedToken, refresh_token: impl Into<String>) -> Self {
        Self {
            id: identity.user_id,
            user_name: identity.user_name,
            token: token.into_string(),
            refresh_token: refresh_token.into(),
        }
    }
}

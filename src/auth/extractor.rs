// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the authenticated caller.
//!
//! In-process downstream handlers read the identity the gate verified:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(identity): Auth) -> impl IntoResponse {
//!     // identity.user_id, identity.user_name
//! }
//! ```
//!
//! The extractor does not validate tokens itself. A handler mounted outside
//! the gate, or on a bypass path, never sees an identity and is rejected.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, Identity};

pub struct Auth(pub Identity);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(Auth)
            .ok_or(AuthError::MissingOrMalformedHeader)
    }
}

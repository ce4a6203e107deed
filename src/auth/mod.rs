// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Token lifecycle and the request gate of the gateway.
//!
//! ## Auth Flow
//!
//! 1. Client posts account/password to `/v1/login`
//! 2. The account service verifies them and returns the canonical identity
//! 3. Gateway issues an access token and a refresh token (HS256)
//! 4. Client sends `Authorization: Bearer <access token>` on every call
//! 5. Gateway validates signature, expiry and type, then forwards the
//!    request with `X-User-ID` / `X-User-Name`
//! 6. When the access token expires, the client trades the refresh token
//!    for a new one at `/v1/refresh/token`
//!
//! ## Security
//!
//! - One symmetric key per process, read-only after startup
//! - Refresh tokens are never accepted as access tokens, and the reverse
//! - Rejections answer `401 Unauthorized` without naming the cause
//! - Caller-supplied trust headers are always stripped

pub mod claims;
pub mod codec;
pub mod error;
pub mod extractor;
pub mod issuer;
pub mod key;
pub mod middleware;
pub mod policy;
pub mod validator;

pub use claims::{ClaimSet, Identity, SignedToken, TokenType};
pub use codec::TokenCodec;
pub use error::{AuthError, TokenError};
pub use extractor::Auth;
pub use issuer::{RefreshGrant, TokenIssuer, TokenLifetimes, TokenPair};
pub use key::{KeyError, KeyOrigin, SigningKey};
pub use middleware::{auth_middleware, AuthOutcome, USER_ID_HEADER, USER_NAME_HEADER};
pub use policy::{BypassPolicy, Gate};
pub use validator::TokenValidator;

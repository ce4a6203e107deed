// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token validation: signature, then expiry, then type.

use chrono::Utc;

use super::claims::{ClaimSet, TokenType};
use super::codec::TokenCodec;
use super::error::TokenError;

/// Validates tokens against the signing key and the current time.
#[derive(Clone)]
pub struct TokenValidator {
    codec: TokenCodec,
}

impl TokenValidator {
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }

    /// Validate `token` as a token of the `expected` type, as of now.
    pub fn validate(&self, token: &str, expected: TokenType) -> Result<ClaimSet, TokenError> {
        self.validate_at(token, expected, Utc::now().timestamp())
    }

    /// Validate `token` as of `now` (seconds since the Unix epoch).
    ///
    /// The first failing check decides the error; a token is only accepted
    /// when all three pass.
    pub fn validate_at(
        &self,
        token: &str,
        expected: TokenType,
        now: i64,
    ) -> Result<ClaimSet, TokenError> {
        let claims = self.codec.decode(token)?;

        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        if claims.token_type() != expected {
            return Err(TokenError::WrongTokenType {
                expected,
                actual: claims.token_type(),
            });
        }

        Ok(claims)
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and the refresh flow.
//!
//! ## Token Lifetimes
//!
//! - Access token: short-lived (default 15 minutes), authorizes API calls
//! - Refresh token: long-lived (default 7 days), only mints new access tokens
//!
//! Refreshing trusts the refresh token's own claims. The account service is
//! consulted once, at login, and never again for the refresh token's
//! lifetime.

use chrono::{TimeDelta, Utc};

use super::claims::{ClaimSet, Identity, SignedToken, TokenType};
use super::codec::TokenCodec;
use super::error::TokenError;
use super::validator::TokenValidator;

/// Default access token lifetime in seconds (15 minutes).
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 15 * 60;

/// Default refresh token lifetime in seconds (7 days).
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// How long each token kind stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: TimeDelta,
    pub refresh: TimeDelta,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: TimeDelta::seconds(DEFAULT_ACCESS_TTL_SECS),
            refresh: TimeDelta::seconds(DEFAULT_REFRESH_TTL_SECS),
        }
    }
}

impl TokenLifetimes {
    fn for_type(&self, token_type: TokenType) -> TimeDelta {
        match token_type {
            TokenType::Access => self.access,
            TokenType::Refresh => self.refresh,
        }
    }
}

/// Access and refresh token issued together at login.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: SignedToken,
    pub refresh_token: SignedToken,
}

/// Result of a successful refresh.
#[derive(Debug, Clone)]
pub struct RefreshGrant {
    /// Identity carried by the refresh token
    pub identity: Identity,
    /// Newly minted access token
    pub access_token: SignedToken,
}

/// Mints tokens for verified identities.
#[derive(Clone)]
pub struct TokenIssuer {
    codec: TokenCodec,
    validator: TokenValidator,
    lifetimes: TokenLifetimes,
}

impl TokenIssuer {
    pub fn new(codec: TokenCodec, lifetimes: TokenLifetimes) -> Self {
        Self {
            validator: TokenValidator::new(codec.clone()),
            codec,
            lifetimes,
        }
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }

    pub fn issue_access_token(&self, identity: &Identity) -> Result<SignedToken, TokenError> {
        self.issue_at(identity, TokenType::Access, Utc::now().timestamp())
    }

    pub fn issue_refresh_token(&self, identity: &Identity) -> Result<SignedToken, TokenError> {
        self.issue_at(identity, TokenType::Refresh, Utc::now().timestamp())
    }

    /// Issue both tokens with the same issue time.
    pub fn issue_pair(&self, identity: &Identity) -> Result<TokenPair, TokenError> {
        self.issue_pair_at(identity, Utc::now().timestamp())
    }

    pub fn issue_pair_at(&self, identity: &Identity, now: i64) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_at(identity, TokenType::Access, now)?,
            refresh_token: self.issue_at(identity, TokenType::Refresh, now)?,
        })
    }

    /// Issue a token of `token_type` as of `now` (seconds since the epoch).
    pub fn issue_at(
        &self,
        identity: &Identity,
        token_type: TokenType,
        now: i64,
    ) -> Result<SignedToken, TokenError> {
        let expires_at = now
            .checked_add(self.lifetimes.for_type(token_type).num_seconds())
            .ok_or(TokenError::InvalidClaims("expiry overflows"))?;
        let claims = ClaimSet::new(identity, token_type, now, expires_at)?;
        self.codec.encode(&claims)
    }

    /// Exchange a refresh token for a new access token.
    pub fn refresh_access_token(&self, refresh_token: &str) -> Result<SignedToken, TokenError> {
        self.refresh(refresh_token).map(|grant| grant.access_token)
    }

    /// Like [`refresh_access_token`](Self::refresh_access_token), also
    /// returning the identity the refresh token carries.
    pub fn refresh(&self, refresh_token: &str) -> Result<RefreshGrant, TokenError> {
        self.refresh_at(refresh_token, Utc::now().timestamp())
    }

    pub fn refresh_at(&self, refresh_token: &str, now: i64) -> Result<RefreshGrant, TokenError> {
        let claims = self
            .validator
            .validate_at(refresh_token, TokenType::Refresh, now)?;
        let identity = claims.identity();
        let access_token = self.issue_at(&identity, TokenType::Access, now)?;
        Ok(RefreshGrant {
            identity,
            access_token,
        })
    }
}

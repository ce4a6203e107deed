// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and the caller identity they carry.

use serde::{Deserialize, Serialize};

use super::error::TokenError;

/// Verified caller identity.
///
/// Produced by the account service at login, or rebuilt from a validated
/// claim set on every guarded request. Never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Canonical user ID (`sub` claim)
    pub user_id: String,
    /// Display name (`userName` claim)
    pub user_name: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
        }
    }
}

/// Distinguishes the two token kinds.
///
/// Written to the `type` claim. Access tokens omit the claim, so a token
/// without it reads back as `Access`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    #[default]
    Access,
    Refresh,
}

impl TokenType {
    fn is_access(&self) -> bool {
        *self == TokenType::Access
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        })
    }
}

/// Claims carried by every gateway token.
///
/// Field order is the wire order. `exp > iat` and a non-empty `sub` hold
/// for every value of this type, whether built locally or decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawClaims")]
pub struct ClaimSet {
    sub: String,
    #[serde(rename = "userName")]
    user_name: String,
    #[serde(rename = "type", default, skip_serializing_if = "TokenType::is_access")]
    token_type: TokenType,
    iat: i64,
    exp: i64,
}

/// Unchecked wire shape, promoted to `ClaimSet` through `TryFrom`.
#[derive(Deserialize)]
struct RawClaims {
    sub: String,
    #[serde(rename = "userName")]
    user_name: String,
    #[serde(rename = "type", default)]
    token_type: TokenType,
    iat: i64,
    exp: i64,
}

impl TryFrom<RawClaims> for ClaimSet {
    type Error = TokenError;

    fn try_from(raw: RawClaims) -> Result<Self, Self::Error> {
        ClaimSet::new(
            &Identity::new(raw.sub, raw.user_name),
            raw.token_type,
            raw.iat,
            raw.exp,
        )
    }
}

impl ClaimSet {
    /// Build a claim set, enforcing the subject and lifetime invariants.
    pub fn new(
        identity: &Identity,
        token_type: TokenType,
        issued_at: i64,
        expires_at: i64,
    ) -> Result<Self, TokenError> {
        if identity.user_id.is_empty() {
            return Err(TokenError::InvalidClaims("subject is empty"));
        }
        if expires_at <= issued_at {
            return Err(TokenError::InvalidClaims("expiry is not after issue time"));
        }
        Ok(Self {
            sub: identity.user_id.clone(),
            user_name: identity.user_name.clone(),
            token_type,
            iat: issued_at,
            exp: expires_at,
        })
    }

    pub fn subject(&self) -> &str {
        &self.sub
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    /// Issue time, seconds since the Unix epoch.
    pub fn issued_at(&self) -> i64 {
        self.iat
    }

    /// Expiry time, seconds since the Unix epoch.
    pub fn expires_at(&self) -> i64 {
        self.exp
    }

    /// Whether the token is expired at `now` (expiry instant included).
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.sub.clone(), self.user_name.clone())
    }
}

/// Compact `header.claims.signature` token string.
///
/// Only the codec produces these. `Debug` is redacted so tokens do not end
/// up in logs by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedToken(String);

impl SignedToken {
    pub(crate) fn new(compact: String) -> Self {
        Self(compact)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for SignedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SignedToken(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ace() -> Identity {
        Identity::new("1", "ace")
    }

    #[test]
    fn new_rejects_empty_subject() {
        let result = ClaimSet::new(&Identity::new("", "ace"), TokenType::Access, 10, 20);
        assert!(matches!(result, Err(TokenError::InvalidClaims(_))));
    }

    #[test]
    fn new_rejects_non_increasing_lifetime() {
        let result = ClaimSet::new(&ace(), TokenType::Access, 20, 20);
        assert!(matches!(result, Err(TokenError::InvalidClaims(_))));
    }

    #[test]
    fn access_claims_omit_type() {
        let claims = ClaimSet::new(&ace(), TokenType::Access, 100, 200).unwrap();
        let json = serde_json::to_string(&claims).unwrap();
        assert_eq!(json, r#"{"sub":"1","userName":"ace","iat":100,"exp":200}"#);
    }

    #[test]
    fn refresh_claims_carry_type() {
        let claims = ClaimSet::new(&ace(), TokenType::Refresh, 100, 200).unwrap();
        let json = serde_json::to_string(&claims).unwrap();
        assert_eq!(
            json,
            r#"{"sub":"1","userName":"ace","type":"refresh","iat":100,"exp":200}"#
        );
    }

    #[test]
    fn missing_type_reads_as_access() {
        let claims: ClaimSet =
            serde_json::from_str(r#"{"sub":"1","userName":"ace","iat":1,"exp":2}"#).unwrap();
        assert_eq!(claims.token_type(), TokenType::Access);
    }

    #[test]
    fn deserialize_enforces_invariants() {
        let result: Result<ClaimSet, _> =
            serde_json::from_str(r#"{"sub":"1","userName":"ace","iat":5,"exp":3}"#);
        assert!(result.is_err());

        let result: Result<ClaimSet, _> =
            serde_json::from_str(r#"{"sub":"","userName":"ace","iat":1,"exp":3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_type_is_rejected() {
        let result: Result<ClaimSet, _> = serde_json::from_str(
            r#"{"sub":"1","userName":"ace","type":"admin","iat":1,"exp":2}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn expiry_instant_counts_as_expired() {
        let claims = ClaimSet::new(&ace(), TokenType::Access, 100, 200).unwrap();
        assert!(!claims.is_expired_at(199));
        assert!(claims.is_expired_at(200));
    }

    #[test]
    fn identity_round_trips_through_claims() {
        let claims = ClaimSet::new(&ace(), TokenType::Refresh, 1, 2).unwrap();
        assert_eq!(claims.identity(), ace());
    }

    #[test]
    fn signed_token_debug_is_redacted() {
        let token = SignedToken::new("aaa.bbb.ccc".to_string());
        assert_eq!(format!("{token:?}"), "SignedToken(<redacted>)");
        assert_eq!(token.as_str(), "aaa.bbb.ccc");
    }
}

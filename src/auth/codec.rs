// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HS256 token codec.
//!
//! Turns a [`ClaimSet`] into a compact signed token and back. Decoding checks
//! structure and signature only; expiry and token type are the validator's
//! job.

use std::sync::Arc;

use base64ct::{Base64UrlUnpadded, Encoding};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::{ClaimSet, SignedToken};
use super::error::TokenError;
use super::key::SigningKey;

struct CodecKeys {
    header: Header,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

/// Signs and verifies tokens with the process signing key.
///
/// Cheap to clone; all clones share the same key material.
#[derive(Clone)]
pub struct TokenCodec {
    keys: Arc<CodecKeys>,
}

impl TokenCodec {
    pub fn new(key: &SigningKey) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            keys: Arc::new(CodecKeys {
                header: Header::new(Algorithm::HS256),
                encoding: EncodingKey::from_secret(key.expose()),
                decoding: DecodingKey::from_secret(key.expose()),
                validation,
            }),
        }
    }

    /// Sign a claim set.
    pub fn encode(&self, claims: &ClaimSet) -> Result<SignedToken, TokenError> {
        encode(&self.keys.header, claims, &self.keys.encoding)
            .map(SignedToken::new)
            .map_err(|e| TokenError::Issuance(e.to_string()))
    }

    /// Verify the signature and parse the claims. Expired tokens decode fine.
    pub fn decode(&self, token: &str) -> Result<ClaimSet, TokenError> {
        decode::<ClaimSet>(token, &self.keys.decoding, &self.keys.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                ErrorKind::Base64(_) if only_signature_undecodable(token) => {
                    TokenError::InvalidSignature
                }
                _ => TokenError::Malformed,
            })
    }
}

/// Whether a base64 failure can only have come from the signature segment.
///
/// A tampered final character often leaves non-zero padding bits, which
/// the decoder rejects before any MAC comparison.
fn only_signature_undecodable(token: &str) -> bool {
    let mut segments = token.split('.');
    match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(header), Some(claims), Some(_), None) => {
            Base64UrlUnpadded::decode_vec(header).is_ok()
                && Base64UrlUnpadded::decode_vec(claims).is_ok()
        }
        _ => false,
    }
}

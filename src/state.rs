// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{
    BypassPolicy, KeyOrigin, SigningKey, TokenCodec, TokenIssuer, TokenLifetimes, TokenValidator,
};
use crate::identity::IdentityVerifier;

/// Shared, read-only state for the gate and the auth endpoints.
///
/// Everything here is fixed at startup; clones share the same key.
#[derive(Clone)]
pub struct AppState {
    pub issuer: TokenIssuer,
    pub validator: TokenValidator,
    pub policy: Arc<BypassPolicy>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub key_origin: KeyOrigin,
}

impl AppState {
    pub fn new(
        key: &SigningKey,
        lifetimes: TokenLifetimes,
        policy: BypassPolicy,
        identity: Arc<dyn IdentityVerifier>,
    ) -> Self {
        let codec = TokenCodec::new(key);
        Self {
            issuer: TokenIssuer::new(codec.clone(), lifetimes),
            validator: TokenValidator::new(codec),
            policy: Arc::new(policy),
            identity,
            key_origin: key.origin(),
        }
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Upstream identity verification.
//!
//! The login endpoint hands an account/password pair to an
//! [`IdentityVerifier`] and gets back a canonical [`Identity`] or a failure.
//! The gateway never checks credentials itself.

use std::future::Future;
use std::pin::Pin;

use crate::auth::Identity;

pub mod account_service;

pub use account_service::AccountServiceClient;

/// Boxed future returned by [`IdentityVerifier::verify`].
pub type IdentityFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Identity, IdentityError>> + Send + 'a>>;

/// Identity verification failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// The account service answered, and the credentials are not valid
    #[error("credentials rejected by account service")]
    Rejected,

    /// The account service could not give an answer
    #[error("account service unavailable: {0}")]
    Unavailable(String),
}

/// Turns a credential pair into a verified identity.
///
/// Implementations must be cancel-safe: the login handler's future, and
/// with it the verification, is dropped when the client goes away.
pub trait IdentityVerifier: Send + Sync {
    fn verify<'a>(&'a self, account: &'a str, password: &'a str) -> IdentityFuture<'a>;
}

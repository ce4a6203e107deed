// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signing key store.
//!
//! The gateway signs every token with a single HMAC-SHA256 key. The key is
//! constructed once at startup and handed to the codec by value; nothing
//! mutates it afterwards.
//!
//! ## Sources
//!
//! - `GATEWAY_SIGNING_KEY`: base64-encoded key material
//! - `GATEWAY_SIGNING_KEY_FILE`: path to a file holding the base64 key
//! - Neither set: a random key is generated for this process only. Tokens
//!   issued with it stop verifying after a restart or on another replica.

use std::path::Path;
use std::sync::Arc;

use base64ct::{Base64, Encoding};
use ring::digest;
use ring::rand::{SecureRandom, SystemRandom};

/// Minimum accepted key length in bytes (HS256 block strength).
pub const MIN_KEY_LEN: usize = 32;

/// Length of a generated ephemeral key.
const GENERATED_KEY_LEN: usize = 32;

/// Key loading errors.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("signing key is {0} bytes, at least {MIN_KEY_LEN} required")]
    TooShort(usize),

    #[error("signing key is not valid base64")]
    InvalidEncoding,

    #[error("failed to read signing key file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("system random source unavailable")]
    Generation,
}

/// Where the key material came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrigin {
    /// Loaded from configuration; survives restarts.
    Configured,
    /// Generated at startup; lives only as long as this process.
    Ephemeral,
}

impl KeyOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyOrigin::Configured => "persistent",
            KeyOrigin::Ephemeral => "ephemeral",
        }
    }
}

/// Immutable HMAC signing key shared by the issuer and validator.
#[derive(Clone)]
pub struct SigningKey {
    bytes: Arc<[u8]>,
    origin: KeyOrigin,
}

impl SigningKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, KeyError> {
        let bytes = bytes.into();
        if bytes.len() < MIN_KEY_LEN {
            return Err(KeyError::TooShort(bytes.len()));
        }
        Ok(Self {
            bytes: bytes.into(),
            origin: KeyOrigin::Configured,
        })
    }

    /// Decode a base64 (standard alphabet, padded) key.
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let bytes = Base64::decode_vec(encoded.trim()).map_err(|_| KeyError::InvalidEncoding)?;
        Self::from_bytes(bytes)
    }

    /// Read a base64 key from a file. Surrounding whitespace is ignored.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, KeyError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| KeyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_base64(&contents)
    }

    /// Generate a random key for this process only.
    pub fn generate() -> Result<Self, KeyError> {
        let mut bytes = vec![0u8; GENERATED_KEY_LEN];
        SystemRandom::new()
            .fill(&mut bytes)
            .map_err(|_| KeyError::Generation)?;
        Ok(Self {
            bytes: bytes.into(),
            origin: KeyOrigin::Ephemeral,
        })
    }

    pub fn origin(&self) -> KeyOrigin {
        self.origin
    }

    /// Short SHA-256 fingerprint, safe to log.
    pub fn fingerprint(&self) -> String {
        let hash = digest::digest(&digest::SHA256, &self.bytes);
        hash.as_ref()[..8]
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    pub(crate) fn expose(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("fingerprint", &self.fingerprint())
            .field("origin", &self.origin)
            .finish()
    }
}

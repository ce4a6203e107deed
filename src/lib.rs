// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gateway Auth - Authentication Boundary for the API Gateway
//!
//! Issues short-lived bearer tokens after an external identity check and
//! validates them on every inbound request before it reaches the routing
//! layer.
//!
//! ## Modules
//!
//! - `api` - Gateway router, login/refresh endpoints, health probes
//! - `auth` - Signing key, token codec, issuer, validator and request gate
//! - `identity` - Account service client
//! - `error` - Response envelope shared by every endpoint and rejection

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod models;
pub mod state;

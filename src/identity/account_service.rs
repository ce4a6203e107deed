// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP client for the account service login endpoint.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{IdentityError, IdentityFuture, IdentityVerifier};
use crate::auth::Identity;

const LOGIN_PATH: &str = "/v1/user/login";

#[derive(Serialize)]
struct AccountLoginRequest<'a> {
    account: &'a str,
    password: &'a str,
}

/// Reply from the account service. `id` arrives as a number or a string
/// depending on the service version.
#[derive(Debug, Default, Deserialize)]
struct AccountLoginResponse {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AccountServiceClient {
    login_url: String,
    http: Client,
}

impl AccountServiceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, IdentityError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IdentityError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            login_url: format!("{}{LOGIN_PATH}", base_url.trim_end_matches('/')),
            http,
        })
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    async fn login(&self, account: &str, password: &str) -> Result<Identity, IdentityError> {
        debug!(account, "Verifying credentials with account service");

        let response = self
            .http
            .post(&self.login_url)
            .json(&AccountLoginRequest { account, password })
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("POST {LOGIN_PATH} failed: {e}")))?;

        let status = response.status();
        if is_rejection(status) {
            return Err(IdentityError::Rejected);
        }
        if !status.is_success() {
            return Err(IdentityError::Unavailable(format!(
                "POST {LOGIN_PATH} returned {status}"
            )));
        }

        let body: AccountLoginResponse = response.json().await.map_err(|e| {
            IdentityError::Unavailable(format!("POST {LOGIN_PATH} invalid JSON: {e}"))
        })?;

        into_identity(body, account)
    }
}

impl IdentityVerifier for AccountServiceClient {
    fn verify<'a>(&'a self, account: &'a str, password: &'a str) -> IdentityFuture<'a> {
        Box::pin(self.login(account, password))
    }
}

fn is_rejection(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
    )
}

/// A reply without a usable id means the credentials were not accepted.
/// A missing name falls back to the account name.
fn into_identity(body: AccountLoginResponse, account: &str) -> Result<Identity, IdentityError> {
    let user_id = match body.id {
        Some(Value::String(id)) if !id.trim().is_empty() => id,
        Some(Value::Number(id)) => id.to_string(),
        _ => return Err(IdentityError::Rejected),
    };

    let user_name = body
        .name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| account.to_string());

    Ok(Identity::new(user_id, user_name))
}

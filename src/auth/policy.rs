// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Which request paths skip authentication.
//!
//! The bypass set is deployment configuration (`GATEWAY_EXCLUDED_PATHS`).
//! Prefixes match whole path segments: `/health` covers `/health` and
//! `/health/live`, but not `/healthz`.

/// Bypass prefixes used when none are configured.
pub const DEFAULT_EXCLUDED_PATHS: &[&str] =
    &["/v1/login", "/v1/refresh/token", "/health", "/webhook"];

/// Gate state for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Forwarded untouched, no token required
    Bypass,
    /// Requires a valid access token
    Guarded,
}

/// Path-prefix bypass policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BypassPolicy {
    prefixes: Vec<String>,
}

impl BypassPolicy {
    /// Build a policy from prefixes. Blank entries are dropped and trailing
    /// slashes trimmed, so `/webhook/` and `/webhook` behave the same.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefixes = prefixes
            .into_iter()
            .filter_map(|p| {
                let trimmed = p.as_ref().trim();
                if trimmed.is_empty() {
                    return None;
                }
                let normalized = trimmed.trim_end_matches('/');
                Some(if normalized.is_empty() {
                    "/".to_string()
                } else {
                    normalized.to_string()
                })
            })
            .collect();
        Self { prefixes }
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Paths with dot-segments are always guarded, since a later
    /// normalization step could resolve them out of the bypass prefix.
    pub fn classify(&self, path: &str) -> Gate {
        if has_dot_segment(path) {
            return Gate::Guarded;
        }
        if self.prefixes.iter().any(|prefix| matches_prefix(path, prefix)) {
            Gate::Bypass
        } else {
            Gate::Guarded
        }
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.classify(path) == Gate::Bypass
    }
}

impl Default for BypassPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_PATHS)
    }
}

/// `.` or `..` segments, raw or percent-encoded, including segments hidden
/// behind encoded or backslash separators.
fn has_dot_segment(path: &str) -> bool {
    let decoded = path
        .to_ascii_lowercase()
        .replace("%2e", ".")
        .replace("%2f", "/")
        .replace("%5c", "/")
        .replace('\\', "/");
    decoded.split('/').any(|segment| segment == "." || segment == "..")
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

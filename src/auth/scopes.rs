// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Required-scope pre-check.
//!
//! Reads the `scp` claim WITHOUT verifying the signature, so a token missing
//! a scope is rejected before any key lookup. Passing this check establishes
//! nothing; the token must still go through
//! [`TokenVerifier`](super::verifier::TokenVerifier).

use std::collections::HashSet;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::{Map, Value};

use super::error::AuthError;

/// Default scope the API exposes to clients.
pub const DEFAULT_SCOPE: &str = "access_as_user";

/// Read the payload of `header.payload.signature` without looking at the
/// header, so an unsupported `alg` is left for the verifier to report.
fn unverified_claims(token: &str) -> Option<Map<String, Value>> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return None,
    };
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Check that every scope in `required` is granted by the token's `scp` claim.
pub fn check_scopes<S: AsRef<str>>(token: &str, required: &[S]) -> Result<(), AuthError> {
    let claims = unverified_claims(token).ok_or_else(|| {
        tracing::debug!("Unable to read unverified claims");
        AuthError::MalformedToken
    })?;

    let granted: HashSet<&str> = match claims.get("scp") {
        None => HashSet::new(),
        Some(Value::String(scp)) => scp.split(' ').filter(|s| !s.is_empty()).collect(),
        Some(other) => {
            tracing::debug!(scp = %other, "Scope claim is not a space-delimited string");
            return Err(AuthError::MalformedScopes);
        }
    };

    for scope in required {
        let scope: &str = scope.as_ref();
        if !granted.contains(scope) {
            tracing::debug!(scope, "Token is missing a required scope");
            return Err(AuthError::MissingScope);
        }
    }

    Ok(())
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Claim validation rules and verified claim sets.

use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Algorithm, Validation};
use serde_json::{Map, Value};

use super::error::AuthError;

/// Claims every access token must carry.
pub const REQUIRED_CLAIMS: [&str; 6] = ["aud", "exp", "iss", "iat", "nbf", "sub"];

/// Build the validation rules for access tokens.
///
/// RS256 only. `aud`, `exp` and `nbf` are checked by jsonwebtoken, `iss` is
/// matched only when a trusted issuer is configured. `iat` and `sub` are
/// checked by [`check_issued_at`] and [`check_subject`].
pub fn validation_rules(audience: &str, issuer: Option<&str>, leeway: u64) -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_required_spec_claims(&REQUIRED_CLAIMS);
    validation.set_audience(&[audience]);
    if let Some(issuer) = issuer {
        validation.set_issuer(&[issuer]);
    }
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.validate_aud = true;
    validation.leeway = leeway;
    validation
}

/// Map a jsonwebtoken error to the reported failure kind.
pub fn classify(err: &JwtError) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        ErrorKind::InvalidAudience
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidSubject
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims,
        ErrorKind::InvalidToken
        | ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::MissingAlgorithm
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => AuthError::InvalidToken,
        _ => AuthError::DecodeFailure,
    }
}

/// `iat` must be a number and not lie in the future.
pub fn check_issued_at(claims: &Map<String, Value>, now: u64, leeway: u64) -> Result<(), AuthError> {
    let iat = claims
        .get("iat")
        .and_then(Value::as_f64)
        .ok_or(AuthError::InvalidClaims)?;

    if iat > (now + leeway) as f64 {
        return Err(AuthError::InvalidClaims);
    }
    Ok(())
}

/// `sub` must be a string.
pub fn check_subject(claims: &Map<String, Value>) -> Result<(), AuthError> {
    match claims.get("sub") {
        Some(Value::String(_)) => Ok(()),
        _ => Err(AuthError::InvalidClaims),
    }
}

/// Claim set whose signature and claims have been verified.
///
/// Only [`TokenVerifier`](super::verifier::TokenVerifier) hands these out.
#[derive(Debug, Clone)]
pub struct VerifiedClaims(Map<String, Value>);

impl VerifiedClaims {
    pub(crate) fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// Raw claim value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Claim value if it is a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Subject claim.
    pub fn subject(&self) -> Option<&str> {
        self.get_str("sub")
    }
}

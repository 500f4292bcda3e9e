// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Authentication error type.
///
/// Every token-validation failure is reported as `401 Unauthorized` with its
/// own detail text. `ForbiddenAccess` is the only `403`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No authorization header present
    #[error("Not authenticated")]
    MissingAuthHeader,
    /// Authorization header is not `Bearer <token>`
    #[error("Invalid authorization header format (expected 'Bearer <token>')")]
    InvalidAuthHeader,
    /// Claims could not be read from the token at all
    #[error("Malformed token received")]
    MalformedToken,
    /// `scp` claim is present but not a string
    #[error("Malformed scopes")]
    MalformedScopes,
    /// A required scope is absent from `scp`
    #[error("Missing a required scope")]
    MissingScope,
    /// Token header has no `kid`
    #[error("The token does not contain kid")]
    MissingKeyId,
    /// No signing key for the `kid`, even after refreshing the key set
    #[error("No signing key found for the token")]
    KeyNotFound,
    /// Signature is valid but a claim other than `exp` failed validation
    #[error("The token has some invalid claims")]
    InvalidClaims,
    /// Signature is valid but `exp` has passed
    #[error("The token signature has expired")]
    ExpiredToken,
    /// Signature or structure rejected
    #[error("The token is invalid")]
    InvalidToken,
    /// Anything else that went wrong while decoding
    #[error("Unable to decode token")]
    DecodeFailure,
    /// Verified claims carry neither `oid` nor `sub`
    #[error("Unable to extract user details from token")]
    MissingSubject,
    /// Authenticated, but not a member of the admin group
    #[error("Admin privileges required")]
    ForbiddenAccess,
}

#[derive(Serialize)]
struct AuthErrorBody {
    detail: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::MalformedScopes => "malformed_scopes",
            AuthError::MissingScope => "missing_scope",
            AuthError::MissingKeyId => "missing_key_id",
            AuthError::KeyNotFound => "key_not_found",
            AuthError::InvalidClaims => "invalid_claims",
            AuthError::ExpiredToken => "expired_token",
            AuthError::InvalidToken => "invalid_token",
            AuthError::DecodeFailure => "decode_failure",
            AuthError::MissingSubject => "missing_subject",
            AuthError::ForbiddenAccess => "forbidden_access",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::ForbiddenAccess => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            detail: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        let mut response = (status, body).into_response();
        response
            .headers_mut()
            .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        response
    }
}

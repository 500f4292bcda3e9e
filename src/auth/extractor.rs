// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated users.
//!
//! ```rust,ignore
//! async fn me(Auth(user): Auth) -> impl IntoResponse { /* any valid token */ }
//! async fn settings(AdminOnly(user): AdminOnly) -> impl IntoResponse { /* admin group */ }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::gate::{require_admin, require_authenticated};
use super::{AuthError, User};
use crate::state::AppState;

/// Extract the bearer token from the `Authorization` header.
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let (scheme, token) = value.split_once(' ').ok_or(AuthError::InvalidAuthHeader)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}

/// Extractor for authenticated users.
pub struct Auth(pub User);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let user = state.authorizer.authorize(token).await?;
        Ok(Auth(require_authenticated(user)))
    }
}

/// Extractor that requires membership of the admin group.
pub struct AdminOnly(pub User);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;
        Ok(AdminOnly(require_admin(user, &state.admin_group_id)?))
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token -> [`User`] pipeline.

use std::sync::Arc;

use super::error::AuthError;
use super::keys::SigningKeyCache;
use super::scopes::check_scopes;
use super::user::User;
use super::verifier::TokenVerifier;
use crate::config::Settings;

/// Authorizes bearer tokens issued by one Entra tenant.
///
/// Cheap to clone; clones share the signing key cache.
#[derive(Clone)]
pub struct EntraAuthorizer {
    keys: SigningKeyCache,
    verifier: TokenVerifier,
    required_scopes: Arc<[String]>,
}

impl EntraAuthorizer {
    pub fn new(keys: SigningKeyCache, verifier: TokenVerifier, required_scopes: Vec<String>) -> Self {
        Self {
            keys,
            verifier,
            required_scopes: required_scopes.into(),
        }
    }

    /// Build the authorizer described by `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self, reqwest::Error> {
        let keys = SigningKeyCache::new(
            settings.entra_instance.as_str(),
            &settings.tenant_id,
            settings.jwks_timeout,
        )?;
        let verifier = TokenVerifier::with_options(
            &settings.api_audience,
            settings.issuer.as_deref(),
            settings.jwt_leeway,
        );
        Ok(Self::new(keys, verifier, settings.required_scopes.clone()))
    }

    /// Signing key cache shared by every request.
    pub fn keys(&self) -> &SigningKeyCache {
        &self.keys
    }

    /// Validate `token` and return the user it identifies.
    ///
    /// The unverified scope check runs first so that tokens lacking a scope
    /// never cause a key fetch.
    pub async fn authorize(&self, token: &str) -> Result<User, AuthError> {
        check_scopes(token, &self.required_scopes[..])?;
        let claims = self.verifier.verify(token, &self.keys).await?;
        User::from_claims(&claims)
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Entra ID signing key discovery and caching.
//!
//! ## Refresh
//!
//! Keys are fetched lazily. A lookup for an unknown `kid` triggers one full
//! refresh:
//!
//! 1. `GET {instance}/{tenant}/v2.0/.well-known/openid-configuration`
//! 2. `GET {jwks_uri}` from that document
//! 3. Every RSA key in `keys` is stored under its `kid`
//!
//! A failed refresh leaves the cache as it was; the lookup then reports
//! [`AuthError::KeyNotFound`]. Entries are never evicted.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE, Engine};
use jsonwebtoken::DecodingKey;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;

use super::error::AuthError;

/// Default timeout for the discovery and key-set requests.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Something that can turn a `kid` into a verification key.
pub trait KeyResolver: Send + Sync {
    /// Resolve the key for `kid`, failing with [`AuthError::KeyNotFound`].
    fn resolve(&self, kid: &str) -> impl Future<Output = Result<DecodingKey, AuthError>> + Send;
}

/// Why a key-set refresh did not produce any keys.
#[derive(Debug, Error)]
pub enum KeyFetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status} from {url}")]
    Status { status: StatusCode, url: String },
    #[error("discovery document has no jwks_uri")]
    MissingJwksUri,
    #[error("key set has no keys array")]
    MissingKeys,
}

#[derive(Deserialize)]
struct OpenIdConfiguration {
    #[serde(default)]
    jwks_uri: Option<String>,
}

#[derive(Deserialize)]
struct KeySet {
    #[serde(default)]
    keys: Option<Vec<serde_json::Value>>,
}

/// The parts of a JWK needed to rebuild an RSA public key.
#[derive(Deserialize)]
struct RsaJwk {
    kid: String,
    #[serde(default)]
    kty: Option<String>,
    n: String,
    e: String,
}

/// Process-wide signing key cache for one tenant.
///
/// Cheap to clone; clones share the same cache.
#[derive(Clone)]
pub struct SigningKeyCache {
    /// OpenID discovery document URL
    discovery_url: String,
    /// `kid` -> RSA public key
    keys: Arc<RwLock<HashMap<String, DecodingKey>>>,
    /// HTTP client
    client: reqwest::Client,
}

impl SigningKeyCache {
    /// Create a cache for `tenant` on the identity provider at `instance`
    /// (e.g. `https://login.microsoftonline.com`).
    pub fn new(instance: &str, tenant: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let discovery_url = format!(
            "{}/{}/v2.0/.well-known/openid-configuration",
            instance.trim_end_matches('/'),
            tenant
        );
        Self::from_discovery_url(discovery_url, timeout)
    }

    /// Create a cache that reads the given discovery document.
    pub fn from_discovery_url(
        discovery_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            discovery_url: discovery_url.into(),
            keys: Arc::new(RwLock::new(HashMap::new())),
            client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    /// Get the discovery document URL.
    pub fn discovery_url(&self) -> &str {
        &self.discovery_url
    }

    /// Get the key for `kid`, refreshing the key set once on a miss.
    pub async fn get_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(key) = self.cached(kid).await {
            return Ok(key);
        }

        tracing::debug!(kid, "Signing key not cached, refreshing key set");
        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, url = %self.discovery_url, "Signing key refresh failed");
        }

        self.cached(kid).await.ok_or_else(|| {
            tracing::debug!(kid, "Signing key not published by the identity provider");
            AuthError::KeyNotFound
        })
    }

    /// Fetch the full key set and store every usable key.
    ///
    /// Returns the number of keys stored by this refresh.
    pub async fn refresh(&self) -> Result<usize, KeyFetchError> {
        let discovery: OpenIdConfiguration = self.fetch_json(&self.discovery_url).await?;
        let jwks_uri = discovery.jwks_uri.ok_or(KeyFetchError::MissingJwksUri)?;

        let key_set: KeySet = self.fetch_json(&jwks_uri).await?;
        let entries = key_set.keys.ok_or(KeyFetchError::MissingKeys)?;

        let parsed: Vec<(String, DecodingKey)> = entries.into_iter().filter_map(parse_jwk).collect();
        let count = parsed.len();

        {
            let mut keys = self.keys.write().await;
            keys.extend(parsed);
        }

        tracing::info!(keys = count, jwks_uri = %jwks_uri, "Cached identity provider signing keys");
        Ok(count)
    }

    /// Check whether any key is cached.
    pub async fn is_populated(&self) -> bool {
        !self.keys.read().await.is_empty()
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.keys.read().await.len()
    }

    async fn cached(&self, kid: &str) -> Option<DecodingKey> {
        self.keys.read().await.get(kid).cloned()
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, KeyFetchError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(KeyFetchError::Status {
                status: response.status(),
                url: url.to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

impl KeyResolver for SigningKeyCache {
    async fn resolve(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        self.get_key(kid).await
    }
}

/// Pad a base64 string with `=` up to the next multiple of 4.
///
/// Key components in the key set are not always padded.
pub fn pad_base64(encoded: &str) -> String {
    let mut padded = encoded.to_string();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }
    padded
}

/// Decode a base64url key component, tolerating missing padding.
pub fn decode_component(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE.decode(pad_base64(encoded))
}

pub(crate) fn parse_jwk(value: serde_json::Value) -> Option<(String, DecodingKey)> {
    let jwk: RsaJwk = match serde_json::from_value(value) {
        Ok(jwk) => jwk,
        Err(e) => {
            tracing::debug!(error = %e, "Skipping key without kid/n/e");
            return None;
        }
    };

    if jwk.kty.as_deref().is_some_and(|kty| kty != "RSA") {
        tracing::debug!(kid = %jwk.kid, "Skipping non-RSA key");
        return None;
    }

    match (decode_component(&jwk.n), decode_component(&jwk.e)) {
        (Ok(n), Ok(e)) => Some((jwk.kid, DecodingKey::from_rsa_raw_components(&n, &e))),
        _ => {
            tracing::debug!(kid = %jwk.kid, "Skipping key with undecodable modulus or exponent");
            None
        }
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared helpers for auth tests: fixed RSA keys, token signing and a mock
//! identity provider.

use std::collections::HashMap;
use std::sync::Mutex;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{encode, get_current_timestamp, Algorithm, DecodingKey, EncodingKey, Header};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::error::AuthError;
use super::keys::{parse_jwk, KeyResolver, SigningKeyCache, DEFAULT_FETCH_TIMEOUT};

pub const PRIVATE_KEY_PEM: &str = include_str!("../../tests/fixtures/rsa_private.pem");
pub const OTHER_PRIVATE_KEY_PEM: &str = include_str!("../../tests/fixtures/rsa_other_private.pem");
/// Public halves of both keys, as `test-key-1` and `test-key-2`.
pub const JWKS_JSON: &str = include_str!("../../tests/fixtures/jwks.json");

pub const TENANT: &str = "11111111-2222-3333-4444-555555555555";
pub const AUDIENCE: &str = "api://test-client";

/// Claims of a token that passes every check.
pub fn valid_claims() -> Value {
    let now = get_current_timestamp();
    json!({
        "aud": AUDIENCE,
        "iss": format!("https://login.microsoftonline.com/{TENANT}/v2.0"),
        "iat": now - 60,
        "nbf": now - 60,
        "exp": now + 3600,
        "sub": "subject-123",
        "scp": "access_as_user",
        "name": "Ada Lovelace",
        "tid": TENANT,
        "groups": ["g1", "g2"],
    })
}

/// Sign `claims` with the `test-key-1` private key.
pub fn sign(claims: &Value, kid: Option<&str>) -> String {
    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY_PEM.as_bytes()).unwrap();
    sign_with(claims, Algorithm::RS256, kid, &key)
}

pub fn sign_with(claims: &Value, alg: Algorithm, kid: Option<&str>, key: &EncodingKey) -> String {
    let mut header = Header::new(alg);
    header.kid = kid.map(str::to_string);
    encode(&header, claims, key).unwrap()
}

/// A structurally valid token with a bogus signature.
pub fn unsigned_token(claims: Value) -> String {
    let header = r#"{"alg":"RS256","typ":"JWT","kid":"test-key-1"}"#;
    format!(
        "{}.{}.fake_signature",
        URL_SAFE_NO_PAD.encode(header.as_bytes()),
        URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes())
    )
}

/// Start a mock identity provider serving `jwks` and a cache pointed at it.
///
/// Both documents expect exactly `fetches` requests.
pub async fn mock_provider(jwks: Value, fetches: u64) -> (MockServer, SigningKeyCache) {
    let server = MockServer::start().await;
    let jwks_uri = format!("{}/{TENANT}/discovery/v2.0/keys", server.uri());

    Mock::given(method("GET"))
        .and(path(format!("/{TENANT}/v2.0/.well-known/openid-configuration")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issuer": format!("https://login.microsoftonline.com/{TENANT}/v2.0"),
            "jwks_uri": jwks_uri,
        })))
        .expect(fetches)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/{TENANT}/discovery/v2.0/keys")))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks))
        .expect(fetches)
        .mount(&server)
        .await;

    let cache = SigningKeyCache::new(&server.uri(), TENANT, DEFAULT_FETCH_TIMEOUT).unwrap();
    (server, cache)
}

/// In-memory resolver that records every `kid` it is asked for.
pub struct RecordingResolver {
    keys: HashMap<String, DecodingKey>,
    calls: Mutex<Vec<String>>,
}

impl RecordingResolver {
    pub fn from_jwks(jwks: &str) -> Self {
        let jwks: Value = serde_json::from_str(jwks).unwrap();
        let keys = jwks["keys"]
            .as_array()
            .unwrap()
            .iter()
            .cloned()
            .filter_map(parse_jwk)
            .collect();
        Self {
            keys,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl KeyResolver for RecordingResolver {
    async fn resolve(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        self.calls.lock().unwrap().push(kid.to_string());
        self.keys.get(kid).cloned().ok_or(AuthError::KeyNotFound)
    }
}

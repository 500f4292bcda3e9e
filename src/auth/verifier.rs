// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access token signature and claim verification.

use jsonwebtoken::{decode, decode_header, get_current_timestamp, Validation};
use serde_json::{Map, Value};

use super::claims::{self, VerifiedClaims};
use super::error::AuthError;
use super::keys::KeyResolver;

/// Clock skew tolerance for `exp`, `nbf` and `iat`. None by default.
pub const DEFAULT_LEEWAY: u64 = 0;

/// Verifies RS256 access tokens for one API audience.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    validation: Validation,
}

impl TokenVerifier {
    /// Create a verifier expecting `audience` in the `aud` claim.
    pub fn new(audience: &str) -> Self {
        Self::with_options(audience, None, DEFAULT_LEEWAY)
    }

    /// Create a verifier that also pins the issuer and uses a custom leeway.
    pub fn with_options(audience: &str, issuer: Option<&str>, leeway: u64) -> Self {
        Self {
            validation: claims::validation_rules(audience, issuer, leeway),
        }
    }

    /// Verify `token` and return its claims.
    ///
    /// The `kid` is read first; the key is resolved only for tokens that
    /// carry one. Nothing is returned unless signature and claims pass.
    pub async fn verify<R: KeyResolver>(
        &self,
        token: &str,
        keys: &R,
    ) -> Result<VerifiedClaims, AuthError> {
        let header = decode_header(token).map_err(|e| {
            tracing::debug!(error = %e, "Unable to read token header");
            claims::classify(&e)
        })?;

        let kid = header.kid.ok_or_else(|| {
            tracing::debug!("Token header has no kid");
            AuthError::MissingKeyId
        })?;

        let key = keys.resolve(&kid).await?;

        let token_data = decode::<Map<String, Value>>(token, &key, &self.validation).map_err(|e| {
            let kind = claims::classify(&e);
            tracing::debug!(kid = %kid, error = %e, reason = kind.error_code(), "Token rejected");
            kind
        })?;

        let verified = token_data.claims;
        claims::check_issued_at(&verified, get_current_timestamp(), self.validation.leeway)?;
        claims::check_subject(&verified)?;

        Ok(VerifiedClaims::new(verified))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support::{
        mock_provider, sign, sign_with, valid_claims, RecordingResolver, AUDIENCE, JWKS_JSON,
        OTHER_PRIVATE_KEY_PEM, PRIVATE_KEY_PEM,
    };
    use jsonwebtoken::{Algorithm, EncodingKey};
    use serde_json::json;

    fn resolver() -> RecordingResolver {
        RecordingResolver::from_jwks(JWKS_JSON)
    }

    #[tokio::test]
    async fn valid_token_yields_claims() {
        let keys = resolver();
        let token = sign(&valid_claims(), Some("test-key-1"));

        let claims = TokenVerifier::new(AUDIENCE).verify(&token, &keys).await.unwrap();
        assert_eq!(claims.subject(), Some("subject-123"));
        assert_eq!(keys.calls(), vec!["test-key-1".to_string()]);
    }

    #[tokio::test]
    async fn missing_kid_fails_without_key_lookup() {
        let keys = resolver();
        let token = sign(&valid_claims(), None);

        let err = TokenVerifier::new(AUDIENCE).verify(&token, &keys).await.unwrap_err();
        assert_eq!(err, AuthError::MissingKeyId);
        assert!(keys.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_kid_is_key_not_found() {
        let keys = resolver();
        let token = sign(&valid_claims(), Some("unknown"));

        let err = TokenVerifier::new(AUDIENCE).verify(&token, &keys).await.unwrap_err();
        assert_eq!(err, AuthError::KeyNotFound);
    }

    #[tokio::test]
    async fn expired_token_is_expired_not_invalid_claims() {
        let keys = resolver();
        let now = get_current_timestamp();
        let mut claims = valid_claims();
        claims["iat"] = json!(now - 7200);
        claims["nbf"] = json!(now - 7200);
        claims["exp"] = json!(now - 3600);
        let token = sign(&claims, Some("test-key-1"));

        let err = TokenVerifier::new(AUDIENCE).verify(&token, &keys).await.unwrap_err();
        assert_eq!(err, AuthError::ExpiredToken);
    }

    #[tokio::test]
    async fn no_grace_period_after_expiry_by_default() {
        let keys = resolver();
        let mut claims = valid_claims();
        claims["exp"] = json!(get_current_timestamp() - 30);
        let token = sign(&claims, Some("test-key-1"));

        let err = TokenVerifier::new(AUDIENCE).verify(&token, &keys).await.unwrap_err();
        assert_eq!(err, AuthError::ExpiredToken);

        let lenient = TokenVerifier::with_options(AUDIENCE, None, 60);
        assert!(lenient.verify(&token, &keys).await.is_ok());
    }

    #[tokio::test]
    async fn wrong_audience_is_invalid_claims() {
        let keys = resolver();
        let mut claims = valid_claims();
        claims["aud"] = json!("api://someone-else");
        let token = sign(&claims, Some("test-key-1"));

        let err = TokenVerifier::new(AUDIENCE).verify(&token, &keys).await.unwrap_err();
        assert_eq!(err, AuthError::InvalidClaims);
    }

    #[tokio::test]
    async fn every_registered_claim_is_required() {
        let keys = resolver();
        for claim in ["aud", "exp", "iss", "iat", "nbf", "sub"] {
            let mut claims = valid_claims();
            claims.as_object_mut().unwrap().remove(claim);
            let token = sign(&claims, Some("test-key-1"));

            let err = TokenVerifier::new(AUDIENCE).verify(&token, &keys).await.unwrap_err();
            assert_eq!(err, AuthError::InvalidClaims, "without {claim}");
        }
    }

    #[tokio::test]
    async fn not_yet_valid_token_is_invalid_claims() {
        let keys = resolver();
        let mut claims = valid_claims();
        claims["nbf"] = json!(get_current_timestamp() + 3600);
        let token = sign(&claims, Some("test-key-1"));

        let err = TokenVerifier::new(AUDIENCE).verify(&token, &keys).await.unwrap_err();
        assert_eq!(err, AuthError::InvalidClaims);
    }

    #[tokio::test]
    async fn pinned_issuer_must_match() {
        let keys = resolver();
        let token = sign(&valid_claims(), Some("test-key-1"));

        let verifier = TokenVerifier::with_options(AUDIENCE, Some("https://elsewhere/v2.0"), 60);
        assert_eq!(verifier.verify(&token, &keys).await.unwrap_err(), AuthError::InvalidClaims);
    }

    #[tokio::test]
    async fn signature_from_another_key_is_invalid_token() {
        let keys = resolver();
        let token = sign_with(
            &valid_claims(),
            Algorithm::RS256,
            Some("test-key-1"),
            &EncodingKey::from_rsa_pem(OTHER_PRIVATE_KEY_PEM.as_bytes()).unwrap(),
        );

        let err = TokenVerifier::new(AUDIENCE).verify(&token, &keys).await.unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);
    }

    #[tokio::test]
    async fn hs256_token_is_invalid_token() {
        let keys = resolver();
        let token = sign_with(
            &valid_claims(),
            Algorithm::HS256,
            Some("test-key-1"),
            &EncodingKey::from_secret(b"shared-secret"),
        );

        let err = TokenVerifier::new(AUDIENCE).verify(&token, &keys).await.unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);
    }

    #[tokio::test]
    async fn rs384_token_is_invalid_token() {
        let keys = resolver();
        let token = sign_with(
            &valid_claims(),
            Algorithm::RS384,
            Some("test-key-1"),
            &EncodingKey::from_rsa_pem(PRIVATE_KEY_PEM.as_bytes()).unwrap(),
        );

        let err = TokenVerifier::new(AUDIENCE).verify(&token, &keys).await.unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);
    }

    #[tokio::test]
    async fn tampered_payload_is_invalid_token() {
        let keys = resolver();
        let token = sign(&valid_claims(), Some("test-key-1"));
        let forged = {
            use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
            let mut claims = valid_claims();
            claims["sub"] = json!("someone-else");
            URL_SAFE_NO_PAD.encode(claims.to_string())
        };
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = &forged;

        let err = TokenVerifier::new(AUDIENCE)
            .verify(&parts.join("."), &keys)
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);
    }

    #[tokio::test]
    async fn garbage_header_is_invalid_token() {
        let keys = resolver();
        let err = TokenVerifier::new(AUDIENCE).verify("zzz.yyy.xxx", &keys).await.unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);
        assert!(keys.calls().is_empty());
    }

    #[tokio::test]
    async fn verifies_against_cache_populated_from_provider() {
        let jwks: serde_json::Value = serde_json::from_str(JWKS_JSON).unwrap();
        let (server, cache) = mock_provider(jwks, 1).await;
        let verifier = TokenVerifier::new(AUDIENCE);

        for _ in 0..3 {
            let token = sign(&valid_claims(), Some("test-key-1"));
            assert!(verifier.verify(&token, &cache).await.is_ok());
        }

        server.verify().await;
    }
}

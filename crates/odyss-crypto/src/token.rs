//! Session tokens: HS256 JWTs identifying a user.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};

/// Default token lifetime: 7 days. `ACCESS_TOKEN_EXPIRE_MINUTES` overrides it
/// at the server.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 7;

/// JWT claims. `sub` is the user id as a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

/// Issues and resolves session tokens with a shared signing key.
///
/// The key is wiped from memory on drop and never printed.
#[derive(Clone)]
pub struct SessionTokens {
    signing_key: Zeroizing<Vec<u8>>,
    ttl: Duration,
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("signing_key", &"[REDACTED]")
            .field("ttl_minutes", &self.ttl.num_minutes())
            .finish()
    }
}

impl SessionTokens {
    /// Create with the default 7 day lifetime.
    pub fn new(signing_key: impl AsRef<[u8]>) -> Self {
        Self::with_ttl_minutes(signing_key, DEFAULT_TOKEN_TTL_MINUTES)
    }

    pub fn with_ttl_minutes(signing_key: impl AsRef<[u8]>, minutes: i64) -> Self {
        Self {
            signing_key: Zeroizing::new(signing_key.as_ref().to_vec()),
            ttl: Duration::minutes(minutes),
        }
    }

    /// Issue a token for `user_id` expiring after the configured lifetime.
    pub fn issue(&self, user_id: i64) -> CryptoResult<String> {
        self.issue_with_ttl(user_id, self.ttl)
    }

    /// Issue a token with an explicit lifetime. A negative lifetime yields an
    /// already-expired token.
    pub fn issue_with_ttl(&self, user_id: i64, ttl: Duration) -> CryptoResult<String> {
        if self.signing_key.is_empty() {
            return Err(CryptoError::InvalidInput(
                "signing key must not be empty".to_string(),
            ));
        }
        let now = Utc::now();
        let exp = (now + ttl).timestamp().max(0) as usize;
        let claims = Claims {
            sub: user_id.to_string(),
            exp,
            iat: now.timestamp().max(0) as usize,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.signing_key),
        )
        .map_err(|e| CryptoError::Token(e.to_string()))
    }

    /// Resolve a token to its user id.
    ///
    /// Bad signature, wrong algorithm, expiry, a missing `exp` or a
    /// non-numeric `sub` all resolve to `None`.
    pub fn resolve(&self, token: &str) -> Option<i64> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        // Expiry is exact: a token is dead the second `exp` passes.
        validation.leeway = 0;

        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.signing_key),
            &validation,
        ) {
            Ok(data) => data.claims.sub.parse::<i64>().ok(),
            Err(e) => {
                tracing::debug!(
                    subsystem = "crypto",
                    component = "token",
                    error = %e,
                    "Session token rejected"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_resolve() {
        let tokens = SessionTokens::new("test-key");
        let token = tokens.issue(7).unwrap();
        assert_eq!(tokens.resolve(&token), Some(7));
    }

    #[test]
    fn test_default_ttl_is_seven_days() {
        let key = "test-key";
        let token = SessionTokens::new(key).issue(7).unwrap();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        let claims = decode::<Claims>(&token, &DecodingKey::from_secret(key.as_bytes()), &validation)
            .unwrap()
            .claims;
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tokens = SessionTokens::new("test-key");
        let token = tokens.issue_with_ttl(7, Duration::hours(-2)).unwrap();
        assert_eq!(tokens.resolve(&token), None);
    }

    #[test]
    fn test_just_expired_token_is_rejected() {
        let tokens = SessionTokens::new("test-key");
        let token = tokens.issue_with_ttl(7, Duration::seconds(-5)).unwrap();
        assert_eq!(tokens.resolve(&token), None);
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let issuer = SessionTokens::new("key-one");
        let verifier = SessionTokens::new("key-two");
        let token = issuer.issue(7).unwrap();
        assert_eq!(verifier.resolve(&token), None);
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let tokens = SessionTokens::new("test-key");
        let token = tokens.issue(7).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_payload = {
            let other = tokens.issue(8).unwrap();
            other.split('.').nth(1).unwrap().to_string()
        };
        parts[1] = &forged_payload;
        assert_eq!(tokens.resolve(&parts.join(".")), None);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let tokens = SessionTokens::new("test-key");
        assert_eq!(tokens.resolve(""), None);
        assert_eq!(tokens.resolve("not.a.token"), None);
        assert_eq!(tokens.resolve("abc"), None);
    }

    #[test]
    fn test_non_numeric_subject_is_rejected() {
        let key = "test-key";
        let claims = Claims {
            sub: "alice".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
            iat: Utc::now().timestamp() as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(key.as_bytes()),
        )
        .unwrap();
        assert_eq!(SessionTokens::new(key).resolve(&token), None);
    }

    #[test]
    fn test_empty_key_cannot_issue() {
        let tokens = SessionTokens::new("");
        assert!(matches!(
            tokens.issue(1),
            Err(CryptoError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let tokens = SessionTokens::new("super-secret-key");
        let debug = format!("{:?}", tokens);
        assert!(!debug.contains("super-secret-key"));
        assert!(debug.contains("REDACTED"));
    }
}

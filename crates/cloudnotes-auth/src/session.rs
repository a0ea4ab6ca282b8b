//! Session issuer: signed, time-bounded bearer tokens.
//!
//! Tokens use the compact HS256 layout
//! `base64url(header).base64url(claims).base64url(signature)` where the
//! signature is HMAC-SHA256 over `header.claims`. Nothing is stored server
//! side; a token is valid exactly when its signature verifies under the
//! configured secret and `exp` lies in the future. There is no refresh or
//! rotation: once a token expires the user logs in again.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Default session lifetime (one hour).
pub const DEFAULT_SESSION_TTL_SECS: i64 = 3600;

/// Longest accepted session lifetime (30 days).
pub const MAX_SESSION_TTL_SECS: i64 = 30 * 24 * 3600;

/// Minimum signing secret length in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

const ALGORITHM: &str = "HS256";

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

/// Claims carried inside a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id the session was issued to.
    pub sub: Uuid,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

/// Issues and resolves session tokens with one secret and one fixed lifetime.
#[derive(Clone)]
pub struct SessionIssuer {
    key: Vec<u8>,
    ttl: Duration,
}

impl std::fmt::Debug for SessionIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIssuer")
            .field("key", &"[REDACTED]")
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish()
    }
}

impl SessionIssuer {
    /// Create an issuer. The secret must be at least [`MIN_SECRET_LENGTH`]
    /// bytes and the lifetime between one second and [`MAX_SESSION_TTL_SECS`].
    pub fn new(secret: &[u8], ttl: Duration) -> AuthResult<Self> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(AuthError::SecretTooShort(MIN_SECRET_LENGTH));
        }
        if ttl < Duration::seconds(1) || ttl > Duration::seconds(MAX_SESSION_TTL_SECS) {
            return Err(AuthError::InvalidLifetime(MAX_SESSION_TTL_SECS));
        }
        Ok(Self {
            key: secret.to_vec(),
            ttl,
        })
    }

    /// Lifetime applied to every token this issuer signs.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user_id`, valid from now for the configured lifetime.
    pub fn issue(&self, user_id: Uuid) -> AuthResult<String> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, user_id: Uuid, now: DateTime<Utc>) -> AuthResult<String> {
        let header = TokenHeader {
            alg: ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        };
        let claims = SessionClaims {
            sub: user_id,
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(self.ttl)
                .ok_or_else(|| AuthError::Encoding("expiry out of range".to_string()))?
                .timestamp(),
        };

        let header_b64 = encode_segment(&header)?;
        let claims_b64 = encode_segment(&claims)?;
        let signing_input = format!("{}.{}", header_b64, claims_b64);
        let signature = self.sign(&signing_input)?;

        Ok(format!("{}.{}", signing_input, signature))
    }

    /// Verify a token and return the user id it was issued to.
    pub fn resolve(&self, token: &str) -> AuthResult<Uuid> {
        self.resolve_at(token, Utc::now()).map(|claims| claims.sub)
    }

    /// Verify a token as if the current time were `now` and return its claims.
    pub fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<SessionClaims> {
        let mut parts = token.split('.');
        let (header_b64, claims_b64, signature_b64) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(h), Some(c), Some(s), None) => (h, c, s),
                _ => return Err(AuthError::MalformedToken),
            };

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| AuthError::MalformedToken)?;
        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::BadSignature)?;

        let header: TokenHeader = decode_segment(header_b64)?;
        if header.alg != ALGORITHM {
            return Err(AuthError::UnsupportedAlgorithm);
        }

        let claims: SessionClaims = decode_segment(claims_b64)?;
        if claims.exp <= now.timestamp() {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }

    fn mac(&self) -> AuthResult<HmacSha256> {
        HmacSha256::new_from_slice(&self.key)
            .map_err(|_| AuthError::SecretTooShort(MIN_SECRET_LENGTH))
    }

    fn sign(&self, signing_input: &str) -> AuthResult<String> {
        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }
}

fn encode_segment<T: Serialize>(value: &T) -> AuthResult<String> {
    let json = serde_json::to_vec(value).map_err(|e| AuthError::Encoding(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> AuthResult<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::MalformedToken)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::MalformedToken)
}

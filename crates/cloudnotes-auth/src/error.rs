//! Error types for authentication operations.

use thiserror::Error;

/// Result alias for authentication operations.
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Authentication errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    Hash(String),

    /// A stored hash could not be parsed.
    #[error("Invalid password hash: {0}")]
    InvalidHash(String),

    /// Signing secret is shorter than the minimum.
    #[error("Session secret too short (minimum {0} bytes required)")]
    SecretTooShort(usize),

    /// Session lifetime is not positive or exceeds the maximum.
    #[error("Session lifetime must be between 1 and {0} seconds")]
    InvalidLifetime(i64),

    /// Token is not three base64url segments with valid JSON inside.
    #[error("Malformed session token")]
    MalformedToken,

    /// Token header names an algorithm other than HS256.
    #[error("Unsupported session token algorithm")]
    UnsupportedAlgorithm,

    /// Signature does not match - token was tampered with or signed elsewhere.
    #[error("Invalid session token signature")]
    BadSignature,

    /// Token lifetime has elapsed.
    #[error("Session token expired")]
    Expired,

    /// Token segments could not be serialized.
    #[error("Session token encoding failed: {0}")]
    Encoding(String),

    /// Background hashing task did not complete.
    #[error("Background task failed: {0}")]
    Task(String),
}

impl AuthError {
    /// Whether this error describes an unusable bearer token rather than a
    /// server-side fault.
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::MalformedToken
                | AuthError::UnsupportedAlgorithm
                | AuthError::BadSignature
                | AuthError::Expired
        )
    }
}

impl From<AuthError> for cloudnotes_core::Error {
    fn from(err: AuthError) -> Self {
        let msg = err.to_string();
        if err.is_token_rejection() {
            return cloudnotes_core::Error::InvalidSession(msg);
        }
        match err {
            AuthError::SecretTooShort(_) | AuthError::InvalidLifetime(_) => {
                cloudnotes_core::Error::Config(msg)
            }
            _ => cloudnotes_core::Error::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudnotes_core::Error;

    #[test]
    fn test_token_errors_map_to_invalid_session() {
        for err in [
            AuthError::MalformedToken,
            AuthError::UnsupportedAlgorithm,
            AuthError::BadSignature,
            AuthError::Expired,
        ] {
            assert!(matches!(Error::from(err), Error::InvalidSession(_)));
        }
    }

    #[test]
    fn test_short_secret_maps_to_config() {
        let err: Error = AuthError::SecretTooShort(32).into();
        assert!(matches!(err, Error::Config(_)));
        let err: Error = AuthError::InvalidLifetime(60).into();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_hash_failure_maps_to_internal() {
        let err: Error = AuthError::Hash("boom".to_string()).into();
        assert!(matches!(err, Error::Internal(_)));
    }
}

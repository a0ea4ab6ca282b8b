//! Error types for CloudNotes.

use thiserror::Error;

/// Result type alias using CloudNotes' Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for CloudNotes operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Missing or empty required input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Duplicate unique key (e.g. an already registered email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No row with this id under this owner
    #[error("Not found: {0}")]
    NotFound(String),

    /// Login rejected. Never says whether the email or the password was wrong.
    #[error("Invalid credentials")]
    AuthFailure,

    /// No bearer credential was presented
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Bearer credential was tampered with, malformed, or expired
    #[error("Invalid session: {0}")]
    InvalidSession(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error wraps a PostgreSQL unique_violation (SQLSTATE 23505).
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Internal(format!("serialization: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("Note not found".to_string());
        assert_eq!(err.to_string(), "Not found: Note not found");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("Title is required".to_string());
        assert_eq!(err.to_string(), "Invalid input: Title is required");
    }

    #[test]
    fn test_error_display_conflict() {
        let err = Error::Conflict("email taken".to_string());
        assert_eq!(err.to_string(), "Conflict: email taken");
    }

    #[test]
    fn test_auth_failure_is_undifferentiated() {
        assert_eq!(Error::AuthFailure.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_error_display_sessions() {
        let missing = Error::Unauthenticated("missing bearer token".to_string());
        let invalid = Error::InvalidSession("token expired".to_string());
        assert_eq!(missing.to_string(), "Unauthenticated: missing bearer token");
        assert_eq!(invalid.to_string(), "Invalid session: token expired");
    }

    #[test]
    fn test_non_database_error_is_not_unique_violation() {
        assert!(!Error::Conflict("x".to_string()).is_unique_violation());
        assert!(!Error::Database(sqlx::Error::RowNotFound).is_unique_violation());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Internal(msg) => assert!(msg.starts_with("serialization:")),
            _ => panic!("Expected Internal error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}

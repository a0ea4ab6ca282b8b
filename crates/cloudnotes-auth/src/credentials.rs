//! Credential store: signup and login verification.

use std::sync::Arc;

use tracing::{debug, error, info};

use cloudnotes_core::{reject_nul, Error, Result, User, UserRepository};

use crate::error::AuthError;
use crate::password::{hash_password, verify_password};

/// Verified against when the email is unknown, so a missing account costs
/// the same Argon2 work as a wrong password.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$Kx3B0bT7nTm3a2Hqh1m8b8XbX8sYb0mY0G7ZcR8vJ0E";

/// Signup and login on top of a [`UserRepository`].
#[derive(Clone)]
pub struct CredentialStore {
    users: Arc<dyn UserRepository>,
}

impl CredentialStore {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Register a new account.
    ///
    /// Fails with `Error::InvalidInput` for a blank email or empty password and
    /// with `Error::Conflict` if the email is already registered.
    pub async fn signup(&self, email: &str, password: &str) -> Result<User> {
        validate_credentials(email, password)?;

        let password = password.to_string();
        let hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AuthError::Task(e.to_string()))??;

        let user = self.users.insert(email, &hash).await?;
        info!(
            subsystem = "auth",
            component = "credentials",
            op = "signup",
            user_id = %user.id,
            "User registered"
        );
        Ok(user)
    }

    /// Check an email/password pair.
    ///
    /// An unknown email and a wrong password both fail with
    /// `Error::AuthFailure`.
    pub async fn verify(&self, email: &str, password: &str) -> Result<User> {
        validate_credentials(email, password)?;

        let found = self.users.find_by_email(email).await?;
        let hash = found
            .as_ref()
            .map(|c| c.password_hash.clone())
            .unwrap_or_else(|| DUMMY_HASH.to_string());

        let password = password.to_string();
        let outcome = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::Task(e.to_string()))?;

        let matched = match (&found, outcome) {
            (_, Ok(matched)) => matched,
            (Some(credentials), Err(e)) => {
                error!(
                    subsystem = "auth",
                    component = "credentials",
                    op = "verify",
                    user_id = %credentials.id,
                    error = %e,
                    "Stored password hash is unreadable"
                );
                return Err(e.into());
            }
            (None, Err(_)) => false,
        };

        match found {
            Some(credentials) if matched => Ok(credentials.into_user()),
            _ => {
                debug!(
                    subsystem = "auth",
                    component = "credentials",
                    op = "verify",
                    "Credential check failed"
                );
                Err(Error::AuthFailure)
            }
        }
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(Error::InvalidInput(
            "Email and password are required".to_string(),
        ));
    }
    reject_nul("email", Some(email))
}

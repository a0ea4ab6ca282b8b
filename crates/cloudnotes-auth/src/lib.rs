//! # cloudnotes-auth
//!
//! Authentication primitives for CloudNotes:
//!
//! - [`password`]: Argon2id hashing and verification of raw passwords.
//! - [`session`]: the session issuer, which turns a user id into a signed,
//!   time-bounded bearer token and resolves such tokens back to a user id.
//! - [`credentials`]: the credential store (signup and login verification)
//!   layered over a [`cloudnotes_core::UserRepository`].

pub mod credentials;
pub mod error;
pub mod password;
pub mod session;

pub use credentials::CredentialStore;
pub use error::{AuthError, AuthResult};
pub use password::{hash_password, verify_password};
pub use session::{
    SessionClaims, SessionIssuer, DEFAULT_SESSION_TTL_SECS, MAX_SESSION_TTL_SECS,
    MIN_SECRET_LENGTH,
};

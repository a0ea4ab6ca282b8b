//! # cloudnotes-core
//!
//! Core types, traits, and abstractions for the CloudNotes service.
//!
//! This crate provides the domain models (users and notes), the request types
//! consumed by the note repository, and the repository traits that the
//! database and API crates implement and depend on.

pub mod error;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;

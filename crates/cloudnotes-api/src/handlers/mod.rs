//! Route handlers.

pub mod auth;
pub mod notes;
pub mod system;

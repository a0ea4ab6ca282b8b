//! # cloudnotes-api
//!
//! HTTP surface for CloudNotes: the axum router, the access gate, handlers,
//! error mapping, configuration and tracing setup. The binary in `main.rs`
//! wires these to a PostgreSQL [`cloudnotes_db::Database`].

pub mod config;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::ApiConfig;
pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;

//! Health and admin analytics.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use tracing::info;

use cloudnotes_core::Analytics;

use crate::error::ApiError;
use crate::gate::Owner;
use crate::state::AppState;

/// `GET /health`
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "UP",
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET /admin/analytics`: global counts across all users.
pub async fn analytics(
    State(state): State<AppState>,
    Owner(owner): Owner,
) -> Result<Json<Analytics>, ApiError> {
    let analytics = state.stats.analytics().await?;
    info!(
        subsystem = "api",
        component = "admin",
        op = "analytics",
        user_id = %owner,
        "Analytics requested"
    );
    Ok(Json(analytics))
}

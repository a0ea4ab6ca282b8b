//! Router assembly and HTTP layers.

use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use tracing::warn;
use uuid::Uuid;

use crate::gate::require_session;
use crate::handlers::{auth, notes, system};
use crate::state::AppState;

/// Maximum accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Routes without outer layers. Note and admin routes sit behind the access
/// gate; `route_layer` keeps unknown paths a plain 404.
fn routes(state: AppState) -> Router<AppState> {
    let gated = Router::new()
        .route("/notes", get(notes::list_notes).post(notes::create_note))
        .route("/notes/tags/all", get(notes::list_tags))
        .route(
            "/notes/:id",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .route("/notes/:id/pin", patch(notes::toggle_pin))
        .route("/notes/:id/archive", patch(notes::archive_note))
        .route("/notes/:id/unarchive", patch(notes::unarchive_note))
        .route("/admin/analytics", get(system::analytics))
        .route_layer(from_fn_with_state(state, require_session));

    Router::new()
        .route("/health", get(system::health_check))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .merge(gated)
}

/// Convert configured origins, skipping any that are not valid header values.
fn cors_origins(allowed_origins: &[String]) -> Vec<HeaderValue> {
    allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect()
}

/// Build the complete application: every route at the root and again
/// under `/api`, with tracing, request ids, CORS and a body size limit.
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let routes = routes(state.clone());

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(cors_origins(allowed_origins)))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .nest("/api", routes.clone())
        .merge(routes)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

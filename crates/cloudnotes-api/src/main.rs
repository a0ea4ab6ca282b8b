//! cloudnotes-api - HTTP API server for CloudNotes

use chrono::Duration;
use tokio::net::TcpListener;
use tracing::info;

use cloudnotes_api::telemetry::{self, LogConfig};
use cloudnotes_api::{build_router, ApiConfig, AppState};
use cloudnotes_auth::SessionIssuer;
use cloudnotes_db::{log_pool_metrics, Database};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let log_config = LogConfig::from_env();
    let _log_guard = telemetry::init(&log_config);
    info!(
        json = log_config.json,
        log_file = log_config.file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = ApiConfig::from_env()?;
    let sessions = SessionIssuer::new(
        config.jwt_secret.as_bytes(),
        Duration::seconds(config.session_ttl_secs),
    )?;

    info!("Connecting to database...");
    let db = Database::connect(&config.database_url, config.pool_config()).await?;
    log_pool_metrics(db.pool());

    if config.run_migrations {
        info!("Running database migrations...");
        db.migrate().await?;
        info!("Database migrations complete");
    }

    let state = AppState::from_database(&db, sessions);
    let app = build_router(state, &config.allowed_origins);

    let addr = config.bind_addr()?;
    info!("Starting server on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, closing database pool");
    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

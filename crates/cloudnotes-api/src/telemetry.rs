//! Tracing subscriber setup.
//!
//! Environment variables:
//!   LOG_FORMAT - "json" or "text" (default: "text")
//!   LOG_FILE   - path to log file (optional, daily rotation)
//!   LOG_ANSI   - "true"/"false" override ANSI colors (auto-detected by default)
//!   RUST_LOG   - standard env filter (default: "cloudnotes_api=debug,cloudnotes_db=info,tower_http=debug")

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "cloudnotes_api=debug,cloudnotes_db=info,tower_http=debug";

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub json: bool,
    pub file: Option<String>,
    pub ansi: Option<bool>,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self {
            json: std::env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false),
            file: std::env::var("LOG_FILE").ok().filter(|v| !v.is_empty()),
            ansi: std::env::var("LOG_ANSI")
                .ok()
                .map(|v| v == "true" || v == "1"),
        }
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process.
pub fn init(config: &LogConfig) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(path) = &config.file {
        let path = Path::new(path);
        let dir = path.parent().unwrap_or(Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("cloudnotes-api.log");
        let appender = tracing_appender::rolling::daily(dir, file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);

        if config.json {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(config.ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        return Some(guard);
    }

    if config.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        let mut layer = tracing_subscriber::fmt::layer();
        if let Some(ansi) = config.ansi {
            layer = layer.with_ansi(ansi);
        }
        registry.with(layer).init();
    }
    None
}

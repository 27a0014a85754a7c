//! Quill - Authenticated discussion service with an LLM chat relay

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::Config;
use quill_api::{AppState, create_router};
use quill_auth::TokenManager;
use quill_db::Database;
use quill_llm::{LlmClientConfig, build_backend};

/// Quill - Authenticated discussion service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "QUILL_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "QUILL_PORT")]
    port: Option<u16>,

    /// Token signing secret (at least 32 bytes)
    #[arg(long, env = "QUILL_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,
}

impl Args {
    /// Command-line and environment values take precedence over the file
    fn apply(self, config: &mut Config) {
        if let Some(bind) = self.bind {
            config.server.bind_address = bind;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(secret) = self.jwt_secret {
            config.auth.jwt_secret = Some(secret);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone();
    let loaded = Config::load(&config_path)?;
    let from_file = loaded.is_some();
    let mut config = loaded.unwrap_or_default();
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    init_logging(&config.logging.level, &config.logging.format);

    info!("Starting Quill v{}", env!("CARGO_PKG_VERSION"));
    if from_file {
        info!("Loaded configuration from {}", config_path);
    } else {
        info!("Config file not found at {}, using defaults", config_path);
    }

    // Create the database directory
    if let Some(parent) = Path::new(&config.database.path).parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let db = Database::new(&config.database_url(), config.database.max_connections)
        .await
        .context("Failed to open database")?;

    let secret = config
        .auth
        .jwt_secret
        .as_deref()
        .context("auth.jwt_secret is not set")?;
    let tokens = Arc::new(TokenManager::new(
        secret,
        chrono::Duration::seconds(config.auth.token_ttl_secs),
    ));

    let chat = build_backend(config.llm.url.clone().map(|url| LlmClientConfig {
        url,
        timeout_secs: config.llm.timeout_secs,
    }))
    .context("Failed to create LLM client")?;

    let metrics_handle = if config.metrics.enabled {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install metrics recorder")?;
        Some(Arc::new(handle))
    } else {
        None
    };

    let state = AppState::new(db, tokens, chat.clone());

    let mut app = create_router(state, metrics_handle);
    if let Some(cors) = cors_layer(&config.server.cors_origins)? {
        app = app.layer(cors);
    }
    let app = app.layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.server.bind_address, config.server.port)
        .parse()
        .context("Invalid bind address")?;

    info!("Listening on {}", addr);
    match &config.llm.url {
        Some(url) => info!("Chat backend: {} ({})", chat.name(), url),
        None => warn!("Chat backend: {}", chat.name()),
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Build the CORS layer for the configured origins
///
/// `"*"` allows any origin; an empty list means no CORS headers at all.
fn cors_layer(origins: &[String]) -> Result<Option<CorsLayer>> {
    if origins.is_empty() {
        return Ok(None);
    }

    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let values = origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin: {}", o))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(values)
    };

    Ok(Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(Any)
            .allow_headers(Any),
    ))
}

/// Initialize logging
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for CTRL+C: {}", e);
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
                error!("Failed to listen for SIGTERM: {}", e);
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

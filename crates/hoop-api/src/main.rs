//! Hoop Vision server binary.

use std::net::SocketAddr;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hoop_api::{create_router, metrics, ApiConfig, AppState, FrameJanitor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting hoop-api");

    let config = ApiConfig::from_env();
    info!(
        "API config: host={}, port={}, data_dir={}",
        config.host,
        config.port,
        config.data_dir.display()
    );
    if !config.is_production() {
        warn!(
            "Running in {} mode; error pages include internal details",
            config.environment
        );
    }

    let state = AppState::new(config.clone());
    state
        .prepare_dirs()
        .await
        .with_context(|| format!("creating data directories under {}", config.data_dir.display()))?;

    if let Err(e) = hoop_media::check_ffmpeg(&config.ffmpeg_path) {
        warn!("{}; /analyze will fail until it is installed", e);
    }

    let metrics_handle = if config.metrics_enabled {
        match metrics::init_metrics() {
            Ok(handle) => {
                info!("Prometheus metrics enabled at /metrics");
                Some(handle)
            }
            Err(e) => {
                error!("Failed to install Prometheus recorder: {}", e);
                None
            }
        }
    } else {
        None
    };

    // Start frame directory eviction
    let janitor = FrameJanitor::new(&config);
    tokio::spawn(async move {
        janitor.run().await;
    });

    let app = create_router(state, metrics_handle);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("binding {}:{}", config.host, config.port))?;
    info!("Hoop Vision running on http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Colored output for dev, JSON when `LOG_FORMAT=json`.
fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("hoop_api=info,hoop_media=info,tower_http=warn"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for CTRL+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}

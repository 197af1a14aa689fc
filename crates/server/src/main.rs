use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use shareclip_core::metadata::FfprobeProbe;
use shareclip_core::{load_config, validate_config, ConversionEngine, FfmpegTranscoder, OutputFormat};
use shareclip_server::api::create_router;
use shareclip_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var_os("SHARECLIP_LOG_JSON").is_some() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run() -> Result<()> {
    init_logging();
    info!("shareclip {}", VERSION);

    // Determine config path
    let config_path = std::env::var("SHARECLIP_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;
    info!("Configuration loaded successfully");
    info!("ffmpeg: {:?}", config.transcoder.ffmpeg_path);
    info!("Work directory: {:?}", config.transcoder.work_dir);

    tokio::fs::create_dir_all(&config.transcoder.work_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create work directory {:?}",
                config.transcoder.work_dir
            )
        })?;

    let transcoder = Arc::new(FfmpegTranscoder::new(&config.transcoder));
    let probe = Arc::new(FfprobeProbe::new(&config.transcoder));
    let state = Arc::new(AppState::new(config.clone(), transcoder, probe));

    // Warm up both engines so the first session doesn't pay for the load.
    // Failures are not fatal: the engines retry on first use.
    for format in OutputFormat::ALL {
        if let Err(e) = state.orchestrator().engine(format).initialize().await {
            warn!(%format, "Engine warm-up failed: {}", e);
        }
    }

    let sweeper = state.spawn_session_sweeper();
    let app = create_router(Arc::clone(&state));

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    state.shutdown();
    if let Err(e) = sweeper.await {
        warn!("Session sweeper ended abnormally: {}", e);
    }
    state.orchestrator().clear_cache();

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
}

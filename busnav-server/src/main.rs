//! Walking + bus route planning HTTP server.
//!
//! # Endpoints
//!
//! - `GET /health` - graph size and liveness
//! - `POST /route` - fastest route between two coordinates, `?geojson=true`
//!   adds the drawable path scene
//!
//! Logging honours `RUST_LOG` (default: `info`).

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod routes;
mod state;

use config::ServerConfig;
use state::AppState;

#[derive(Debug, Parser)]
#[command(version, about = "Walking + bus route planning server")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, default_value = "busnav.toml")]
    config: PathBuf,

    /// Listen address, overrides `bind` from the configuration file
    #[arg(long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = ServerConfig::from_file(&cli.config)?;
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    info!(config = %cli.config.display(), "starting busnav server");

    let loading = config.clone();
    let state = tokio::task::spawn_blocking(move || AppState::load(&loading)).await??;
    info!(
        intersections = state.planner.city().intersection_count(),
        stops = state.planner.city().stop_count(),
        "city graph ready"
    );

    let app = routes::create_router(state, &config.limits);

    let listener = TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

//! `chirpy-serve`: loads configuration, opens the database and serves the
//! Chirpy JSON API alongside the static front end under `/app/`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::body::Body;
use axum::http::Request;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::Span;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use chirpy_core::metrics::{start_metrics_server, try_init_metrics};
use chirpy_serve::{AppState, Config, router};

#[derive(Parser, Debug)]
#[command(name = "chirpy-serve", version)]
#[command(about = "Serve the Chirpy API and static front end")]
struct Args {
    /// Environment file read before configuration. Skipped when absent.
    #[arg(long, env = "DOTENV_PATH", default_value = ".env")]
    dotenv: PathBuf,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_filter: String,
}

/// Load `path` into the process environment. Returns whether a file was read.
fn load_dotenv(path: &Path) -> anyhow::Result<bool> {
    if !path.is_file() {
        return Ok(false);
    }

    dotenvy::from_path(path).with_context(|| format!("failed to load {}", path.display()))?;
    Ok(true)
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Before the subscriber, so a RUST_LOG set in the file takes effect.
    let dotenv_loaded = load_dotenv(&args.dotenv)?;
    init_tracing(&args.log_filter);
    if dotenv_loaded {
        tracing::info!(path = %args.dotenv.display(), "environment file loaded");
    }

    let config = Config::from_env()?;

    if let Some(port) = config.metrics_port {
        let Some(handle) = try_init_metrics() else {
            anyhow::bail!("metrics recorder already installed");
        };
        start_metrics_server(port, handle).await?;
    }

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    let state = AppState::new(config)?;
    let app = router(state).layer(TraceLayer::new_for_http().make_span_with(request_span));

    tracing::info!(addr = %listener.local_addr()?, "chirpy listening");
    axum::serve(listener, app).await?;

    Ok(())
}

//! Prometheus metrics helpers for Chirpy.
//!
//! The admin hit counter served at `/admin/metrics` is tracked separately by
//! the server; the metrics here are for scraping.
//!
//! # Usage
//!
//! ```rust,ignore
//! use chirpy_core::metrics::{start_metrics_server, try_init_metrics};
//!
//! #[tokio::main]
//! async fn main() {
//!     if let Some(handle) = try_init_metrics() {
//!         start_metrics_server(9091, handle).await.unwrap();
//!     }
//!
//!     chirpy_core::metrics::increment(chirpy_core::metrics::CHIRPS_CREATED, 1);
//! }
//! ```
//!
//! # Metric Naming Conventions
//!
//! - Prefix: `chirpy_`
//! - Suffix: unit or type (e.g., `_total`)

use axum::{Router, routing::get};
use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;

/// Requests served by the static file server.
pub const FILESERVER_HITS: &str = "chirpy_fileserver_hits_total";

/// Chirps persisted.
pub const CHIRPS_CREATED: &str = "chirpy_chirps_created_total";

/// Chirps rejected by validation.
pub const CHIRPS_REJECTED: &str = "chirpy_chirps_rejected_total";

/// Users created.
pub const USERS_CREATED: &str = "chirpy_users_created_total";

/// Try to initialize the Prometheus metrics recorder.
///
/// Returns `None` if a recorder is already installed for this process.
/// The returned handle is what [`start_metrics_server`] renders.
pub fn try_init_metrics() -> Option<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder().ok()?;
    register_common_metrics();
    Some(handle)
}

/// Start the Prometheus metrics HTTP server.
///
/// Binds `/metrics` on the given port and serves it from a background task.
pub async fn start_metrics_server(
    port: u16,
    handle: PrometheusHandle,
) -> Result<(), std::io::Error> {
    let app = Router::new().route(
        "/metrics",
        get(move || {
            let handle = handle.clone();
            async move { handle.render() }
        }),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Metrics server listening on http://{}/metrics", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "metrics server stopped");
        }
    });

    Ok(())
}

/// Register descriptions for the metrics Chirpy records.
fn register_common_metrics() {
    describe_counter!(FILESERVER_HITS, "Requests served under /app/");
    describe_counter!(CHIRPS_CREATED, "Chirps persisted to the database");
    describe_counter!(
        CHIRPS_REJECTED,
        "Chirps rejected by validation (label: reason)"
    );
    describe_counter!(USERS_CREATED, "Users created");
}

/// Increment a counter.
///
/// Convenience wrapper around `metrics::counter!`.
#[inline]
pub fn increment(name: &'static str, count: u64) {
    metrics::counter!(name).increment(count);
}

/// Increment a counter carrying a `reason` label.
#[inline]
pub fn increment_with_reason(name: &'static str, reason: &'static str) {
    metrics::counter!(name, "reason" => reason).increment(1);
}

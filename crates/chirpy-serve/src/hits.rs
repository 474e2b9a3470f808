//! File server hit counting.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use chirpy_core::metrics::{self, FILESERVER_HITS};

use crate::state::AppState;

/// Process-wide request counter shared by every handler. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct HitCounter {
    hits: Arc<AtomicU64>,
}

impl HitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
    }
}

/// Middleware that counts every request before handing it to the file server.
pub async fn count_hits(State(state): State<AppState>, request: Request, next: Next) -> Response {
    state.hits.increment();
    metrics::increment(FILESERVER_HITS, 1);

    next.run(request).await
}

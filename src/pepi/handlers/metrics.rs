use axum::{
    extract::{Extension, Request},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Request counter injected into the router; explicitly owned, no ambient
/// global, so tests never share state.
#[derive(Clone, Debug, Default)]
pub struct HitCounter(Arc<AtomicU64>);

impl HitCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

/// Middleware counting every request that passes through the API stack.
pub async fn count_hits(
    Extension(hits): Extension<HitCounter>,
    request: Request,
    next: Next,
) -> Response {
    hits.increment();

    next.run(request).await
}

// axum handler for the admin metrics page
pub async fn metrics(hits: Extension<HitCounter>) -> impl IntoResponse {
    Html(format!(
        "<html>\n  <body>\n    <h1>Welcome, Pepi Admin</h1>\n    <p>Pepi has been visited {} times!</p>\n  </body>\n</html>",
        hits.count()
    ))
}

// axum handler resetting the hit counter
pub async fn reset(hits: Extension<HitCounter>) -> impl IntoResponse {
    hits.reset();

    (StatusCode::OK, "Hit counter reset to 0")
}

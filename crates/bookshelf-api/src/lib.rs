//! # bookshelf-api: Axum API Service for the Book Catalog
//!
//! HTTP surface over the batch mutation processor and the credential
//! verifier.
//!
//! ## API Surface
//!
//! | Prefix                | Module                 | Format |
//! |-----------------------|------------------------|--------|
//! | `/books*`             | [`routes::books`]      | JSON   |
//! | `/`, `/about/`        | [`routes::accounts`]   | HTML   |
//! | `/auth/`, `/register/`| [`routes::accounts`]   | HTML   |
//! | `/openapi.json`       | [`openapi`]            | JSON   |
//! | `/health/*`           | health checks          | text   |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → TimeoutLayer → MetricsMiddleware → Handler
//! ```

pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod pages;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::timeout::TimeoutLayer;

use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health checks (`/health/*`) sit outside the timeout and metrics layers.
pub fn app(state: AppState) -> Router {
    let metrics = ApiMetrics::new();
    let timeout = state.config.request_timeout;

    let api = Router::new()
        .merge(routes::books::router())
        .merge(routes::accounts::router())
        .merge(openapi::router())
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TimeoutLayer::new(timeout))
        .layer(middleware::tracing_layer::layer())
        .layer(axum::Extension(metrics))
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness check. Always 200 while the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness check.
async fn readiness() -> &'static str {
    "ready"
}

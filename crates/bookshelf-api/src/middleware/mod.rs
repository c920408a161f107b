//! # Middleware
//!
//! - `metrics`: in-process request and error counters.
//! - `tracing_layer`: request spans via `tower_http::trace`.

pub mod metrics;
pub mod tracing_layer;

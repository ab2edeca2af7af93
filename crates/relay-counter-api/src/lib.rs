//! # relay-counter-api — Relay Count Ingestion Service
//!
//! Accepts relay usage counts from relayers over HTTP and writes them to a
//! [`RecordStore`](relay_counter_core::RecordStore).
//!
//! ## API Surface
//!
//! | Method | Path | Auth | Module |
//! |--------|------|------|--------|
//! | `GET`  | `/`  | none | [`routes::health`] |
//! | `POST` | `/v0/count` | API key | [`routes::counts`] |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → body limit → auth gate → Handler
//! ```
//!
//! The gate wraps every matched route uniformly and exempts only the health
//! path. Unmatched paths fall through to the router's 404 without a key
//! check.
//!
//! ## Lifecycle
//!
//! [`server::Server`] binds the listener and serves [`app`] until a
//! `CancellationToken` fires, then drains in-flight requests for a bounded
//! grace period.

pub mod auth;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use error::AppError;
pub use server::{ExitReason, Server, ServerError};
pub use state::{AppConfig, AppState};

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

/// Upper bound on request bodies. A relay count is well under 1 KiB.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Assemble the application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let keys = state.authorized_keys().clone();

    Router::new()
        .merge(routes::health::router())
        .merge(routes::counts::router())
        .route_layer(from_fn(auth::auth_middleware))
        .layer(Extension(keys))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

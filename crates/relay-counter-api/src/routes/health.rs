//! # Health Check
//!
//! `GET /` answers with fixed text whenever the process can serve HTTP. The
//! authorization gate lets this path through without a key.

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Path of the unauthenticated health endpoint.
pub const HEALTH_PATH: &str = "/";

/// Body returned by the health endpoint.
pub const HEALTH_MESSAGE: &str = "Transaction HTTP DB is up and running!";

pub fn router() -> Router<AppState> {
    Router::new().route(HEALTH_PATH, get(health_check))
}

async fn health_check() -> &'static str {
    HEALTH_MESSAGE
}

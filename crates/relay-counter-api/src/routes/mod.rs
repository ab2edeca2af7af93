//! # Route Modules
//!
//! Each module defines an Axum Router for one API surface area.
//! Routers are assembled in [`crate::app`].
//!
//! - `health` — `GET /`, unauthenticated liveness text.
//! - `counts` — `POST /v0/count`, relay count ingestion.

pub mod counts;
pub mod health;

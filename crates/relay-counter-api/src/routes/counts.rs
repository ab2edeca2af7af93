//! # Relay Count Ingestion
//!
//! `POST /v0/count` decodes a [`RelayCount`] from the request body and writes
//! it to the record store once. The body is parsed as JSON whatever its
//! `Content-Type`; relayers in the field do not all send one. Only the first
//! JSON value is read, so bytes after it are ignored.
//!
//! | Outcome | Status | Body |
//! |---|---|---|
//! | stored | 200 | `{"result":"ok"}` |
//! | body is not a relay count | 400 | `{"error":"<decode message>"}` |
//! | store failed | 500 | `{"error":"<store message>"}` |

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use relay_counter_core::RelayCount;

use crate::error::AppError;
use crate::state::AppState;

/// Path of the ingestion endpoint.
pub const COUNT_PATH: &str = "/v0/count";

/// Success envelope: `{"result":"ok"}`.
#[derive(Debug, Serialize)]
pub struct ResultBody {
    pub result: &'static str,
}

impl ResultBody {
    pub fn ok() -> Self {
        Self { result: "ok" }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route(COUNT_PATH, post(create_count))
}

async fn create_count(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ResultBody>, AppError> {
    let count = match decode_count(&body) {
        Ok(count) => count,
        Err(e) => {
            tracing::error!(error = %e, "relay count JSON decoding failed");
            return Err(e);
        }
    };

    let app = count.app_public_key.clone();
    state.store().write_relay_count(count).await.map_err(|e| {
        tracing::error!(error = %e, app = %app, "relay count write failed");
        AppError::from(e)
    })?;

    tracing::debug!(app = %app, "relay count accepted");
    Ok(Json(ResultBody::ok()))
}

/// Decode the first JSON value in `body` as a [`RelayCount`].
///
/// An empty or whitespace-only body is reported as `EOF`.
fn decode_count(body: &[u8]) -> Result<RelayCount, AppError> {
    serde_json::Deserializer::from_slice(body)
        .into_iter::<RelayCount>()
        .next()
        .unwrap_or_else(|| Err(<serde_json::Error as serde::de::Error>::custom("EOF")))
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

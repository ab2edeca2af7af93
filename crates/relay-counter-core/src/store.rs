//! # Record Store Contract
//!
//! The ingestion API writes decoded records through [`RecordStore`] and
//! knows nothing else about persistence. Implementations must be
//! `Send + Sync` so one instance can sit behind an `Arc` shared by every
//! request task. The trait is object-safe to support runtime backend
//! selection.
//!
//! Cancellation follows the async model: when a caller stops polling a
//! returned future (for example because the HTTP client disconnected), the
//! operation is abandoned at its current await point.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::record::RelayCount;

/// Errors surfaced by a storage backend.
///
/// The message of every variant is safe to return to API clients.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend cannot currently accept requests.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A read was requested with `from` later than `to`.
    #[error("invalid range: from {from} is after to {to}")]
    InvalidRange {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    /// Any other backend failure.
    #[error("{0}")]
    Backend(String),
}

/// Persistence capability for relay counts.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist one relay count. Called exactly once per accepted request;
    /// the caller never retries.
    async fn write_relay_count(&self, count: RelayCount) -> Result<(), StoreError>;

    /// Return the counts whose `day` falls within `from..=to`.
    async fn read_relay_counts(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<RelayCount>, StoreError>;

    /// Human-readable backend name for startup logs.
    fn backend_name(&self) -> &str;
}

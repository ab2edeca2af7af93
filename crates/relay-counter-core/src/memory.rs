//! In-memory storage backend using DashMap.
//!
//! Counts are keyed by `(app_public_key, day)` where `day` is the full
//! timestamp the relayer sent, not its calendar date: `T00:00Z` and `T12:00Z`
//! on the same date are separate entries. Repeated writes for the same key
//! accumulate. Data is lost on restart.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::record::RelayCount;
use crate::store::{RecordStore, StoreError};

type CountKey = (String, DateTime<Utc>);

/// Process-local [`RecordStore`] for development and tests.
///
/// Cheaply cloneable via `Arc`; all clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    counts: Arc<DashMap<CountKey, RelayCount>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct `(app, timestamp)` entries held.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &self.counts.len())
            .finish()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn write_relay_count(&self, count: RelayCount) -> Result<(), StoreError> {
        let key = (count.app_public_key.clone(), count.day);
        self.counts
            .entry(key)
            .and_modify(|existing| {
                existing.success = existing.success.saturating_add(count.success);
                existing.error = existing.error.saturating_add(count.error);
            })
            .or_insert_with(|| count.clone());

        tracing::debug!(
            app = %count.app_public_key,
            day = %count.day,
            success = count.success,
            error = count.error,
            "relay count stored"
        );
        Ok(())
    }

    async fn read_relay_counts(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<RelayCount>, StoreError> {
        if from > to {
            return Err(StoreError::InvalidRange { from, to });
        }

        let mut counts: Vec<RelayCount> = self
            .counts
            .iter()
            .filter(|entry| entry.day >= from && entry.day <= to)
            .map(|entry| entry.value().clone())
            .collect();
        counts.sort_by(|a, b| {
            a.day
                .cmp(&b.day)
                .then_with(|| a.app_public_key.cmp(&b.app_public_key))
        });
        Ok(counts)
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

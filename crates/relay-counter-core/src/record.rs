//! # Relay Count Record
//!
//! One day's relay tally for a single application, as reported by a relayer.
//! The wire shape is camelCase JSON:
//!
//! ```json
//! {"appPublicKey":"21","day":"2023-01-01T00:00:00Z","success":21,"error":7}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Relay usage for one application identity on one day.
///
/// Counts are unsigned, so a negative tally fails to decode. Absent fields
/// take their zero value (empty key, Unix epoch, zero counts); unknown fields
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelayCount {
    /// Opaque application identity the relays were served for.
    pub app_public_key: String,
    /// Period the counts belong to (RFC 3339 on the wire).
    pub day: DateTime<Utc>,
    /// Relays that completed successfully.
    pub success: u64,
    /// Relays that failed.
    pub error: u64,
}

impl RelayCount {
    /// Total relays represented by this record.
    pub fn total(&self) -> u64 {
        self.success.saturating_add(self.error)
    }
}

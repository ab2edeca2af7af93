//! # relay-counter-core — Records and Storage Contract
//!
//! Defines the relay usage record accepted by the ingestion API and the
//! [`RecordStore`] trait every persistence backend implements.
//!
//! ## Crate Policy
//!
//! - No HTTP types. The API crate depends on this crate, never the reverse.
//! - Backends are reached only through `Arc<dyn RecordStore>`, so swapping
//!   storage never touches request handling.
//! - [`MemoryStore`] is a development backend with no durability.

pub mod memory;
pub mod record;
pub mod store;

pub use memory::MemoryStore;
pub use record::RelayCount;
pub use store::{RecordStore, StoreError};

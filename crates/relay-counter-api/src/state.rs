//! # Application State
//!
//! [`AppConfig`] holds the process-lifetime settings assembled by the binary.
//! [`AppState`] is what route handlers see: the record store and the
//! authorized key set, both shared behind `Arc`.

use std::sync::Arc;
use std::time::Duration;

use relay_counter_core::RecordStore;

use crate::auth::AuthorizedKeys;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default bound on draining in-flight requests at shutdown.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Server configuration, immutable once the server starts.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Port to bind the HTTP server to on all interfaces.
    pub port: u16,
    /// How long graceful shutdown waits for in-flight requests.
    pub shutdown_grace: Duration,
    /// Keys accepted on every non-health route. `Debug` output is redacted.
    pub authorized_keys: AuthorizedKeys,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            authorized_keys: AuthorizedKeys::default(),
        }
    }
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn RecordStore>,
    authorized_keys: AuthorizedKeys,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, authorized_keys: AuthorizedKeys) -> Self {
        Self {
            store,
            authorized_keys,
        }
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub fn authorized_keys(&self) -> &AuthorizedKeys {
        &self.authorized_keys
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store.backend_name())
            .field("authorized_keys", &self.authorized_keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_counter_core::MemoryStore;

    #[test]
    fn default_config() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.shutdown_grace, Duration::from_secs(30));
        assert!(config.authorized_keys.is_empty());
    }

    #[test]
    fn config_debug_redacts_keys() {
        let config = AppConfig {
            authorized_keys: AuthorizedKeys::enabled(["hunter2"]),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"), "leaked key: {debug}");
        assert!(debug.contains("8080"));
    }

    #[test]
    fn state_debug_names_backend() {
        let state = AppState::new(Arc::new(MemoryStore::new()), AuthorizedKeys::default());
        assert!(format!("{state:?}").contains("memory"));
    }
}

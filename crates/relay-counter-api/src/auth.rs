//! # API Key Authorization Gate
//!
//! Every request except the health check must present a configured API key
//! verbatim in the `Authorization` header (no scheme prefix).
//!
//! ## Key Set
//!
//! [`AuthorizedKeys`] maps key strings to an enabled flag. A key that is
//! absent and a key mapped to `false` are both rejected. The set is built
//! once at startup and shared read-only through request extensions.
//!
//! A request without an `Authorization` header is checked as the empty
//! string, so a deployment that maps `""` to `true` accepts anonymous
//! ingestion. That behavior is kept for compatibility with existing
//! relayer configs.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use subtle::{Choice, ConstantTimeEq};

use crate::routes::health::HEALTH_PATH;

/// Plain-text body of every 401 response.
pub const UNAUTHORIZED_BODY: &str = "Unauthorized";

// ── Key Set ─────────────────────────────────────────────────────────────────

/// Immutable set of API keys allowed to call non-health endpoints.
///
/// Cheaply cloneable; clones share the same map. Custom `Debug` redacts the
/// key values to prevent credential leakage in logs.
#[derive(Clone, Default)]
pub struct AuthorizedKeys {
    keys: Arc<HashMap<String, bool>>,
}

impl AuthorizedKeys {
    /// Build a key set from an explicit key → enabled map.
    pub fn new(keys: HashMap<String, bool>) -> Self {
        Self {
            keys: Arc::new(keys),
        }
    }

    /// Build a key set in which every given key is enabled.
    pub fn enabled<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        keys.into_iter().map(|k| (k.into(), true)).collect()
    }

    /// Whether `candidate` is a key mapped to `true`.
    ///
    /// Compares against every configured key in constant time per key so
    /// timing does not reveal which prefix matched.
    pub fn is_authorized(&self, candidate: &str) -> bool {
        let mut authorized = Choice::from(0);
        for (key, enabled) in self.keys.iter() {
            authorized |= constant_time_key_eq(candidate, key) & Choice::from(u8::from(*enabled));
        }
        authorized.into()
    }

    /// Number of configured keys, enabled or not.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of keys mapped to `true`.
    pub fn enabled_count(&self) -> usize {
        self.keys.values().filter(|enabled| **enabled).count()
    }
}

impl FromIterator<(String, bool)> for AuthorizedKeys {
    fn from_iter<T: IntoIterator<Item = (String, bool)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl std::fmt::Debug for AuthorizedKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedKeys")
            .field("keys", &"[REDACTED]")
            .field("enabled", &self.enabled_count())
            .finish()
    }
}

/// Constant-time comparison of two keys.
///
/// When lengths differ, performs a dummy comparison to keep the work done
/// independent of where the mismatch is.
fn constant_time_key_eq(provided: &str, expected: &str) -> Choice {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return Choice::from(0);
    }
    provided.ct_eq(expected)
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Reject any non-health request whose `Authorization` header is not an
/// enabled key.
///
/// Expects [`AuthorizedKeys`] in the request extensions; when it is missing
/// the request is rejected rather than let through.
pub async fn auth_middleware(request: Request, next: Next) -> Response {
    if request.uri().path() == HEALTH_PATH {
        return next.run(request).await;
    }

    let authorized = {
        let Some(keys) = request.extensions().get::<AuthorizedKeys>() else {
            tracing::error!("authorized key set missing from request extensions");
            return unauthorized_response();
        };

        match request.headers().get(header::AUTHORIZATION) {
            None => keys.is_authorized(""),
            Some(value) => match value.to_str() {
                Ok(presented) => keys.is_authorized(presented),
                Err(_) => {
                    tracing::warn!(
                        path = %request.uri().path(),
                        "authentication failed: authorization header is not visible ASCII"
                    );
                    return unauthorized_response();
                }
            },
        }
    };

    if authorized {
        next.run(request).await
    } else {
        tracing::warn!(
            method = %request.method(),
            path = %request.uri().path(),
            "authentication failed: unrecognized api key"
        );
        unauthorized_response()
    }
}

fn unauthorized_response() -> Response {
    (StatusCode::UNAUTHORIZED, UNAUTHORIZED_BODY).into_response()
}

//! Durable client-side session state.
//!
//! Access/refresh tokens and the last placed order id must survive a restart
//! of the embedding shell, so they live behind an explicit [`SessionStore`]
//! rather than being read ad hoc. The store is injected into the HTTP client
//! and the checkout flow.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use kirana_core::OrderId;
use serde::{Deserialize, Serialize};

/// Typed accessors over the persisted session.
///
/// Setters are infallible by contract: persistence failures degrade to a log
/// line, never to a failed cart or checkout operation.
pub trait SessionStore: Send + Sync {
    /// The current access token, if signed in.
    fn access_token(&self) -> Option<String>;

    /// The current refresh token, if signed in.
    fn refresh_token(&self) -> Option<String>;

    /// Store a fresh token pair (after login).
    fn set_tokens(&self, access: &str, refresh: &str);

    /// Replace only the access token (after a successful refresh).
    fn set_access_token(&self, access: &str);

    /// Purge both tokens (logout, or refresh failure).
    fn clear_tokens(&self);

    /// The id of the most recently placed order, for the confirmation view.
    fn last_order_id(&self) -> Option<OrderId>;

    /// Record the id of a just-placed order.
    fn set_last_order_id(&self, order_id: &OrderId);
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionData {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    last_order_id: Option<OrderId>,
    /// When the access token was last obtained or refreshed.
    #[serde(default)]
    refreshed_at: Option<DateTime<Utc>>,
}

// =============================================================================
// FileSession
// =============================================================================

/// JSON-file-backed session store.
///
/// Every mutation rewrites the file; reads are served from memory.
pub struct FileSession {
    path: PathBuf,
    data: Mutex<SessionData>,
}

impl FileSession {
    /// Open a session file, creating an empty session if the file is missing
    /// or unreadable. A corrupt file is logged and treated as empty rather
    /// than failing startup.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = load_session(&path);
        Self {
            path,
            data: Mutex::new(data),
        }
    }

    fn update(&self, apply: impl FnOnce(&mut SessionData)) {
        let Ok(mut data) = self.data.lock() else {
            return;
        };
        apply(&mut data);
        persist_session(&self.path, &data);
    }

    fn read<T>(&self, get: impl FnOnce(&SessionData) -> T) -> Option<T> {
        self.data.lock().ok().map(|data| get(&data))
    }
}

fn load_session(path: &Path) -> SessionData {
    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Corrupt session file, starting empty");
                SessionData::default()
            }
        },
        Err(_) => SessionData::default(),
    }
}

fn persist_session(path: &Path, data: &SessionData) {
    let serialized = match serde_json::to_string_pretty(data) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to serialize session");
            return;
        }
    };
    if let Err(e) = fs::write(path, serialized) {
        tracing::warn!(path = %path.display(), error = %e, "Failed to persist session");
    }
}

impl SessionStore for FileSession {
    fn access_token(&self) -> Option<String> {
        self.read(|d| d.access_token.clone()).flatten()
    }

    fn refresh_token(&self) -> Option<String> {
        self.read(|d| d.refresh_token.clone()).flatten()
    }

    fn set_tokens(&self, access: &str, refresh: &str) {
        self.update(|d| {
            d.access_token = Some(access.to_string());
            d.refresh_token = Some(refresh.to_string());
            d.refreshed_at = Some(Utc::now());
        });
    }

    fn set_access_token(&self, access: &str) {
        self.update(|d| {
            d.access_token = Some(access.to_string());
            d.refreshed_at = Some(Utc::now());
        });
    }

    fn clear_tokens(&self) {
        self.update(|d| {
            d.access_token = None;
            d.refresh_token = None;
            d.refreshed_at = None;
        });
    }

    fn last_order_id(&self) -> Option<OrderId> {
        self.read(|d| d.last_order_id.clone()).flatten()
    }

    fn set_last_order_id(&self, order_id: &OrderId) {
        self.update(|d| d.last_order_id = Some(order_id.clone()));
    }
}

// =============================================================================
// MemorySession
// =============================================================================

/// In-memory session store for tests and throwaway shells.
#[derive(Default)]
pub struct MemorySession {
    data: Mutex<SessionData>,
}

impl SessionStore for MemorySession {
    fn access_token(&self) -> Option<String> {
        self.data.lock().ok().and_then(|d| d.access_token.clone())
    }

    fn refresh_token(&self) -> Option<String> {
        self.data.lock().ok().and_then(|d| d.refresh_token.clone())
    }

    fn set_tokens(&self, access: &str, refresh: &str) {
        if let Ok(mut d) = self.data.lock() {
            d.access_token = Some(access.to_string());
            d.refresh_token = Some(refresh.to_string());
            d.refreshed_at = Some(Utc::now());
        }
    }

    fn set_access_token(&self, access: &str) {
        if let Ok(mut d) = self.data.lock() {
            d.access_token = Some(access.to_string());
            d.refreshed_at = Some(Utc::now());
        }
    }

    fn clear_tokens(&self) {
        if let Ok(mut d) = self.data.lock() {
            d.access_token = None;
            d.refresh_token = None;
            d.refreshed_at = None;
        }
    }

    fn last_order_id(&self) -> Option<OrderId> {
        self.data.lock().ok().and_then(|d| d.last_order_id.clone())
    }

    fn set_last_order_id(&self, order_id: &OrderId) {
        if let Ok(mut d) = self.data.lock() {
            d.last_order_id = Some(order_id.clone());
        }
    }
}

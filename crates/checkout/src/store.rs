//! Durable persistence for session identifiers.
//!
//! Only `{order_id, guest_token}` survive a restart; the order itself is
//! always re-fetched from the server. The store is read once at startup
//! and written on order creation; it is wiped on explicit clear and on a
//! failed restore.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sugarloaf_core::OrderId;

/// Errors from the durable session store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The identifiers persisted across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub order_id: OrderId,
    pub guest_token: String,
}

/// Process-wide key-value persistence for the session identifiers.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the persisted identifiers, if any.
    async fn load(&self) -> Result<Option<PersistedSession>, StoreError>;

    /// Persist the identifiers, replacing any previous value.
    async fn save(&self, session: &PersistedSession) -> Result<(), StoreError>;

    /// Wipe the persisted identifiers. Clearing an empty store is a no-op.
    async fn clear(&self) -> Result<(), StoreError>;
}

// =============================================================================
// JsonFileStore
// =============================================================================

/// File-backed store writing the session as a small JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SessionStore for JsonFileStore {
    async fn load(&self) -> Result<Option<PersistedSession>, StoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&contents) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // A corrupt file is equivalent to no session; the caller
                // starts fresh and the next save overwrites it.
                tracing::warn!(path = %self.path.display(), error = %e, "Discarding unreadable session file");
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &PersistedSession) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(session)?;
        tokio::fs::write(&self.path, contents).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Option<PersistedSession>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self) -> Result<Option<PersistedSession>, StoreError> {
        Ok(self.inner.lock().map_or(None, |guard| guard.clone()))
    }

    async fn save(&self, session: &PersistedSession) -> Result<(), StoreError> {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = Some(session.clone());
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = None;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn session() -> PersistedSession {
        PersistedSession {
            order_id: OrderId::new(12),
            guest_token: "abc123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.load().await.unwrap(), None);

        store.save(&session()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(session()));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let path = std::env::temp_dir().join(format!("sugarloaf-session-{}.json", uuid::Uuid::new_v4()));
        let store = JsonFileStore::new(&path);

        assert_eq!(store.load().await.unwrap(), None);

        store.save(&session()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(session()));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
        // Clearing twice is a no-op
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_discards_corrupt_file() {
        let path = std::env::temp_dir().join(format!("sugarloaf-session-{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, "not json at all").await.unwrap();

        let store = JsonFileStore::new(&path);
        assert_eq!(store.load().await.unwrap(), None);

        store.clear().await.unwrap();
    }
}

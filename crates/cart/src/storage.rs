//! Durable local cart storage for anonymous sessions.
//!
//! The cart is one serialized JSON record in the profile directory. Loads
//! validate each entry individually and silently drop the bad ones; a
//! corrupt record degrades to an empty cart instead of an error. Saving an
//! empty cart deletes the record rather than storing an empty-array
//! sentinel. Records older than the retention window are discarded on load.
//!
//! Another process in the same profile (a second "tab") may rewrite the
//! record at any time; [`LocalCartStore::watch`] surfaces those external
//! writes as a passive change signal so the store can refresh without
//! polling.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use notify::{RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use fashionhub_core::CartLine;

/// Errors from the local persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File watcher could not be installed.
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),
}

const CART_FILE_NAME: &str = "cart.json";

#[derive(Serialize)]
struct StoredCartWrite<'a> {
    saved_at: DateTime<Utc>,
    items: &'a [CartLine],
}

#[derive(Deserialize)]
struct StoredCartRead {
    saved_at: DateTime<Utc>,
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

/// File-backed key-value record holding the anonymous cart.
#[derive(Debug, Clone)]
pub struct LocalCartStore {
    dir: PathBuf,
    retention: chrono::Duration,
}

impl LocalCartStore {
    /// Create a store rooted at the given profile directory.
    #[must_use]
    pub fn new(profile_dir: impl Into<PathBuf>, retention: chrono::Duration) -> Self {
        Self {
            dir: profile_dir.into(),
            retention,
        }
    }

    /// Path of the serialized record.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(CART_FILE_NAME)
    }

    /// Load the persisted cart.
    ///
    /// Entries missing a valid product, size, or positive quantity are
    /// dropped individually; a record that cannot be parsed at all, or that
    /// is older than the retention window, yields an empty cart.
    ///
    /// # Errors
    ///
    /// Returns error only for I/O failures other than a missing record.
    pub fn load(&self) -> Result<Vec<CartLine>, StorageError> {
        let raw = match std::fs::read_to_string(self.path()) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let record: StoredCartRead = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "corrupt local cart record, starting empty");
                return Ok(Vec::new());
            }
        };

        if Utc::now() - record.saved_at > self.retention {
            debug!("local cart record expired, discarding");
            self.clear()?;
            return Ok(Vec::new());
        }

        let mut lines = Vec::with_capacity(record.items.len());
        for item in record.items {
            match serde_json::from_value::<CartLine>(item) {
                Ok(line) if is_valid(&line) => lines.push(line),
                Ok(line) => debug!(key = %line.key(), "dropping invalid local cart entry"),
                Err(e) => debug!(error = %e, "dropping unparseable local cart entry"),
            }
        }
        Ok(lines)
    }

    /// Overwrite the record, or delete it entirely when `lines` is empty.
    ///
    /// # Errors
    ///
    /// Returns error on filesystem failure.
    pub fn save(&self, lines: &[CartLine]) -> Result<(), StorageError> {
        if lines.is_empty() {
            return self.clear();
        }

        std::fs::create_dir_all(&self.dir)?;
        let record = StoredCartWrite {
            saved_at: Utc::now(),
            items: lines,
        };
        let body = serde_json::to_vec_pretty(&record)
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))?;

        // Write-then-rename keeps concurrent readers from seeing a torn record.
        let tmp = self.dir.join(format!("{CART_FILE_NAME}.tmp"));
        std::fs::write(&tmp, body)?;
        std::fs::rename(&tmp, self.path())?;
        Ok(())
    }

    /// Delete the record.
    ///
    /// # Errors
    ///
    /// Returns error on filesystem failure other than the record already
    /// being absent.
    pub fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Install a watcher that signals whenever another process touches the
    /// record. Signals are coalesced; receiving one means "reload", not
    /// "one write happened".
    ///
    /// # Errors
    ///
    /// Returns error if the watcher cannot be installed.
    pub fn watch(&self) -> Result<CartWatcher, StorageError> {
        std::fs::create_dir_all(&self.dir)?;

        let (tx, rx) = mpsc::channel(1);
        let cart_path = self.path();
        let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
            let Ok(event) = event else { return };
            if event.paths.iter().any(|p| affects(p, &cart_path)) {
                // A full channel already carries a pending reload signal.
                let _ = tx.try_send(());
            }
        })?;

        // Watch the directory, not the file: saves replace the file by
        // rename, which would detach a file-level watch.
        watcher.watch(&self.dir, RecursiveMode::NonRecursive)?;

        Ok(CartWatcher {
            _watcher: watcher,
            rx,
        })
    }
}

fn affects(event_path: &Path, cart_path: &Path) -> bool {
    event_path == cart_path || event_path.file_name() == cart_path.file_name()
}

fn is_valid(line: &CartLine) -> bool {
    line.product_id.as_i64() > 0 && !line.size.is_empty() && line.quantity > 0
}

/// Live change subscription for the local cart record.
///
/// Dropping the watcher stops the subscription.
pub struct CartWatcher {
    _watcher: notify::RecommendedWatcher,
    rx: mpsc::Receiver<()>,
}

impl CartWatcher {
    /// Wait for the next external change. Returns `None` when the watcher
    /// has shut down.
    pub async fn changed(&mut self) -> Option<()> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use fashionhub_core::{Product, ProductId};

    use super::*;

    fn retention() -> chrono::Duration {
        chrono::Duration::days(30)
    }

    fn line(id: i64, size: &str, quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            product: Product {
                id: ProductId::new(id),
                name: format!("Product {id}"),
                price: "10.00".parse().expect("decimal"),
                sizes: vec![size.to_string()],
                stock: HashMap::from([(size.to_string(), 10)]),
            },
            size: size.to_string(),
            quantity,
            accessories: Vec::new(),
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalCartStore::new(dir.path(), retention());

        store
            .save(&[line(1, "M", 2), line(2, "S", 1)])
            .expect("save");
        let loaded = store.load().expect("load");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.first().map(|l| l.quantity), Some(2));
    }

    #[test]
    fn test_missing_record_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalCartStore::new(dir.path(), retention());
        assert!(store.load().expect("load").is_empty());
    }

    #[test]
    fn test_empty_save_deletes_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalCartStore::new(dir.path(), retention());

        store.save(&[line(1, "M", 1)]).expect("save");
        assert!(store.path().exists());
        store.save(&[]).expect("save empty");
        assert!(!store.path().exists());
    }

    #[test]
    fn test_corrupt_record_degrades_to_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalCartStore::new(dir.path(), retention());

        std::fs::create_dir_all(dir.path()).expect("mkdir");
        std::fs::write(store.path(), b"{ not json").expect("write");
        assert!(store.load().expect("load").is_empty());
    }

    #[test]
    fn test_invalid_entries_are_dropped_individually() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalCartStore::new(dir.path(), retention());

        let good = serde_json::to_value(line(1, "M", 2)).expect("serialize");
        let zero_quantity = serde_json::to_value(line(2, "M", 0)).expect("serialize");
        let record = serde_json::json!({
            "saved_at": Utc::now(),
            "items": [good, zero_quantity, { "garbage": true }],
        });
        std::fs::create_dir_all(dir.path()).expect("mkdir");
        std::fs::write(store.path(), record.to_string()).expect("write");

        let loaded = store.load().expect("load");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.first().map(|l| l.product_id), Some(ProductId::new(1)));
    }

    #[test]
    fn test_expired_record_is_discarded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalCartStore::new(dir.path(), retention());

        let stale = serde_json::json!({
            "saved_at": Utc::now() - chrono::Duration::days(31),
            "items": [serde_json::to_value(line(1, "M", 2)).expect("serialize")],
        });
        std::fs::create_dir_all(dir.path()).expect("mkdir");
        std::fs::write(store.path(), stale.to_string()).expect("write");

        assert!(store.load().expect("load").is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_watch_signals_external_write() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalCartStore::new(dir.path(), retention());
        let mut watcher = store.watch().expect("watch");

        // Simulate another tab in the same profile.
        let other_tab = LocalCartStore::new(dir.path(), retention());
        other_tab.save(&[line(1, "M", 1)]).expect("save");

        let signal = tokio::time::timeout(std::time::Duration::from_secs(5), watcher.changed())
            .await
            .expect("change signal within timeout");
        assert_eq!(signal, Some(()));
    }
}

//! Resolved-version cache with per-entry expiry.
//!
//! Remembers `(driver -> version, url)` pairs between runs so a fresh
//! `setup()` can skip remote version resolution entirely. Entries are
//! persisted as a small JSON file under the cache root and carry an
//! absolute expiry timestamp; expired entries are evicted lazily when
//! checked, never swept proactively.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    value: String,
    /// Unix timestamp (seconds) after which the entry is stale.
    expiry: u64,
}

/// File-backed preference store. Single-threaded usage model: no file
/// locking, callers serialize concurrent access themselves.
#[derive(Debug, Clone)]
pub struct Preferences {
    path: PathBuf,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl Preferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Preferences { path: path.into() }
    }

    /// Store location under a cache root directory.
    pub fn in_dir(dir: &Path) -> Self {
        Preferences::new(dir.join(".preferences.json"))
    }

    fn load(&self) -> HashMap<String, Entry> {
        let Ok(text) = std::fs::read_to_string(&self.path) else {
            return HashMap::new();
        };
        serde_json::from_str(&text).unwrap_or_default()
    }

    fn save(&self, entries: &HashMap<String, Entry>) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let text = serde_json::to_string_pretty(entries).map_err(|e| Error::JsonParse {
            url: self.path.display().to_string(),
            source: e,
        })?;
        std::fs::write(&self.path, text).map_err(|e| Error::io(&self.path, e))
    }

    /// Writes `value` with expiry `now + ttl_secs`, only if the key is
    /// absent: the first write wins for the lifetime of the entry.
    pub fn put_if_empty(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), Error> {
        let mut entries = self.load();
        if entries.contains_key(key) {
            return Ok(());
        }
        debug!(key, value, ttl_secs, "caching resolved preference");
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expiry: now_secs() + ttl_secs,
            },
        );
        self.save(&entries)
    }

    /// The stored value, or `None` when absent or stale.
    pub fn get(&self, key: &str) -> Option<String> {
        let entries = self.load();
        let entry = entries.get(key)?;
        if now_secs() >= entry.expiry {
            return None;
        }
        Some(entry.value.clone())
    }

    /// True only when the key is present and fresh. An expired entry is
    /// removed here (lazy eviction).
    pub fn check(&self, key: &str) -> bool {
        let mut entries = self.load();
        let Some(entry) = entries.get(key) else {
            return false;
        };
        if now_secs() >= entry.expiry {
            debug!(key, "evicting expired preference");
            entries.remove(key);
            if let Err(e) = self.save(&entries) {
                warn!(key, error = %e, "failed to evict expired preference");
            }
            return false;
        }
        true
    }

    /// Removes all entries. Best effort: failures are reported as
    /// warnings and never abort the caller's setup flow.
    pub fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "cleared preferences"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to clear preferences"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, Preferences) {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::in_dir(dir.path());
        (dir, prefs)
    }

    #[test]
    fn round_trip_within_ttl() {
        let (_dir, prefs) = store();
        prefs.put_if_empty("chromedriver", "2.46", 300).unwrap();
        assert!(prefs.check("chromedriver"));
        assert_eq!(prefs.get("chromedriver").as_deref(), Some("2.46"));
    }

    #[test]
    fn first_write_wins() {
        let (_dir, prefs) = store();
        prefs.put_if_empty("k", "first", 300).unwrap();
        prefs.put_if_empty("k", "second", 300).unwrap();
        assert_eq!(prefs.get("k").as_deref(), Some("first"));
    }

    #[test]
    fn expired_entry_is_unavailable_and_evicted_on_check() {
        let (_dir, prefs) = store();
        // Zero TTL: expired the moment it is written.
        prefs.put_if_empty("k", "v", 0).unwrap();
        assert_eq!(prefs.get("k"), None);
        assert!(!prefs.check("k"));
        // The lazy eviction removed it from the backing file.
        assert!(!prefs.load().contains_key("k"));
        // A later write may now succeed with a fresh TTL.
        prefs.put_if_empty("k", "v2", 300).unwrap();
        assert_eq!(prefs.get("k").as_deref(), Some("v2"));
    }

    #[test]
    fn missing_key_checks_false() {
        let (_dir, prefs) = store();
        assert!(!prefs.check("absent"));
        assert_eq!(prefs.get("absent"), None);
    }

    #[test]
    fn clear_is_best_effort_and_idempotent() {
        let (_dir, prefs) = store();
        prefs.put_if_empty("k", "v", 300).unwrap();
        prefs.clear();
        assert!(!prefs.check("k"));
        // Clearing an already-empty store must not fail.
        prefs.clear();
    }

    #[test]
    fn store_survives_reopening() {
        let (_dir, prefs) = store();
        prefs.put_if_empty("k", "v", 300).unwrap();
        let reopened = Preferences::new(prefs.path.clone());
        assert_eq!(reopened.get("k").as_deref(), Some("v"));
    }
}

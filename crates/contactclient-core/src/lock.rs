//! Cross-process run locks.
//!
//! A run holds its [`RunKey`] for the whole dispatch. The file-backed lock
//! relies on exclusive create (`O_CREAT | O_EXCL`) of one marker per key, so
//! "check held" and "mark held" are a single filesystem operation shared by
//! every process pointed at the same root.

use crate::error::Result;
use crate::io;
use crate::paths;
use crate::types::RunKey;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// RunLock
// ---------------------------------------------------------------------------

pub trait RunLock {
    /// Atomically mark `key` held. `Ok(false)` when another run holds it.
    fn acquire(&self, key: &RunKey) -> Result<bool>;

    /// Clear the mark for `key`. Clearing an absent mark succeeds.
    fn release(&self, key: &RunKey) -> Result<()>;
}

// ---------------------------------------------------------------------------
// RunGuard
// ---------------------------------------------------------------------------

/// A held run lock. Released exactly once: by [`RunGuard::release`], or on
/// drop for every other exit path.
pub struct RunGuard<'a> {
    lock: &'a dyn RunLock,
    key: RunKey,
    released: bool,
}

impl<'a> RunGuard<'a> {
    /// `Ok(None)` when the key is already held; nothing is released then.
    pub fn acquire(lock: &'a dyn RunLock, key: RunKey) -> Result<Option<Self>> {
        if !lock.acquire(&key)? {
            return Ok(None);
        }
        tracing::debug!(key = %key, "run lock acquired");
        Ok(Some(Self {
            lock,
            key,
            released: false,
        }))
    }

    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.lock.release(&self.key)?;
        tracing::debug!(key = %self.key, "run lock released");
        Ok(())
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.lock.release(&self.key) {
            tracing::warn!(key = %self.key, error = %e, "failed to release run lock");
        }
    }
}

// ---------------------------------------------------------------------------
// FileRunLock
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct LockMarker {
    pid: u32,
    acquired_at: DateTime<Utc>,
    /// Unique per acquisition; two markers written in the same instant by
    /// one process still compare unequal.
    #[serde(default)]
    token: String,
}

impl LockMarker {
    fn fresh() -> Self {
        Self {
            pid: std::process::id(),
            acquired_at: Utc::now(),
            token: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Held while one run inspects and removes an expired marker.
struct ReclaimGuard {
    path: PathBuf,
}

impl Drop for ReclaimGuard {
    fn drop(&mut self) {
        if let Err(e) = io::remove_if_exists(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove reclaim guard");
        }
    }
}

/// Marker-file run lock under `.contactclient/locks/`.
#[derive(Debug, Clone)]
pub struct FileRunLock {
    root: PathBuf,
    /// `None` means markers never expire.
    timeout: Option<Duration>,
}

impl FileRunLock {
    pub fn new(root: &Path, timeout_seconds: u64) -> Self {
        let timeout = match timeout_seconds {
            0 => None,
            secs => Duration::from_std(std::time::Duration::from_secs(secs)).ok(),
        };
        Self {
            root: root.to_path_buf(),
            timeout,
        }
    }

    fn marker_path(&self, key: &RunKey) -> PathBuf {
        paths::lock_marker(&self.root, key.as_str())
    }

    fn try_create(path: &Path) -> Result<bool> {
        let data = serde_yaml::to_string(&LockMarker::fresh())?;
        io::create_exclusive(path, data.as_bytes())
    }

    /// A marker that cannot be parsed has no trustworthy age; treat it as
    /// fresh so a half-written marker from a live run is never stolen.
    fn read_marker(path: &Path) -> Option<LockMarker> {
        let data = std::fs::read_to_string(path).ok()?;
        serde_yaml::from_str(&data).ok()
    }

    fn is_stale(&self, marker: &LockMarker) -> bool {
        match self.timeout {
            Some(timeout) => Utc::now() - marker.acquired_at > timeout,
            None => false,
        }
    }

    /// `Ok(None)` while another run is reclaiming this key. A guard left by a
    /// run that died mid-reclaim is cleared once it has expired itself; the
    /// caller still reports the key held and the next run proceeds.
    fn enter_reclaim(&self, key: &RunKey) -> Result<Option<ReclaimGuard>> {
        let path = paths::reclaim_guard(&self.root, key.as_str());
        if Self::try_create(&path)? {
            return Ok(Some(ReclaimGuard { path }));
        }
        if let Some(abandoned) = Self::read_marker(&path).filter(|m| self.is_stale(m)) {
            tracing::warn!(key = %key, pid = abandoned.pid, "clearing abandoned reclaim guard");
            io::remove_if_exists(&path)?;
        }
        Ok(None)
    }

    /// Remove an expired marker. Returns true when the key may be retried.
    ///
    /// The marker is only removed under the reclaim guard, after re-reading
    /// it and finding the same expired marker that was inspected. A marker
    /// written by a live run is never moved or removed.
    fn reclaim(&self, path: &Path, key: &RunKey) -> Result<bool> {
        let Some(marker) = Self::read_marker(path) else {
            return Ok(false);
        };
        if !self.is_stale(&marker) {
            return Ok(false);
        }
        let Some(_guard) = self.enter_reclaim(key)? else {
            return Ok(false);
        };

        match Self::read_marker(path) {
            Some(current) if current == marker => {}
            // Another run reclaimed and released it in the meantime.
            None if !path.exists() => return Ok(true),
            _ => return Ok(false),
        }

        io::remove_if_exists(path)?;
        tracing::warn!(
            key = %key,
            pid = marker.pid,
            acquired_at = %marker.acquired_at,
            "reclaimed expired run lock"
        );
        Ok(true)
    }
}

impl RunLock for FileRunLock {
    fn acquire(&self, key: &RunKey) -> Result<bool> {
        let path = self.marker_path(key);
        if Self::try_create(&path)? {
            return Ok(true);
        }
        if self.reclaim(&path, key)? {
            return Self::try_create(&path);
        }
        Ok(false)
    }

    fn release(&self, key: &RunKey) -> Result<()> {
        io::remove_if_exists(&self.marker_path(key))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

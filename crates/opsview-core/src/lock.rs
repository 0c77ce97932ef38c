//! Single-flight reload lock backed by a marker file.
//!
//! The marker's existence means a reload is in progress. It is created with
//! `create_new`, so two processes on the same host cannot both acquire it,
//! and removed when the returned guard is dropped.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::{OpsviewError, Result};

/// Marker file name in the system temp directory
pub const LOCK_FILE_NAME: &str = "opsview-reload.lock";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadLock {
    path: PathBuf,
}

impl ReloadLock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Lock marker in the system temp directory.
    pub fn default_location() -> Self {
        Self::new(std::env::temp_dir().join(LOCK_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a reload currently holds the lock.
    pub fn is_held(&self) -> bool {
        self.path.exists()
    }

    /// Create the marker, failing with `ReloadInProgress` if it already exists.
    pub fn try_acquire(&self) -> Result<ReloadLockGuard> {
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                warn!(path = %self.path.display(), "Reload lock already held");
                return Err(OpsviewError::ReloadInProgress {
                    lock_path: Some(self.path.clone()),
                });
            }
            Err(e) => return Err(e.into()),
        };

        // Guard first: a failed write still removes the marker.
        let guard = ReloadLockGuard {
            path: self.path.clone(),
        };
        writeln!(file, "pid={}", std::process::id())?;
        writeln!(file, "acquired_at={}", Utc::now().to_rfc3339())?;

        debug!(path = %self.path.display(), "Reload lock acquired");
        Ok(guard)
    }
}

impl Default for ReloadLock {
    fn default() -> Self {
        Self::default_location()
    }
}

/// Holds the reload lock until dropped.
#[derive(Debug)]
pub struct ReloadLockGuard {
    path: PathBuf,
}

impl ReloadLockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ReloadLockGuard {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Reload lock released"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to remove reload lock")
            }
        }
    }
}

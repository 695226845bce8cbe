//! Single-session guard for a data directory.
//!
//! Stores are rewritten whole on every change, so two sessions sharing a
//! data directory would silently drop each other's updates. A session holds
//! an exclusively created lock file for its whole lifetime.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(
        "another session holds {path} (owner: {owner}); remove the file or pass --force if it is stale"
    )]
    Locked { path: PathBuf, owner: String },

    #[error("cannot manage session lock {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Lock file removed when dropped.
#[derive(Debug)]
pub struct SessionLock {
    path: PathBuf,
}

impl SessionLock {
    /// Creates the lock file at `path`, recording the current process id.
    ///
    /// With `force`, an existing lock is treated as stale and replaced.
    ///
    /// # Errors
    ///
    /// [`SessionError::Locked`] if the lock exists and `force` is false,
    /// [`SessionError::Io`] if the file cannot be created.
    pub fn acquire(path: &Path, force: bool) -> Result<Self, SessionError> {
        let io_err = |source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        match Self::create(path) {
            Ok(lock) => Ok(lock),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let owner = fs::read_to_string(path)
                    .map(|s| s.trim().to_owned())
                    .unwrap_or_else(|_| "unknown".to_owned());
                if !force {
                    return Err(SessionError::Locked {
                        path: path.to_path_buf(),
                        owner,
                    });
                }
                tracing::warn!(path = %path.display(), owner, "taking over stale session lock");
                fs::remove_file(path).map_err(io_err)?;
                Self::create(path).map_err(io_err)
            }
            Err(e) => Err(io_err(e)),
        }
    }

    fn create(path: &Path) -> std::io::Result<Self> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        writeln!(file, "pid {}", std::process::id())?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "could not remove session lock"
            );
        }
    }
}

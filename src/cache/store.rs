//! Cache Store Module
//!
//! Filesystem-backed cache engine. Each key lives in its own file under a
//! three-level digest fan-out; expiry is enforced lazily on read.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Duration;
use tracing::{debug, info, warn};

use crate::cache::{path_for, CacheItem, Value};
use crate::error::{CacheError, Result};

// == Permissions ==
#[cfg(unix)]
const DIR_MODE: u32 = 0o755;
#[cfg(unix)]
const FILE_MODE: u32 = 0o666;

// == Fs Store ==
/// Cache store rooted at a single directory.
///
/// The root path is the only in-process state; everything else lives on
/// disk, so the store is `Send + Sync` without any locking. Concurrent
/// read-modify-write of one key (increment/decrement) is not atomic and
/// must be serialized by the caller if that matters.
#[derive(Debug, Clone)]
pub struct FsStore {
    /// Base directory of the cache tree
    root: PathBuf,
}

impl FsStore {
    // == Constructor ==
    /// Opens a store at `root`, creating it and any missing parents.
    ///
    /// Failure here means the store cannot function; callers normally
    /// treat it as fatal at startup.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.is_dir() {
            create_dir_all(&root)?;
            info!("Created cache root at {}", root.display());
        }

        Ok(Self { root })
    }

    // == Accessors ==
    /// Returns the cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the file path backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        path_for(&self.root, key)
    }

    // == Set ==
    /// Stores `value` under `key`, expiring `ttl` from now.
    ///
    /// Replaces any existing item. A zero or negative `ttl` stores an item
    /// that the next read will treat as expired.
    pub fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<()> {
        let path = self.path_for(key);

        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }

        let item = CacheItem::new(value, ttl)?;
        write_atomic(&path, &item.to_bytes()?)?;

        debug!(key, path = %path.display(), expires_at = %item.expires_at, "Stored item");
        Ok(())
    }

    // == Get ==
    /// Retrieves the value for `key`.
    ///
    /// Expired items are deleted and reported as [`CacheError::Expired`]; a
    /// failed removal is logged and still reported as a miss.
    /// Corrupt files are reported as [`CacheError::Serialization`] and left
    /// in place.
    pub fn get(&self, key: &str) -> Result<Value> {
        let path = self.path_for(key);
        let item = read_item(&path, key)?;

        if item.is_expired() {
            debug!(key, path = %path.display(), "Collecting expired item");
            if let Err(e) = remove_all(&path) {
                warn!(key, path = %path.display(), error = %e, "Failed to remove expired item");
            }
            return Err(CacheError::Expired(key.to_string()));
        }

        debug!(key, "Cache hit");
        Ok(item.data)
    }

    // == Delete ==
    /// Removes the item for `key`. Succeeds if it was already absent.
    ///
    /// Intermediate fan-out directories are left in place.
    pub fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        remove_all(&path)?;

        debug!(key, path = %path.display(), "Deleted item");
        Ok(())
    }

    // == Flush ==
    /// Removes the whole cache tree, root included.
    ///
    /// `set` recreates directories on demand; `get` and `delete` simply miss
    /// until then.
    pub fn flush(&self) -> Result<()> {
        remove_all(&self.root)?;

        info!("Flushed cache root {}", self.root.display());
        Ok(())
    }

    // == Increment ==
    /// Adds `steps` to the numeric value at `key`, returning the new value.
    ///
    /// The key must already exist; the original expiry is kept.
    pub fn increment(&self, key: &str, steps: u64) -> Result<Value> {
        self.update_counter(key, |value| value.increment(steps))
    }

    // == Decrement ==
    /// Subtracts `steps` from the numeric value at `key`, returning the new
    /// value.
    ///
    /// The key must already exist; the original expiry is kept.
    pub fn decrement(&self, key: &str, steps: u64) -> Result<Value> {
        self.update_counter(key, |value| value.decrement(steps))
    }

    /// Read-modify-write shared by increment and decrement.
    ///
    /// Nothing is written unless `apply` produced a new value.
    fn update_counter<F>(&self, key: &str, apply: F) -> Result<Value>
    where
        F: FnOnce(&Value) -> Option<Value>,
    {
        let path = self.path_for(key);
        let mut item = read_item(&path, key)?;

        let kind = item.data.kind();
        let updated = apply(&item.data).ok_or_else(|| CacheError::TypeMismatch {
            key: key.to_string(),
            kind,
        })?;
        item.data = updated;

        write_atomic(&path, &item.to_bytes()?)?;

        debug!(key, value = ?item.data, "Updated counter");
        Ok(item.data)
    }
}

// == Filesystem Helpers ==

/// Reads and decodes the item at `path`, mapping a missing file to a miss.
fn read_item(path: &Path, key: &str) -> Result<CacheItem> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(key, "Cache miss");
            return Err(CacheError::NotFound(key.to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    CacheItem::from_bytes(&bytes)
}

fn create_dir_all(dir: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }

    builder.create(dir).map_err(|source| CacheError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Writes `bytes` to a uniquely named temp file in the target directory,
/// then renames it over `path`. Concurrent writers never share a temp file,
/// so the last rename wins and readers only see whole items.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut builder = tempfile::Builder::new();
    builder.prefix(".tmp-");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(FILE_MODE));
    }

    let mut tmp = builder.tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    // dropping the temp file on any error above removes it
    tmp.persist(path).map_err(|e| CacheError::Io(e.error))?;

    Ok(())
}

/// Removes a file or directory tree; absence is not an error.
fn remove_all(path: &Path) -> Result<()> {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

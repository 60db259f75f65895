use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use teloxide::types::ChatId;
use thiserror::Error;
use tracing::info;

/// Errors surfaced by the group store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The groups file could not be read or written.
    #[error("failed to access groups file {path}: {source}")]
    Io {
        /// Path of the groups file involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The groups file exists but does not contain a valid JSON id list.
    ///
    /// A corrupt file is never treated as an empty store; losing the whole
    /// group list silently would be worse than failing loudly.
    #[error("groups file {path} is corrupt: {source}")]
    Corrupt {
        /// Path of the groups file involved.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// Durable, file-backed list of the group chats the bot belongs to.
///
/// The store is a plain JSON array of chat ids, ordered and duplicate-free.
/// Every operation round-trips through the file (load full, mutate, save
/// full), so a process restart never leaves stale in-memory state behind.
/// Mutations happen a handful of times per day, which makes the re-read cost
/// irrelevant.
///
/// Clones share one lock, held for the whole load-mutate-save cycle of a
/// mutation. The broadcast job and membership handlers run on a
/// multi-threaded runtime and would otherwise interleave their cycles,
/// losing updates or racing on the temp file used for atomic replacement.
#[derive(Debug, Clone)]
pub struct GroupStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl GroupStore {
    /// Creates a store persisting to `path`. The file is created lazily on
    /// the first mutation.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    // Poison recovery: the file can't be torn mid-write, so the guard stays
    // usable after a panic elsewhere.
    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the current group list. A missing file is an empty store.
    pub fn load(&self) -> Result<Vec<ChatId>, StoreError> {
        let _guard = self.guard();
        self.read()
    }

    fn read(&self) -> Result<Vec<ChatId>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Overwrites the group list on disk.
    ///
    /// Writes to a sibling temp file and renames it into place, so a crash
    /// mid-write cannot leave a torn groups file.
    pub fn save(&self, groups: &[ChatId]) -> Result<(), StoreError> {
        let _guard = self.guard();
        self.write(groups)
    }

    fn write(&self, groups: &[ChatId]) -> Result<(), StoreError> {
        let io_err = |e: io::Error| StoreError::Io {
            path: self.path.clone(),
            source: e,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        // Serializing a slice of ids cannot fail, but route the error through
        // StoreError::Corrupt rather than panicking.
        let json = serde_json::to_string_pretty(groups).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            source: e,
        })?;

        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }

    /// Adds a chat id if absent. Returns whether the store changed; adding a
    /// present id is a no-op and performs no write.
    pub fn add(&self, chat_id: ChatId) -> Result<bool, StoreError> {
        let _guard = self.guard();
        let mut groups = self.read()?;
        if groups.contains(&chat_id) {
            return Ok(false);
        }
        groups.push(chat_id);
        self.write(&groups)?;
        info!("Added group {}", chat_id);
        Ok(true)
    }

    /// Removes a chat id if present. Returns whether the store changed;
    /// removing an absent id is a no-op and performs no write.
    pub fn remove(&self, chat_id: ChatId) -> Result<bool, StoreError> {
        let _guard = self.guard();
        let mut groups = self.read()?;
        let before = groups.len();
        groups.retain(|g| *g != chat_id);
        if groups.len() == before {
            return Ok(false);
        }
        self.write(&groups)?;
        info!("Removed group {}", chat_id);
        Ok(true)
    }
}

//! Session store backed by a JSON file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use bazaar_core::{SessionKey, SessionStore};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// On-disk layout: the three session entries as flat strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<String>,
}

impl StoredSession {
    fn slot(&mut self, key: SessionKey) -> &mut Option<String> {
        match key {
            SessionKey::AccessToken => &mut self.access_token,
            SessionKey::RefreshToken => &mut self.refresh_token,
            SessionKey::User => &mut self.user,
        }
    }

    fn get(&self, key: SessionKey) -> Option<&String> {
        match key {
            SessionKey::AccessToken => self.access_token.as_ref(),
            SessionKey::RefreshToken => self.refresh_token.as_ref(),
            SessionKey::User => self.user.as_ref(),
        }
    }
}

/// A [`SessionStore`] persisted to a single JSON file.
///
/// Reads are served from memory. Every write updates memory first and is then
/// flushed to disk under an exclusive lock; a failed flush is logged and the
/// in-memory view stays authoritative for this process.
///
/// # Blocking
///
/// Writes hold the cache's write guard across the file lock and the flush,
/// so concurrent writers are serialized and the file always matches the
/// cache. That I/O is synchronous and runs on the caller's thread, including
/// a tokio worker when the refresh coordinator stores renewed tokens.
/// Services that cannot block a worker should wrap the store and flush from
/// `spawn_blocking`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<StoredSession>,
}

impl FileStore {
    /// Open the store at `path`, loading any session already saved there.
    ///
    /// A missing file is an empty session. A file that cannot be parsed is
    /// treated the same way and will be overwritten by the next write.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let entries = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring unreadable session file");
                StoredSession::default()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => StoredSession::default(),
            Err(e) => return Err(e),
        };

        debug!("Opened session store");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Location of the session file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn update(&self, apply: impl FnOnce(&mut StoredSession)) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.clone();
        apply(&mut entries);
        if *entries == before {
            return;
        }

        if let Err(e) = self.persist(&entries) {
            warn!(path = %self.path.display(), error = %e, "Failed to write session file");
        }
    }

    fn persist(&self, entries: &StoredSession) -> io::Result<()> {
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?;
        lock_file.lock_exclusive()?;

        let json = serde_json::to_string_pretty(entries).map_err(io::Error::other)?;
        let mut file = File::create(&self.path)?;

        #[cfg(unix)]
        file.set_permissions(fs::Permissions::from_mode(0o600))?;

        file.write_all(json.as_bytes())?;
        file.sync_data()?;

        lock_file.unlock()
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: SessionKey) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set(&self, key: SessionKey, value: &str) {
        self.update(|entries| *entries.slot(key) = Some(value.to_string()));
    }

    fn remove(&self, key: SessionKey) {
        self.update(|entries| *entries.slot(key) = None);
    }

    fn set_many(&self, pairs: &[(SessionKey, &str)]) {
        self.update(|entries| {
            for (key, value) in pairs {
                *entries.slot(*key) = Some(value.to_string());
            }
        });
    }

    fn clear(&self) {
        self.update(|entries| *entries = StoredSession::default());
    }
}

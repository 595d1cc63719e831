//! Location of the persisted session.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use bazaar_file::FileStore;

/// Get the session file path.
fn session_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "bazaar").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("session.json"))
}

/// Open the session store in the platform data directory.
pub fn open_store() -> Result<FileStore> {
    let path = session_path()?;
    FileStore::open(&path).with_context(|| format!("Failed to open {}", path.display()))
}

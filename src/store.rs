use serde_json::Value;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::PathBuf;
use thiserror::Error;

use crate::codec::{self, StoredTimer};
use crate::TimerSnapshot;

// file-backed store for the CLI host //
// The engine treats storage as an opaque key-value concern; this module is
// the host-side implementation backed by data/timer.json under the current
// working directory.

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

fn data_dir() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("data")
}

fn timer_path() -> Result<PathBuf, StoreError> {
    let dir = data_dir();
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }
    Ok(dir.join("timer.json"))
}

/// Read the raw stored value, if any. A file that does not parse as JSON is
/// treated as absent; rehydration handles every other kind of damage.
pub fn load_raw() -> Result<Option<Value>, StoreError> {
    let path = timer_path()?;
    if !path.exists() {
        return Ok(None);
    }
    let mut contents = String::new();
    File::open(&path)?.read_to_string(&mut contents)?;
    Ok(serde_json::from_str(&contents).ok())
}

/// Persist the storage projection of a snapshot.
pub fn save(snapshot: &TimerSnapshot) -> Result<(), StoreError> {
    let stored: StoredTimer = codec::serialize(snapshot);
    let json = serde_json::to_string_pretty(&stored)?;
    let mut file = File::create(timer_path()?)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Drop the stored state entirely.
pub fn remove() -> Result<(), StoreError> {
    let path = timer_path()?;
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

//! Save-file format for the periodic debounced persistence task (spec
//! §4.6a). Grounded in the teacher's `replay::file_io` module: a hand-rolled
//! error enum with manual `Display`/`Error`/`From` impls, and an atomic
//! write-then-rename so a crash mid-save never corrupts the previous save.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::world::{Food, GameStatus, Snake};

const SAVE_FORMAT_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SaveBlob {
    pub format_version: u32,
    pub tick: u64,
    /// Persisted for forensic value; restored sessions always come back
    /// as `waiting` (spec §4.6a) regardless of what's stored here.
    pub status: GameStatus,
    pub snakes: Vec<Snake>,
    pub food: Vec<Food>,
}

impl SaveBlob {
    pub fn new(tick: u64, status: GameStatus, snakes: Vec<Snake>, food: Vec<Food>) -> Self {
        Self { format_version: SAVE_FORMAT_VERSION, tick, status, snakes, food }
    }
}

#[derive(Debug)]
pub enum PersistenceError {
    Io(io::Error),
    Decode(serde_json::Error),
    UnsupportedVersion { found: u32, expected: u32 },
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::Io(e) => write!(f, "IO error: {}", e),
            PersistenceError::Decode(e) => write!(f, "decode error: {}", e),
            PersistenceError::UnsupportedVersion { found, expected } => {
                write!(f, "unsupported save format version: found {}, expected {}", found, expected)
            }
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<io::Error> for PersistenceError {
    fn from(e: io::Error) -> Self {
        PersistenceError::Io(e)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(e: serde_json::Error) -> Self {
        PersistenceError::Decode(e)
    }
}

pub fn blob_to_json(blob: &SaveBlob) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string_pretty(blob)?)
}

pub fn blob_from_json(content: &str) -> Result<SaveBlob, PersistenceError> {
    let blob: SaveBlob = serde_json::from_str(content)?;
    if blob.format_version != SAVE_FORMAT_VERSION {
        return Err(PersistenceError::UnsupportedVersion { found: blob.format_version, expected: SAVE_FORMAT_VERSION });
    }
    Ok(blob)
}

/// Writes to a sibling temp file and renames over the target, so readers
/// never observe a half-written save.
pub fn save_atomically(path: &Path, blob: &SaveBlob) -> Result<(), PersistenceError> {
    let json = blob_to_json(blob)?;
    let tmp_path = path.with_extension("tmp");
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&tmp_path, json)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<Option<SaveBlob>, PersistenceError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(blob_from_json(&content)?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let blob = SaveBlob::new(42, GameStatus::Running, Vec::new(), Vec::new());
        let json = blob_to_json(&blob).unwrap();
        let restored = blob_from_json(&json).unwrap();
        assert_eq!(restored.tick, 42);
    }

    #[test]
    fn rejects_unknown_format_version() {
        let json = r#"{"formatVersion":99,"tick":0,"status":"running","snakes":[],"food":[]}"#;
        // the real field names are snake_case on the wire since SaveBlob has no rename attribute
        let json = json.replace("formatVersion", "format_version");
        let err = blob_from_json(&json).unwrap_err();
        assert!(matches!(err, PersistenceError::UnsupportedVersion { found: 99, expected: 1 }));
    }
}

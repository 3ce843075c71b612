#![deny(warnings)]

//! Persistence layer: JSON save files and binary checkpoints.
//!
//! Saves carry every field of the corporation, including the share-price
//! RNG, so a restored game continues the same random stream. Corrupted
//! funds are written as `null` and reset by the next settlement.

use corp_core::ConfigError;
use corp_runtime::Corporation;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Save format version written into every JSON save.
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] bincode::Error),
    #[error("unsupported save version {found} (expected {SAVE_VERSION})")]
    Version { found: u32 },
    #[error("invalid config in save: {0}")]
    Config(#[from] ConfigError),
    #[error("share counts do not add up to total shares")]
    Unbalanced,
}

#[derive(Serialize)]
struct SaveRef<'a, D> {
    version: u32,
    corporation: &'a Corporation<D>,
}

#[derive(Deserialize)]
struct SaveFile<D> {
    version: u32,
    corporation: Corporation<D>,
}

/// Default location for local saves.
pub fn default_save_path() -> PathBuf {
    PathBuf::from("./saves/corporation.json")
}

pub fn save_json<D: Serialize>(corp: &Corporation<D>) -> Result<String, PersistenceError> {
    let text = serde_json::to_string_pretty(&SaveRef {
        version: SAVE_VERSION,
        corporation: corp,
    })?;
    Ok(text)
}

pub fn load_json<D: DeserializeOwned>(text: &str) -> Result<Corporation<D>, PersistenceError> {
    let save: SaveFile<D> = serde_json::from_str(text)?;
    if save.version != SAVE_VERSION {
        return Err(PersistenceError::Version {
            found: save.version,
        });
    }
    check(&save.corporation)?;
    if !save.corporation.funds().is_finite() {
        warn!(corp = save.corporation.name(), "loaded save with corrupted funds");
    }
    Ok(save.corporation)
}

/// Write a JSON save, creating parent directories as needed.
pub fn save_json_file<D: Serialize, P: AsRef<Path>>(
    corp: &Corporation<D>,
    path: P,
) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, save_json(corp)?)?;
    info!(path = %path.display(), corp = corp.name(), "saved corporation");
    Ok(())
}

pub fn load_json_file<D: DeserializeOwned, P: AsRef<Path>>(
    path: P,
) -> Result<Corporation<D>, PersistenceError> {
    let path = path.as_ref();
    let corp = load_json(&fs::read_to_string(path)?)?;
    info!(path = %path.display(), corp = corp.name(), "loaded corporation");
    Ok(corp)
}

/// Compact in-memory snapshot for rollback and replay.
pub fn checkpoint<D: Serialize>(corp: &Corporation<D>) -> Result<Vec<u8>, PersistenceError> {
    Ok(bincode::serialize(corp)?)
}

pub fn restore<D: DeserializeOwned>(bytes: &[u8]) -> Result<Corporation<D>, PersistenceError> {
    let corp: Corporation<D> = bincode::deserialize(bytes)?;
    check(&corp)?;
    Ok(corp)
}

fn check<D>(corp: &Corporation<D>) -> Result<(), PersistenceError> {
    corp.config().validate()?;
    if !corp.shares_balanced() {
        return Err(PersistenceError::Unbalanced);
    }
    Ok(())
}

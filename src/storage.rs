//! TOML persistence helpers for the `saves/` directory.
//!
//! Every progression system (achievements, challenges, battle pass, clan,
//! leaderboard) persists one TOML file.  Reads that fail for any reason fall
//! back to the caller's default state — a corrupt save never propagates an
//! error into gameplay.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use bevy::prelude::*;

fn save_dir() -> PathBuf {
    PathBuf::from("saves")
}

fn file_path(name: &str) -> PathBuf {
    save_dir().join(name)
}

/// Load `saves/<name>`, returning `Default::default()` when the file is
/// missing or unreadable.  Parse failures are logged at `warn` level.
pub fn load_or_default<T: DeserializeOwned + Default>(name: &str) -> T {
    let path = file_path(name);
    match fs::read_to_string(&path) {
        Ok(contents) => match toml::from_str::<T>(&contents) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to parse {}: {e}; starting fresh", path.display());
                T::default()
            }
        },
        Err(_) => T::default(),
    }
}

/// Serialize `value` to `saves/<name>`, creating the directory on demand.
pub fn save(name: &str, value: &impl Serialize) -> Result<(), String> {
    fs::create_dir_all(save_dir()).map_err(|err| format!("failed to create save dir: {err}"))?;

    let serialized = toml::to_string_pretty(value)
        .map_err(|err| format!("failed to serialize {name}: {err}"))?;

    let path = file_path(name);
    fs::write(&path, serialized).map_err(|err| format!("failed to write {}: {err}", path.display()))
}

/// Serialize and log on failure rather than propagating — save failures must
/// never interrupt gameplay.
pub fn save_or_log(name: &str, value: &impl Serialize) {
    if let Err(err) = save(name, value) {
        error!("{err}");
    }
}

/// Seconds since the Unix epoch, saturating to 0 on clock skew.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::CoreError;
use crate::models::settings::Settings;
use crate::models::snapshot::MarketSnapshot;

use super::migration::{self, RawSettings};

/// File name of the persisted Settings record.
pub const SETTINGS_FILE: &str = "gold_settings.json";

/// File name of the persisted last-known MarketSnapshot.
pub const DATA_FILE: &str = "gold_data.json";

/// Owns the two persisted records.
///
/// Loads are total: a missing or corrupt record silently becomes defaults
/// (settings) or nothing (snapshot) — corruption is a recovery case, never
/// an error the caller sees. Writes are swallowed on failure; the in-memory
/// copy stays authoritative for the session.
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// A store rooted at `dir`. The directory is created lazily on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }

    pub fn data_path(&self) -> PathBuf {
        self.dir.join(DATA_FILE)
    }

    // ── Settings record ─────────────────────────────────────────────

    /// Load the Settings record, migrating legacy shapes. Absent or corrupt
    /// records yield defaults.
    pub fn load_settings(&self) -> Settings {
        let bytes = match fs::read(self.settings_path()) {
            Ok(bytes) => bytes,
            Err(_) => return Settings::default(), // first run
        };
        match Self::settings_from_slice(&bytes) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("stored settings unreadable, reverting to defaults: {e}");
                Settings::default()
            }
        }
    }

    /// Persist the whole Settings record. Failures are swallowed (logged);
    /// the caller's in-memory copy remains authoritative.
    pub fn save_settings(&self, settings: &Settings) {
        if let Err(e) = self.try_save_settings(settings) {
            log::warn!("failed to persist settings: {e}");
        }
    }

    pub fn try_save_settings(&self, settings: &Settings) -> Result<(), CoreError> {
        let bytes = Self::settings_to_vec(settings)?;
        self.write_record(&self.settings_path(), &bytes)
    }

    // ── Snapshot record ─────────────────────────────────────────────

    /// Load the last known MarketSnapshot, if any survives on disk. Only used
    /// to avoid a blank flash on restart; never authoritative over a fresh
    /// tick.
    pub fn load_snapshot(&self) -> Option<MarketSnapshot> {
        let bytes = fs::read(self.data_path()).ok()?;
        match Self::snapshot_from_slice(&bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log::warn!("stored market data unreadable, ignoring: {e}");
                None
            }
        }
    }

    /// Persist the snapshot. Same swallow semantics as `save_settings`.
    pub fn save_snapshot(&self, snapshot: &MarketSnapshot) {
        if let Err(e) = self.try_save_snapshot(snapshot) {
            log::warn!("failed to persist market data: {e}");
        }
    }

    pub fn try_save_snapshot(&self, snapshot: &MarketSnapshot) -> Result<(), CoreError> {
        let bytes = Self::snapshot_to_vec(snapshot)?;
        self.write_record(&self.data_path(), &bytes)
    }

    // ── Byte-level codec (for frontends that own file I/O) ──────────

    /// Decode a Settings record from raw bytes, running migration.
    pub fn settings_from_slice(data: &[u8]) -> Result<Settings, CoreError> {
        let raw: RawSettings = serde_json::from_slice(data)?;
        Ok(migration::migrate(raw))
    }

    /// Encode the whole Settings record.
    pub fn settings_to_vec(settings: &Settings) -> Result<Vec<u8>, CoreError> {
        serde_json::to_vec_pretty(settings)
            .map_err(|e| CoreError::Serialization(format!("failed to serialize settings: {e}")))
    }

    pub fn snapshot_from_slice(data: &[u8]) -> Result<MarketSnapshot, CoreError> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn snapshot_to_vec(snapshot: &MarketSnapshot) -> Result<Vec<u8>, CoreError> {
        serde_json::to_vec_pretty(snapshot)
            .map_err(|e| CoreError::Serialization(format!("failed to serialize market data: {e}")))
    }

    // ── Internal ────────────────────────────────────────────────────

    fn write_record(&self, path: &Path, bytes: &[u8]) -> Result<(), CoreError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

//! JSON persistence for calibrations

use crate::store::{Calibration, CalibrationRecord, CalibrationStore};
use crate::{Phase, StorageError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// On-disk form of one phase: named values plus capture time
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    captured_at: DateTime<Utc>,
    values: BTreeMap<String, f64>,
}

/// Calibration file keyed by phase name
pub struct CalibrationFile {
    path: PathBuf,
}

impl CalibrationFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load stored calibrations. A missing file yields an empty store.
    pub fn load(&self) -> Result<CalibrationStore, StorageError> {
        let mut store = CalibrationStore::new();

        if !self.path.exists() {
            debug!("No calibration file at {}", self.path.display());
            return Ok(store);
        }

        let content = fs::read_to_string(&self.path)?;
        let entries: BTreeMap<Phase, StoredEntry> = serde_json::from_str(&content)?;

        for (phase, entry) in entries {
            let calibration = Calibration::from_values(phase, &entry.values)?;
            store.insert(
                phase,
                CalibrationRecord {
                    calibration,
                    captured_at: entry.captured_at,
                },
            );
        }

        info!(
            "Loaded {} calibration(s) from {}",
            store.len(),
            self.path.display()
        );
        Ok(store)
    }

    /// Write every stored calibration, replacing the file
    pub fn save(&self, store: &CalibrationStore) -> Result<(), StorageError> {
        let entries: BTreeMap<Phase, StoredEntry> = store
            .records()
            .into_iter()
            .map(|(phase, record)| {
                (
                    phase,
                    StoredEntry {
                        captured_at: record.captured_at,
                        values: record.calibration.to_values(),
                    },
                )
            })
            .collect();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, content)?;
        info!("Saved {} calibration(s) to {}", entries.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = CalibrationFile::new(dir.path().join("calibration.json"));
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = CalibrationFile::new(dir.path().join("nested/calibration.json"));

        let mut store = CalibrationStore::new();
        store.set(
            Phase::Side,
            Calibration::ArmShoulder {
                bow_arm: 170.0,
                shoulder_lift: 10.0,
            },
        );
        store.set(Phase::Front, Calibration::Stance { stance_ratio: 1.25 });
        file.save(&store).unwrap();

        let loaded = file.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get(Phase::Front), store.get(Phase::Front));
        assert_eq!(
            loaded.record(Phase::Side).unwrap().captured_at,
            store.record(Phase::Side).unwrap().captured_at
        );
    }

    #[test]
    fn test_flat_record_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calibration.json");
        fs::write(
            &path,
            r#"{"front": {"captured_at": "2024-05-01T10:00:00Z", "values": {"stance_ratio": 1.5}}}"#,
        )
        .unwrap();

        let store = CalibrationFile::new(&path).load().unwrap();
        assert_eq!(
            store.get(Phase::Front),
            Some(&Calibration::Stance { stance_ratio: 1.5 })
        );
    }

    #[test]
    fn test_incomplete_entry_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calibration.json");
        fs::write(
            &path,
            r#"{"side": {"captured_at": "2024-05-01T10:00:00Z", "values": {"bow_arm": 170.0}}}"#,
        )
        .unwrap();

        assert!(matches!(
            CalibrationFile::new(&path).load(),
            Err(StorageError::Invalid(_))
        ));
    }
}

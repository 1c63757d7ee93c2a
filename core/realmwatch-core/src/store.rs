//! Durable subject-state storage.
//!
//! A JSON file keyed by subject id, written atomically (temp file + persist).
//! Loads degrade gracefully: a missing, corrupt, or future-format file reads
//! as empty. Writes are conditional so an overlapping retry cannot corrupt
//! counters.

use fs_err as fs;
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{Result, WatchError};
use crate::record::{ActivityRecord, StateFile, STATE_STORE_VERSION};

/// Keyed read/write contract for subject state.
pub trait StateStore {
    /// Most recent record for a subject, if any.
    fn get(&self, subject_id: &str) -> Result<Option<ActivityRecord>>;

    /// Persists `next`, conditional on the stored record still matching
    /// `expected` (the record the caller read at cycle start). Fails with
    /// [`WatchError::StoreConflict`] when another writer got there first.
    fn put(&self, expected: Option<&ActivityRecord>, next: &ActivityRecord) -> Result<()>;
}

/// [`StateStore`] backed by a single JSON file.
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Reads the state file, degrading to an empty store on any problem.
    fn load(&self) -> StateFile {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return StateFile::new(),
            Err(err) => {
                warn!(error = %err, path = %self.path.display(), "State file unreadable; treating as empty");
                return StateFile::new();
            }
        };

        // Check the version first to avoid misinterpreting a future format.
        #[derive(Deserialize)]
        struct VersionCheck {
            #[serde(default)]
            version: u32,
        }

        if let Ok(check) = serde_json::from_str::<VersionCheck>(&content) {
            if check.version > STATE_STORE_VERSION {
                warn!(
                    version = check.version,
                    path = %self.path.display(),
                    "State file written by a future build; treating as empty"
                );
                return StateFile::new();
            }
        }

        match serde_json::from_str(&content) {
            Ok(file) => file,
            Err(err) => {
                warn!(error = %err, path = %self.path.display(), "State file corrupt; treating as empty");
                StateFile::new()
            }
        }
    }

    fn save(&self, file: &StateFile) -> Result<()> {
        let content =
            serde_json::to_string_pretty(file).map_err(|source| WatchError::StoreEncoding {
                context: "serialize state file".to_string(),
                source,
            })?;

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|source| WatchError::StoreIo {
            context: format!("create state directory {}", dir.display()),
            source,
        })?;

        // Temp file in the same directory, then rename (atomic on the same
        // filesystem).
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|source| WatchError::StoreIo {
            context: "create temp state file".to_string(),
            source,
        })?;
        tmp.write_all(content.as_bytes())
            .map_err(|source| WatchError::StoreIo {
                context: "write temp state file".to_string(),
                source,
            })?;
        tmp.flush().map_err(|source| WatchError::StoreIo {
            context: "flush temp state file".to_string(),
            source,
        })?;
        tmp.persist(&self.path).map_err(|err| WatchError::StoreIo {
            context: format!("persist state file {}", self.path.display()),
            source: err.error,
        })?;

        Ok(())
    }
}

impl StateStore for FileStateStore {
    fn get(&self, subject_id: &str) -> Result<Option<ActivityRecord>> {
        Ok(self.load().subjects.get(subject_id).cloned())
    }

    fn put(&self, expected: Option<&ActivityRecord>, next: &ActivityRecord) -> Result<()> {
        let mut file = self.load();

        let current = file.subjects.get(&next.subject_id);
        let unchanged = match (current, expected) {
            (None, None) => true,
            (Some(current), Some(expected)) => current.same_state(expected),
            _ => false,
        };
        if !unchanged {
            return Err(WatchError::StoreConflict {
                subject_id: next.subject_id.clone(),
            });
        }

        file.version = STATE_STORE_VERSION;
        file.subjects.insert(next.subject_id.clone(), next.clone());
        self.save(&file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use tempfile::TempDir;

    fn instant(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn store_in(dir: &TempDir) -> FileStateStore {
        FileStateStore::new(dir.path().join("state.json"))
    }

    #[test]
    fn missing_file_reads_as_no_record() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.get("Durin").unwrap(), None);
    }

    #[test]
    fn put_then_get_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let record = ActivityRecord::baseline("Durin", instant("2024-01-01T00:00:00Z"));

        store.put(None, &record).unwrap();

        let loaded = store.get("Durin").unwrap().unwrap();
        assert!(loaded.same_state(&record));
    }

    #[test]
    fn persisted_timestamps_carry_a_utc_marker() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let record = ActivityRecord::baseline("Durin", instant("2024-01-01T00:00:00Z"));
        store.put(None, &record).unwrap();

        let content = std::fs::read_to_string(dir.path().join("state.json")).unwrap();
        assert!(content.contains("2024-01-01T00:00:00Z"), "got: {content}");
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("state.json"), "{ not json ").unwrap();
        let store = store_in(&dir);
        assert_eq!(store.get("Durin").unwrap(), None);
    }

    #[test]
    fn future_version_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let content = format!(
            r#"{{"version":{},"subjects":{{"Durin":{{"subject_id":"Durin","strike":9}}}}}}"#,
            STATE_STORE_VERSION + 1
        );
        std::fs::write(dir.path().join("state.json"), content).unwrap();
        let store = store_in(&dir);
        assert_eq!(store.get("Durin").unwrap(), None);
    }

    #[test]
    fn conditional_put_rejects_unexpected_existing_record() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let first = ActivityRecord::baseline("Durin", instant("2024-01-01T00:00:00Z"));
        store.put(None, &first).unwrap();

        // A second writer that read "no record" must not clobber the first.
        let stale = ActivityRecord::baseline("Durin", instant("2024-01-02T00:00:00Z"));
        let err = store.put(None, &stale).unwrap_err();
        assert!(matches!(err, WatchError::StoreConflict { .. }));

        let kept = store.get("Durin").unwrap().unwrap();
        assert!(kept.same_state(&first));
    }

    #[test]
    fn conditional_put_rejects_changed_record() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let first = ActivityRecord::baseline("Durin", instant("2024-01-01T00:00:00Z"));
        store.put(None, &first).unwrap();

        let mut advanced = first.clone();
        advanced.strike = 1;
        advanced.last_seen = Some(instant("2024-01-02T00:00:00Z"));
        store.put(Some(&first), &advanced).unwrap();

        // The first reader's expectation is now stale.
        let mut stale_next = first.clone();
        stale_next.cooldown = 1;
        let err = store.put(Some(&first), &stale_next).unwrap_err();
        assert!(matches!(err, WatchError::StoreConflict { .. }));
    }

    #[test]
    fn conditional_put_ignores_updated_at_drift() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut first = ActivityRecord::baseline("Durin", instant("2024-01-01T00:00:00Z"));
        first.updated_at = Some(instant("2024-01-01T00:30:00Z"));
        store.put(None, &first).unwrap();

        let mut expected = first.clone();
        expected.updated_at = Some(instant("2024-01-01T01:00:00Z"));
        let mut next = first.clone();
        next.cooldown = 1;
        store.put(Some(&expected), &next).unwrap();
    }

    #[test]
    fn records_for_other_subjects_are_preserved() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let durin = ActivityRecord::baseline("Durin", instant("2024-01-01T00:00:00Z"));
        let thrain = ActivityRecord::baseline("Thrain", instant("2024-02-01T00:00:00Z"));
        store.put(None, &durin).unwrap();
        store.put(None, &thrain).unwrap();

        assert!(store.get("Durin").unwrap().unwrap().same_state(&durin));
        assert!(store.get("Thrain").unwrap().unwrap().same_state(&thrain));
    }
}

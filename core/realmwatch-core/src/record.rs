//! Persisted activity state for tracked subjects.
//!
//! Current on-disk format is v2 (v1 predates the cooldown counter). Records
//! use `#[serde(default)]` so files written by older builds still parse.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Strike ceiling. Once a subject is here, further fresh activity keeps it
/// pinned without re-notifying.
pub const MAX_STRIKE: u8 = 5;

/// Consecutive quiet cycles required to rehabilitate an outstanding strike.
pub const COOLDOWN_LIMIT: u8 = 12;

/// Current version of the on-disk state format.
pub const STATE_STORE_VERSION: u32 = 2;

/// Last-known activity state for one tracked subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub subject_id: String,
    /// Most recent observed activity instant (UTC). Monotonically
    /// non-decreasing in storage.
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    /// Consecutive fresh-activity escalations, in `0..=MAX_STRIKE`.
    #[serde(default)]
    pub strike: u8,
    /// Consecutive quiet cycles while a strike is outstanding, in
    /// `0..COOLDOWN_LIMIT`.
    #[serde(default)]
    pub cooldown: u8,
    /// When this record was last persisted. Bookkeeping only.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ActivityRecord {
    /// A clean first-observation record: counters at zero, no notification
    /// history.
    pub fn baseline(subject_id: &str, last_seen: DateTime<Utc>) -> Self {
        Self {
            subject_id: subject_id.to_string(),
            last_seen: Some(last_seen),
            strike: 0,
            cooldown: 0,
            updated_at: None,
        }
    }

    /// State equality used for change detection and conditional writes.
    /// Ignores `updated_at`.
    pub fn same_state(&self, other: &Self) -> bool {
        self.subject_id == other.subject_id
            && self.last_seen == other.last_seen
            && self.strike == other.strike
            && self.cooldown == other.cooldown
    }
}

/// The complete persisted store: one record per subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    pub version: u32,
    #[serde(default)]
    pub subjects: HashMap<String, ActivityRecord>,
}

impl StateFile {
    pub fn new() -> Self {
        Self {
            version: STATE_STORE_VERSION,
            subjects: HashMap::new(),
        }
    }
}

impl Default for StateFile {
    fn default() -> Self {
        Self::new()
    }
}

//! Error types for realmwatch operations.
//!
//! Fetch, parse, store, and notification failures stay distinct so the daemon
//! can log them separately, even where the recovery path is identical.

use crate::timestamp::NormalizeError;

/// All errors that can occur across an evaluation cycle.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    // ─────────────────────────────────────────────────────────────────────
    // Fetch Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("HTTP client construction failed: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },

    #[error("Fetch failed: {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Fetch returned HTTP {status}: {url}")]
    FetchStatus { url: String, status: u16 },

    // ─────────────────────────────────────────────────────────────────────
    // Extraction / Normalization Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Profile page has no last-seen field")]
    FieldMissing,

    #[error("Timestamp normalization failed: {0}")]
    Normalize(#[from] NormalizeError),

    // ─────────────────────────────────────────────────────────────────────
    // State Store Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("State store I/O: {context}: {source}")]
    StoreIo {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("State store encoding: {context}: {source}")]
    StoreEncoding {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("State store conflict: record for {subject_id} changed underneath this cycle")]
    StoreConflict { subject_id: String },

    // ─────────────────────────────────────────────────────────────────────
    // Notification Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Notification delivery failed: {source}")]
    Notify {
        #[source]
        source: reqwest::Error,
    },

    #[error("Notification rejected: HTTP {status}")]
    NotifyStatus { status: u16 },

    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Configuration: {0}")]
    Config(String),

    #[error("Parameter not found: {name}")]
    ParameterNotFound { name: String },
}

/// Convenience type alias for Results using WatchError.
pub type Result<T> = std::result::Result<T, WatchError>;

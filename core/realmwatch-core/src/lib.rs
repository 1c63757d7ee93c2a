//! # realmwatch-core
//!
//! Core library for realmwatch: a single-subject "last seen" activity
//! tracker. The decision core (timestamp normalization plus the
//! strike/cooldown evaluator) is pure; fetch, storage, and notification sit
//! behind collaborator traits so the daemon and tests wire them freely.
//!
//! ## Design principles
//!
//! - **Synchronous**: one cycle is a plain function call; no async runtime.
//! - **Graceful degradation**: missing or corrupt state reads as empty.
//! - **Pure core**: `evaluate` is clock-free and I/O-free; the cycle driver
//!   owns time and persistence.

// Public modules
pub mod config;
pub mod cycle;
pub mod error;
pub mod evaluate;
pub mod extract;
pub mod fetch;
pub mod notify;
pub mod params;
pub mod record;
pub mod store;
pub mod timestamp;

// Re-export commonly used items at crate root
pub use config::{WatchConfig, DEFAULT_INTERVAL_MINS};
pub use cycle::{run_cycle, CycleOutcome};
pub use error::{Result, WatchError};
pub use evaluate::{evaluate, Evaluation, NotificationLevel};
pub use fetch::{HttpFetcher, PageFetcher};
pub use notify::{render_message, Notifier, WebhookNotifier};
pub use params::{EnvParameters, ParameterSource, WEBHOOK_PARAM};
pub use record::{ActivityRecord, StateFile, COOLDOWN_LIMIT, MAX_STRIKE, STATE_STORE_VERSION};
pub use store::{FileStateStore, StateStore};
pub use timestamp::{normalize, NormalizeError, HIDDEN_SENTINEL};

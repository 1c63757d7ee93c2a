//! Runtime configuration.
//!
//! A TOML file provides the base, `REALMWATCH_*` environment variables
//! overlay it. Subject identity and the state path are configuration, never
//! hardcoded.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{Result, WatchError};

/// Default polling interval between evaluation cycles.
pub const DEFAULT_INTERVAL_MINS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// Stable identifier of the tracked subject (the profile's player name).
    #[serde(default)]
    pub subject: String,
    /// Fully qualified profile page URL.
    #[serde(default)]
    pub profile_url: String,
    /// Where subject state lives on disk.
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
    /// Mention prefixes added to every fired notification.
    #[serde(default)]
    pub contacts: Vec<String>,
    /// Minutes between evaluation cycles.
    #[serde(default = "default_interval_mins")]
    pub interval_mins: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            subject: String::new(),
            profile_url: String::new(),
            state_path: default_state_path(),
            contacts: Vec::new(),
            interval_mins: DEFAULT_INTERVAL_MINS,
        }
    }
}

impl WatchConfig {
    /// Loads configuration: explicit file if given, the well-known file if it
    /// exists, defaults otherwise; then the environment overlay; then
    /// validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|path| path.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.overlay(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| WatchError::Config(format!("read {}: {err}", path.display())))?;
        toml::from_str(&content)
            .map_err(|err| WatchError::Config(format!("parse {}: {err}", path.display())))
    }

    /// Applies `REALMWATCH_*` overrides through an injected lookup so tests
    /// never touch process environment.
    pub fn overlay<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("REALMWATCH_SUBJECT") {
            self.subject = value;
        }
        if let Some(value) = lookup("REALMWATCH_PROFILE_URL") {
            self.profile_url = value;
        }
        if let Some(value) = lookup("REALMWATCH_STATE_PATH") {
            self.state_path = PathBuf::from(value);
        }
        if let Some(value) = lookup("REALMWATCH_CONTACTS") {
            self.contacts = value
                .split(',')
                .map(str::trim)
                .filter(|contact| !contact.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(value) = lookup("REALMWATCH_INTERVAL_MINS") {
            match value.parse() {
                Ok(mins) => self.interval_mins = mins,
                Err(_) => warn!(value = %value, "Ignoring unparseable REALMWATCH_INTERVAL_MINS"),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.subject.trim().is_empty() {
            return Err(WatchError::Config(
                "subject is required (config `subject` or REALMWATCH_SUBJECT)".to_string(),
            ));
        }
        if self.profile_url.trim().is_empty() {
            return Err(WatchError::Config(
                "profile URL is required (config `profile_url` or REALMWATCH_PROFILE_URL)"
                    .to_string(),
            ));
        }
        if self.interval_mins == 0 {
            return Err(WatchError::Config(
                "interval_mins must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_interval_mins() -> u64 {
    DEFAULT_INTERVAL_MINS
}

fn default_state_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".realmwatch").join("state.json"))
        .unwrap_or_else(|| PathBuf::from("realmwatch-state.json"))
}

fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".realmwatch").join("config.toml"))
}

//! Parameter (secret) lookup keyed by path-like names.
//!
//! `/discord/webhook` resolves to the `REALMWATCH_DISCORD_WEBHOOK`
//! environment variable first, then to an optional JSON parameters file.
//! Values are resolved once at process start and passed into collaborators
//! at construction.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, WatchError};

/// Parameter name for the notification webhook URL.
pub const WEBHOOK_PARAM: &str = "/discord/webhook";

/// Secure parameter lookup contract.
pub trait ParameterSource {
    fn get(&self, name: &str) -> Result<String>;
}

/// Environment-backed lookup with a JSON file fallback.
pub struct EnvParameters {
    file: Option<PathBuf>,
}

impl EnvParameters {
    pub fn new() -> Self {
        Self {
            file: default_parameters_path(),
        }
    }

    pub fn with_file(file: Option<PathBuf>) -> Self {
        Self { file }
    }
}

impl Default for EnvParameters {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterSource for EnvParameters {
    fn get(&self, name: &str) -> Result<String> {
        if let Ok(value) = std::env::var(env_var_for(name)) {
            if !value.trim().is_empty() {
                return Ok(value);
            }
        }
        if let Some(path) = &self.file {
            if let Some(value) = lookup_file(path, name) {
                return Ok(value);
            }
        }
        Err(WatchError::ParameterNotFound {
            name: name.to_string(),
        })
    }
}

/// `/discord/webhook` → `REALMWATCH_DISCORD_WEBHOOK`.
fn env_var_for(name: &str) -> String {
    let mut var = String::from("REALMWATCH");
    for part in name.split('/').filter(|part| !part.is_empty()) {
        var.push('_');
        var.push_str(&part.to_ascii_uppercase().replace('-', "_"));
    }
    var
}

fn default_parameters_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".realmwatch").join("parameters.json"))
}

fn lookup_file(path: &Path, name: &str) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let map: HashMap<String, String> = serde_json::from_str(&content).ok()?;
    map.get(name).cloned()
}

//! Global setting of the audit.
//!
//! Defaults are overlaid by `audit_setting.json` from the audit temp folder,
//! then by `COMPAS_AUDIT_*` environment variables.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::{LazyLock, RwLock};

use super::utility::get_file_path;

/// Setting filename
pub const SETTING_FILENAME: &str = "audit_setting.json";

/// Prefix of environment overrides, e.g. `COMPAS_AUDIT_DATA_PATH`
pub const ENV_PREFIX: &str = "COMPAS_AUDIT_";

/// Default location of the CSV on disk
pub const DEFAULT_DATA_PATH: &str = "data/compas-scores-two-years.csv";

/// Default COMPAS download location
pub const DEFAULT_DATA_URL: &str =
    "https://raw.githubusercontent.com/propublica/compas-analysis/master/compas-scores-two-years.csv";

/// Default settings
fn default_settings() -> HashMap<String, SettingValue> {
    let mut settings = HashMap::new();

    // Data acquisition
    settings.insert(
        "data.path".to_string(),
        SettingValue::String(DEFAULT_DATA_PATH.to_string()),
    );
    settings.insert("data.url".to_string(), SettingValue::String(DEFAULT_DATA_URL.to_string()));
    settings.insert("data.mirror_path".to_string(), SettingValue::String(String::new()));
    settings.insert("data.timeout_secs".to_string(), SettingValue::Int(60));

    // Fairness definition
    settings.insert("fairness.protected_attribute".to_string(), SettingValue::String("race".to_string()));
    settings.insert("fairness.privileged_value".to_string(), SettingValue::String("Caucasian".to_string()));
    settings.insert(
        "fairness.unprivileged_value".to_string(),
        SettingValue::String("African-American".to_string()),
    );
    settings.insert("fairness.label_name".to_string(), SettingValue::String("two_year_recid".to_string()));
    settings.insert("fairness.favorable_label".to_string(), SettingValue::Int(0));
    settings.insert("fairness.risk_column".to_string(), SettingValue::String("score_text".to_string()));

    // Train/test split
    settings.insert("split.train_ratio".to_string(), SettingValue::Float(0.7));
    settings.insert("split.seed".to_string(), SettingValue::Int(-1));

    // Output
    settings.insert("output.dir".to_string(), SettingValue::String(".".to_string()));
    settings.insert("output.report_json".to_string(), SettingValue::Bool(false));

    // Log settings
    settings.insert("log.level".to_string(), SettingValue::Int(20)); // INFO level
    settings.insert("log.console".to_string(), SettingValue::Bool(true));
    settings.insert("log.file".to_string(), SettingValue::Bool(false));

    settings
}

/// Setting value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl SettingValue {
    /// Get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64
    pub fn as_float(&self) -> Option<f64> {
        match self {
            SettingValue::Float(f) => Some(*f),
            SettingValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Parse a raw override string using the type of the value it replaces.
    fn parse_like(&self, raw: &str) -> Option<SettingValue> {
        match self {
            SettingValue::String(_) => Some(SettingValue::String(raw.to_string())),
            SettingValue::Int(_) => raw.trim().parse().ok().map(SettingValue::Int),
            SettingValue::Float(_) => raw.trim().parse().ok().map(SettingValue::Float),
            SettingValue::Bool(_) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Some(SettingValue::Bool(true)),
                "0" | "false" | "no" | "off" => Some(SettingValue::Bool(false)),
                _ => None,
            },
        }
    }
}

/// Settings container
pub struct Settings {
    settings: RwLock<HashMap<String, SettingValue>>,
}

impl Settings {
    /// Create new Settings with defaults, the settings file and env overrides
    pub fn new() -> Self {
        let settings = Self::with_defaults();

        if let Some(file_settings) = load_settings_from_file(&get_file_path(SETTING_FILENAME)) {
            settings.update(file_settings);
        }
        settings.apply_env_overrides(env::vars());

        settings
    }

    /// Settings holding only the built-in defaults
    pub fn with_defaults() -> Self {
        Self {
            settings: RwLock::new(default_settings()),
        }
    }

    /// Defaults overlaid by the given JSON settings file
    pub fn from_file(path: &Path) -> Self {
        let settings = Self::with_defaults();
        if let Some(file_settings) = load_settings_from_file(path) {
            settings.update(file_settings);
        }
        settings
    }

    /// Get a setting value
    pub fn get(&self, key: &str) -> Option<SettingValue> {
        self.settings.read().ok()?.get(key).cloned()
    }

    /// Get a string setting
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|v| v.as_str().map(|s| s.to_string()))
    }

    /// Get an integer setting
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_int())
    }

    /// Get a float setting
    pub fn get_float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.as_float())
    }

    /// Get a bool setting
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    /// Set a setting value
    pub fn set(&self, key: impl Into<String>, value: SettingValue) {
        if let Ok(mut settings) = self.settings.write() {
            settings.insert(key.into(), value);
        }
    }

    /// Update settings from a map
    pub fn update(&self, new_settings: HashMap<String, SettingValue>) {
        if let Ok(mut settings) = self.settings.write() {
            for (key, value) in new_settings {
                settings.insert(key, value);
            }
        }
    }

    /// Apply `COMPAS_AUDIT_*` overrides to known keys.
    ///
    /// `COMPAS_AUDIT_SPLIT_TRAIN_RATIO=0.8` overrides `split.train_ratio`.
    /// Values that do not parse as the type of the default are ignored.
    pub fn apply_env_overrides<I>(&self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let Ok(mut settings) = self.settings.write() else {
            return;
        };

        let env_keys: HashMap<String, String> = settings
            .keys()
            .map(|key| (env_key(key), key.clone()))
            .collect();

        for (name, raw) in vars {
            let Some(key) = env_keys.get(&name) else {
                continue;
            };
            let parsed = settings.get(key).and_then(|current| current.parse_like(&raw));
            match parsed {
                Some(value) => {
                    settings.insert(key.clone(), value);
                }
                None => tracing::warn!("ignoring {}={}: value does not parse", name, raw),
            }
        }
    }

    /// Get all settings as HashMap
    pub fn get_all(&self) -> HashMap<String, SettingValue> {
        self.settings
            .read()
            .map(|settings| settings.clone())
            .unwrap_or_default()
    }

}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Environment variable name for a setting key
fn env_key(key: &str) -> String {
    format!("{}{}", ENV_PREFIX, key.replace('.', "_").to_ascii_uppercase())
}

/// Load settings from JSON file
fn load_settings_from_file(filepath: &Path) -> Option<HashMap<String, SettingValue>> {
    if !filepath.exists() {
        return None;
    }
    let content = fs::read_to_string(filepath).ok()?;
    match serde_json::from_str(&content) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!("ignoring unreadable settings file {}: {}", filepath.display(), e);
            None
        }
    }
}

/// Global settings instance
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::new);

//! Settings for the scaler and its logging.
//!
//! Settings are a flat map of dotted keys (`scaler.min_periods`,
//! `log.level`, ...) to loosely typed values, seeded with defaults and
//! optionally overridden from a JSON file.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::Result;

pub const DATE_COLUMN: &str = "scaler.date_column";
pub const MERGE_COLUMNS: &str = "scaler.merge_columns";
pub const MIN_PERIODS: &str = "scaler.min_periods";
pub const LOG_LEVEL: &str = "log.level";
pub const LOG_CONSOLE: &str = "log.console";
pub const LOG_FILE: &str = "log.file";
pub const LOG_JSON: &str = "log.json";

/// Default settings
fn default_settings() -> HashMap<String, SettingValue> {
    let mut settings = HashMap::new();

    // Scaler settings
    settings.insert(DATE_COLUMN.to_string(), SettingValue::String("date".to_string()));
    settings.insert(MERGE_COLUMNS.to_string(), SettingValue::List(Vec::new()));
    settings.insert(MIN_PERIODS.to_string(), SettingValue::Int(0));

    // Log settings
    settings.insert(LOG_LEVEL.to_string(), SettingValue::Int(20)); // INFO level
    settings.insert(LOG_CONSOLE.to_string(), SettingValue::Bool(true));
    settings.insert(LOG_FILE.to_string(), SettingValue::String(String::new()));
    settings.insert(LOG_JSON.to_string(), SettingValue::Bool(false));

    settings
}

/// Setting value types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    String(String),
    Int(i64),
    Bool(bool),
    List(Vec<String>),
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

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as a list of strings
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            SettingValue::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Settings container, passed explicitly to whoever needs it.
#[derive(Debug, Clone)]
pub struct ScalerSetting {
    settings: HashMap<String, SettingValue>,
}

impl ScalerSetting {
    /// Create new settings with defaults
    pub fn new() -> Self {
        Self {
            settings: default_settings(),
        }
    }

    /// Defaults overridden by the keys found in a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let file_settings: HashMap<String, SettingValue> = serde_json::from_str(&content)?;

        let mut setting = Self::new();
        setting.update(file_settings);
        Ok(setting)
    }

    /// Save settings to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.settings)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Get a setting value
    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.settings.get(key)
    }

    /// Get a string setting
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|v| v.as_str().map(|s| s.to_string()))
    }

    /// Get an integer setting
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_int())
    }

    /// Get a bool setting
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    /// Get a string list setting
    pub fn get_list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).and_then(|v| v.as_list().map(|items| items.to_vec()))
    }

    /// Set a setting value
    pub fn set(&mut self, key: impl Into<String>, value: SettingValue) {
        self.settings.insert(key.into(), value);
    }

    /// Update settings from a map
    pub fn update(&mut self, new_settings: HashMap<String, SettingValue>) {
        for (key, value) in new_settings {
            self.settings.insert(key, value);
        }
    }

    /// Get all settings as HashMap
    pub fn get_all(&self) -> &HashMap<String, SettingValue> {
        &self.settings
    }
}

impl Default for ScalerSetting {
    fn default() -> Self {
        Self::new()
    }
}

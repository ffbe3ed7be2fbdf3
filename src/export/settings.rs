//! Export settings lookup.
//!
//! A thin typed view over a JSON object. Lookups fall back to a
//! caller-supplied default when a key is absent or has the wrong shape.

use std::path::Path;

use serde_json::{Map, Value};

use crate::util::Result;

/// Write exported documents into a compressed pak archive.
pub const SETTING_EXPORT_COMPRESSED_COLLADA: &str = "ExportCompressedCOLLADA";
/// Run the CAF compression pass after primary compilation.
pub const SETTING_COMPRESS_CAFS: &str = "CompressCAFs";
/// Run the geometry-asset optimization pass after primary compilation.
pub const SETTING_OPTIMIZE_ASSETS: &str = "OptimizeAssets";

/// Settings store.
#[derive(Clone, Debug, Default)]
pub struct Settings {
    values: Map<String, Value>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a JSON object file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let values = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v.as_object().cloned())
            .unwrap_or_default();
        Ok(Self { values })
    }

    /// Set a value, replacing any previous one.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// Boolean lookup with default. Integer values are accepted the way
    /// legacy settings stores them: nonzero means true.
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_i64().map(|v| v != 0).unwrap_or(default),
            _ => default,
        }
    }

    /// Integer lookup with default.
    pub fn int_or(&self, key: &str, default: i64) -> i64 {
        match self.values.get(key) {
            Some(Value::Number(n)) => n.as_i64().unwrap_or(default),
            Some(Value::Bool(b)) => *b as i64,
            _ => default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_defaults() {
        let settings = Settings::new();
        assert!(settings.bool_or(SETTING_COMPRESS_CAFS, true));
        assert!(!settings.bool_or(SETTING_COMPRESS_CAFS, false));
        assert_eq!(settings.int_or("missing", 7), 7);
    }

    #[test]
    fn test_numeric_booleans() {
        let mut settings = Settings::new();
        settings.set(SETTING_OPTIMIZE_ASSETS, 0);
        assert!(!settings.bool_or(SETTING_OPTIMIZE_ASSETS, true));
        settings.set(SETTING_OPTIMIZE_ASSETS, 1);
        assert!(settings.bool_or(SETTING_OPTIMIZE_ASSETS, false));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"CompressCAFs": 0, "OptimizeAssets": true}"#).unwrap();
        let settings = Settings::from_file(&path).unwrap();
        assert!(!settings.bool_or(SETTING_COMPRESS_CAFS, true));
        assert!(settings.bool_or(SETTING_OPTIMIZE_ASSETS, false));
    }
}

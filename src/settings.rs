//! Operator settings for the command-line editor.
//!
//! Settings live in an optional JSON file; every field may be omitted and
//! falls back to its default. Command-line flags override the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::persistence::LAYOUT_KEY;

/// Settings that select the document store and logging verbosity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory backing the file document store
    pub store_dir: PathBuf,
    /// Store key of the layout document
    pub layout_key: String,
    /// Default tracing filter, overridden by `RUST_LOG`
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from("site-data"),
            layout_key: LAYOUT_KEY.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Save settings to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize settings to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write settings to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load settings from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings from {:?}", path.as_ref()))?;

        let settings: Self =
            serde_json::from_str(&content).context("Failed to parse settings JSON")?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings that cannot address a document
    pub fn validate(&self) -> Result<()> {
        if self.layout_key.trim().is_empty() {
            anyhow::bail!("layout_key must not be empty");
        }
        if self.store_dir.as_os_str().is_empty() {
            anyhow::bail!("store_dir must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.layout_key, "site/layout");
        assert_eq!(settings.store_dir, PathBuf::from("site-data"));
        assert_eq!(settings.log_level, "info");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(br#"{ "store_dir": "/srv/site" }"#)
            .unwrap();
        temp_file.flush().unwrap();

        let settings = Settings::load_from_file(temp_file.path()).unwrap();
        assert_eq!(settings.store_dir, PathBuf::from("/srv/site"));
        assert_eq!(settings.layout_key, "site/layout");
    }

    #[test]
    fn test_roundtrip_save_load() {
        let temp_file = NamedTempFile::new().unwrap();
        let settings = Settings {
            store_dir: PathBuf::from("/tmp/store"),
            layout_key: "site/landing".to_string(),
            log_level: "debug".to_string(),
        };

        settings.save_to_file(temp_file.path()).unwrap();
        let loaded = Settings::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Settings::load_from_file(Path::new("/nonexistent/settings.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_json() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"{ invalid json }").unwrap();
        temp_file.flush().unwrap();

        assert!(Settings::load_from_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_empty_key_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(br#"{ "layout_key": "  " }"#).unwrap();
        temp_file.flush().unwrap();

        let err = Settings::load_from_file(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("layout_key"));
    }
}

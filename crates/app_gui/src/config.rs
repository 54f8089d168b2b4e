//! Settings persistence for the endpoint and widget options.

use anyhow::{Context, Result};
use directories_next::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Widget configuration, persisted as TOML in the platform config dir.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the detection service.
    pub endpoint: String,
    /// Whether a detected result links to the server's analysis page.
    pub show_detail_link: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5000".to_string(),
            show_detail_link: true,
        }
    }
}

fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("io", "firewatch", "FireWatch")
        .map(|dirs| dirs.config_dir().join("settings.toml"))
}

impl Settings {
    /// Load from the platform config dir, falling back to defaults when the
    /// file is missing or malformed.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                if path.exists() {
                    tracing::warn!("could not load settings from {}: {e:#}", path.display());
                }
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("cannot read settings: {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("invalid settings: {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        let path = config_path().context("no config directory available")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)?;
        fs::write(path, raw).with_context(|| format!("cannot write settings: {}", path.display()))
    }

    /// Endpoint with any trailing slash removed.
    pub fn endpoint_base(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn settings_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("settings.toml");
        let settings = Settings {
            endpoint: "http://detector.local:5000".to_string(),
            show_detail_link: false,
        };

        settings.save_to(&path)?;
        assert_eq!(Settings::load_from(&path)?, settings);
        Ok(())
    }

    #[test]
    fn malformed_settings_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "endpoint = [not toml").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "endpoint = \"http://other:5000\"\n")?;

        let settings = Settings::load_from(&path)?;
        assert_eq!(settings.endpoint, "http://other:5000");
        assert!(settings.show_detail_link);
        Ok(())
    }

    #[test]
    fn endpoint_base_trims_trailing_slash() {
        let settings = Settings {
            endpoint: "http://127.0.0.1:5000/".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.endpoint_base(), "http://127.0.0.1:5000");
    }
}

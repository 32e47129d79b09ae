//! Client configuration: backend URL and display preference.
//!
//! Stored as TOML in the platform config directory
//! (`~/.config/dropdesk/config.toml` on Linux). `DROPDESK_CONFIG_DIR`
//! overrides the directory, `DROPDESK_API_URL` overrides the backend URL
//! without touching the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::theme::Theme;

/// Backend used when neither the config file nor the environment names one.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Base URL of the drop-off backend REST API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Persisted light/dark preference. Absent means "follow the terminal".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

impl Config {
    /// Resolve the config directory, creating it if needed.
    pub fn dir() -> Result<PathBuf> {
        let dir = match std::env::var_os("DROPDESK_CONFIG_DIR") {
            Some(d) => PathBuf::from(d),
            None => directories::ProjectDirs::from("", "", "dropdesk")
                .context("cannot determine a config directory for this platform")?
                .config_dir()
                .to_path_buf(),
        };
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating config directory {}", dir.display()))?;
        Ok(dir)
    }

    /// Load from `dir`, returning defaults when no file exists yet.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        match std::fs::read_to_string(&path) {
            Ok(raw) => toml::from_str(&raw)
                .with_context(|| format!("parsing {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = dir.join(CONFIG_FILE);
        let raw = toml::to_string_pretty(self).context("serializing config")?;
        std::fs::write(&path, raw).with_context(|| format!("writing {}", path.display()))
    }

    /// Effective backend URL: env override, then config, then the default.
    pub fn api_url(&self) -> String {
        std::env::var("DROPDESK_API_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Effective theme: the persisted flag, else the terminal preference.
    pub fn effective_theme(&self) -> Theme {
        self.theme.unwrap_or_else(Theme::system_preference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load(tmp.path()).unwrap();
        assert!(config.api_url.is_none());
        assert!(config.theme.is_none());
    }

    #[test]
    fn theme_round_trips_across_reload() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::load(tmp.path()).unwrap();
        config.theme = Some(Theme::Dark);
        config.save(tmp.path()).unwrap();

        // Simulated restart: fresh read from disk.
        let reloaded = Config::load(tmp.path()).unwrap();
        assert_eq!(reloaded.theme, Some(Theme::Dark));
        assert_eq!(reloaded.effective_theme(), Theme::Dark);
    }

    #[test]
    fn api_url_falls_back_to_default() {
        let config = Config::default();
        // Only meaningful when the env override is not set.
        if std::env::var_os("DROPDESK_API_URL").is_none() {
            assert_eq!(config.api_url(), DEFAULT_API_URL);
        }
    }

    #[test]
    fn api_url_prefers_config_file_value() {
        let tmp = TempDir::new().unwrap();
        let config = Config {
            api_url: Some("https://shop.example/api".into()),
            theme: None,
        };
        config.save(tmp.path()).unwrap();
        let reloaded = Config::load(tmp.path()).unwrap();
        if std::env::var_os("DROPDESK_API_URL").is_none() {
            assert_eq!(reloaded.api_url(), "https://shop.example/api");
        }
    }

    #[test]
    fn unparseable_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("config.toml"), "api_url = [not toml").unwrap();
        assert!(Config::load(tmp.path()).is_err());
    }
}

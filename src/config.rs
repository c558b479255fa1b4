//! Application paths and persisted editor settings.
//!
//! # Paths
//!
//! Priority for the config/data directory:
//! 1. CLI `--config-dir` argument
//! 2. `STORYLINE_CONFIG_DIR` environment variable
//! 3. Local folder IF `storyline.json` or `storyline.log` exist there
//! 4. Platform directory from dirs-next (`~/.config/storyline`, `~/.local/share/storyline`, ...)
//!
//! # Settings
//!
//! `storyline.json` holds [`EditorSettings`]. Missing fields take defaults and
//! every value is clamped into its legal range after loading. The backend URL
//! can be overridden by `STORYLINE_BACKEND_URL` and then by `--backend`.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::coords::{DEFAULT_PIXELS_PER_SECOND, MAX_PIXELS_PER_SECOND, MIN_PIXELS_PER_SECOND};
use crate::core::interaction::{MAX_PANEL_HEIGHT, MIN_PANEL_HEIGHT};

pub const APP_NAME: &str = "storyline";
pub const SETTINGS_FILE: &str = "storyline.json";
pub const LOG_FILE: &str = "storyline.log";
pub const CONFIG_DIR_ENV: &str = "STORYLINE_CONFIG_DIR";
pub const BACKEND_URL_ENV: &str = "STORYLINE_BACKEND_URL";
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:17493";

/// Configuration for overriding default application paths
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    /// Custom config directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Priority: CLI args → ENV var → None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from));
        Self { config_dir }
    }
}

pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::config_dir()).join(name)
}

pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::data_dir()).join(name)
}

/// Create config and data directories if missing.
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let config_dir = resolve_dir(config, dirs_next::config_dir());
    let data_dir = resolve_dir(config, dirs_next::data_dir());
    for dir in [&config_dir, &data_dir] {
        if !dir.exists() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
    }
    Ok(())
}

fn has_local_files(dir: &Path) -> bool {
    [SETTINGS_FILE, LOG_FILE].iter().any(|f| dir.join(f).exists())
}

fn resolve_dir(config: &PathConfig, platform_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }
    if let Ok(current_dir) = std::env::current_dir() {
        if has_local_files(&current_dir) {
            return current_dir;
        }
    }
    platform_dir
        .map(|d| d.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Persisted editor preferences.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub backend_url: String,
    pub pixels_per_second: f64,
    pub timeline_height: f64,
    /// How long a toast stays on screen.
    pub notification_secs: u64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            pixels_per_second: DEFAULT_PIXELS_PER_SECOND,
            timeline_height: 200.0,
            notification_secs: 5,
        }
    }
}

impl EditorSettings {
    /// Load from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        let mut settings: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid settings file: {}", path.display()))?;
        settings.sanitize();
        info!("settings loaded from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, raw)
            .with_context(|| format!("Failed to write settings: {}", path.display()))?;
        debug!("settings saved to {}", path.display());
        Ok(())
    }

    /// Apply `STORYLINE_BACKEND_URL`, then the CLI value.
    pub fn apply_overrides(&mut self, env_url: Option<String>, cli_url: Option<String>) {
        if let Some(url) = cli_url.or(env_url).filter(|u| !u.trim().is_empty()) {
            self.backend_url = url.trim().to_string();
        }
    }

    fn sanitize(&mut self) {
        if !self.pixels_per_second.is_finite() {
            self.pixels_per_second = DEFAULT_PIXELS_PER_SECOND;
        }
        self.pixels_per_second = self.pixels_per_second.clamp(MIN_PIXELS_PER_SECOND, MAX_PIXELS_PER_SECOND);
        if !self.timeline_height.is_finite() {
            self.timeline_height = Self::default().timeline_height;
        }
        self.timeline_height = self.timeline_height.clamp(MIN_PANEL_HEIGHT, MAX_PANEL_HEIGHT);
        self.notification_secs = self.notification_secs.max(1);
        if self.backend_url.trim().is_empty() {
            self.backend_url = DEFAULT_BACKEND_URL.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("storyline_test_{name}_{}", std::process::id()));
        let _ = std::fs::create_dir_all(&dir);
        dir
    }

    #[test]
    fn test_config_file_with_custom_dir() {
        let config = PathConfig { config_dir: Some(PathBuf::from("/custom")) };
        assert_eq!(config_file("test.json", &config), PathBuf::from("/custom/test.json"));
        assert_eq!(data_file(LOG_FILE, &config), PathBuf::from("/custom/storyline.log"));
    }

    #[test]
    fn test_missing_settings_yield_defaults() {
        let path = temp_dir("missing").join("nope.json");
        assert_eq!(EditorSettings::load(&path).unwrap(), EditorSettings::default());
    }

    #[test]
    fn test_partial_settings_are_clamped() {
        let dir = temp_dir("partial");
        let path = dir.join(SETTINGS_FILE);
        std::fs::write(&path, r#"{ "pixels_per_second": 900, "timeline_height": 10 }"#).unwrap();
        let settings = EditorSettings::load(&path).unwrap();
        assert_eq!(settings.pixels_per_second, MAX_PIXELS_PER_SECOND);
        assert_eq!(settings.timeline_height, MIN_PANEL_HEIGHT);
        assert_eq!(settings.backend_url, DEFAULT_BACKEND_URL);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_save_load_roundtrip_and_bad_json() {
        let dir = temp_dir("roundtrip");
        let path = dir.join(SETTINGS_FILE);
        let settings = EditorSettings { backend_url: "http://example:1".into(), ..Default::default() };
        settings.save(&path).unwrap();
        assert_eq!(EditorSettings::load(&path).unwrap(), settings);

        std::fs::write(&path, "{ not json").unwrap();
        assert!(EditorSettings::load(&path).is_err());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_overrides_priority() {
        let mut settings = EditorSettings::default();
        settings.apply_overrides(Some("http://env:1".into()), None);
        assert_eq!(settings.backend_url, "http://env:1");
        settings.apply_overrides(Some("http://env:1".into()), Some("http://cli:2".into()));
        assert_eq!(settings.backend_url, "http://cli:2");
        settings.apply_overrides(None, Some("  ".into()));
        assert_eq!(settings.backend_url, "http://cli:2");
    }
}

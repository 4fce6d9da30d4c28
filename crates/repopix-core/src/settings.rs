//! # Settings Persistence
//!
//! Local presentation and access settings, stored as JSON under a fixed key
//! in the user's configuration directory. Nothing here touches the
//! repository.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{HostError, Result};

/// Key the settings are stored under.
pub const SETTINGS_KEY: &str = "github-image-host-settings";

/// Animation playback speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl fmt::Display for AnimationSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slow => write!(f, "slow"),
            Self::Normal => write!(f, "normal"),
            Self::Fast => write!(f, "fast"),
        }
    }
}

impl FromStr for AnimationSpeed {
    type Err = HostError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "slow" => Ok(Self::Slow),
            "normal" => Ok(Self::Normal),
            "fast" => Ok(Self::Fast),
            other => Err(HostError::Validation(format!(
                "unknown animation speed: {other}"
            ))),
        }
    }
}

/// User settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub enable_animations: bool,
    pub animation_speed: AnimationSpeed,
    pub enable_background: bool,
    /// Background opacity in `[0, 1]`.
    pub background_opacity: f64,
    pub background_image_url: Option<String>,
    /// Shared secret gating the application; `None` leaves it open.
    pub auth_code: Option<String>,
    pub two_factor_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_animations: true,
            animation_speed: AnimationSpeed::Normal,
            enable_background: true,
            background_opacity: 0.2,
            background_image_url: None,
            auth_code: None,
            two_factor_enabled: false,
        }
    }
}

impl Settings {
    /// Applies the fields present in `patch`.
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.enable_animations {
            self.enable_animations = v;
        }
        if let Some(v) = patch.animation_speed {
            self.animation_speed = v;
        }
        if let Some(v) = patch.enable_background {
            self.enable_background = v;
        }
        if let Some(v) = patch.background_opacity {
            self.background_opacity = v;
        }
        if let Some(v) = patch.background_image_url {
            self.background_image_url = v.filter(|url| !url.trim().is_empty());
        }
        if let Some(v) = patch.auth_code {
            self.auth_code = v.filter(|code| !code.is_empty());
        }
        if let Some(v) = patch.two_factor_enabled {
            self.two_factor_enabled = v;
        }
        self.sanitize();
    }

    fn sanitize(&mut self) {
        self.background_opacity = if self.background_opacity.is_finite() {
            self.background_opacity.clamp(0.0, 1.0)
        } else {
            Settings::default().background_opacity
        };
    }
}

/// A partial update. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub enable_animations: Option<bool>,
    pub animation_speed: Option<AnimationSpeed>,
    pub enable_background: Option<bool>,
    pub background_opacity: Option<f64>,
    pub background_image_url: Option<Option<String>>,
    pub auth_code: Option<Option<String>>,
    pub two_factor_enabled: Option<bool>,
}

/// Reads and writes [`Settings`] at a fixed file location.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// `<config_dir>/repopix/github-image-host-settings.json`.
    #[must_use]
    pub fn default_location() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::at(dir.join("repopix").join(format!("{SETTINGS_KEY}.json"))))
    }

    /// A store backed by `path`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads settings, falling back to defaults when the file is absent or
    /// cannot be parsed.
    #[must_use]
    pub fn load(&self) -> Settings {
        let path = &self.path;
        if !path.exists() {
            tracing::debug!(?path, "Settings file not found, using defaults");
            return Settings::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Settings>(&contents) {
                Ok(mut settings) => {
                    settings.sanitize();
                    tracing::debug!(?path, "Loaded settings");
                    settings
                }
                Err(e) => {
                    tracing::warn!(?path, error = %e, "Failed to parse settings, using defaults");
                    Settings::default()
                }
            },
            Err(e) => {
                tracing::warn!(?path, error = %e, "Failed to read settings, using defaults");
                Settings::default()
            }
        }
    }

    /// Writes `settings`, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Settings`] if the file cannot be written.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| HostError::Settings(format!("failed to create settings directory: {e}")))?;
        }

        let contents = serde_json::to_string_pretty(settings)
            .map_err(|e| HostError::Settings(format!("failed to serialize settings: {e}")))?;
        fs::write(&self.path, contents)
            .map_err(|e| HostError::Settings(format!("failed to write settings: {e}")))?;

        tracing::info!(path = ?self.path, "Saved settings");
        Ok(())
    }

    /// Loads, patches and saves, returning the new settings.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Settings`] if the file cannot be written.
    pub fn update(&self, patch: SettingsPatch) -> Result<Settings> {
        let mut settings = self.load();
        settings.apply(patch);
        self.save(&settings)?;
        Ok(settings)
    }

    /// Restores and saves the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Settings`] if the file cannot be written.
    pub fn reset(&self) -> Result<Settings> {
        let settings = Settings::default();
        self.save(&settings)?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> SettingsStore {
        SettingsStore::at(dir.path().join("nested").join("settings.json"))
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = store(&dir).load();

        assert_eq!(settings, Settings::default());
        assert!(settings.enable_animations);
        assert_eq!(settings.animation_speed, AnimationSpeed::Normal);
        assert!((settings.background_opacity - 0.2).abs() < f64::EPSILON);
        assert!(settings.auth_code.is_none());
    }

    #[test]
    fn test_malformed_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{not json").unwrap();

        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), r#"{"animationSpeed":"fast","backgroundOpacity":7}"#).unwrap();

        let settings = store.load();
        assert_eq!(settings.animation_speed, AnimationSpeed::Fast);
        assert!((settings.background_opacity - 1.0).abs() < f64::EPSILON);
        assert!(settings.enable_background);
    }

    #[test]
    fn test_save_uses_camel_case() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save(&Settings::default()).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"enableAnimations\": true"));
        assert!(raw.contains("\"twoFactorEnabled\": false"));
        assert!(raw.contains("\"backgroundImageUrl\": null"));
    }

    #[test]
    fn test_update_and_reset() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let updated = store
            .update(SettingsPatch {
                auth_code: Some(Some("hunter2".into())),
                background_opacity: Some(-3.0),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(updated.auth_code.as_deref(), Some("hunter2"));
        assert!(updated.background_opacity.abs() < f64::EPSILON);
        assert_eq!(store.load(), updated);

        let cleared = store
            .update(SettingsPatch {
                auth_code: Some(None),
                ..Default::default()
            })
            .unwrap();
        assert!(cleared.auth_code.is_none());

        assert_eq!(store.reset().unwrap(), Settings::default());
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn test_animation_speed_parse() {
        assert_eq!("FAST".parse::<AnimationSpeed>().unwrap(), AnimationSpeed::Fast);
        assert!("warp".parse::<AnimationSpeed>().is_err());
    }
}

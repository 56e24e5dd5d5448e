use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use photoss_common::{error::ConfigError, Display, PhotossError, Rect, Result, SettingsStore};

/// A display declared by hand, for setups where `swww` cannot enumerate outputs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DisplayConfig {
    pub name: String,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl DisplayConfig {
    pub fn to_display(&self) -> Display {
        Display {
            name: self.name.clone(),
            bounds: Rect {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
            },
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(invalid_value("display.name", &self.name));
        }
        if self.width == 0 || self.height == 0 {
            return Err(invalid_value(
                &format!("display '{}'", self.name),
                &format!("{}x{}", self.width, self.height),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct SettingsFile {
    #[serde(default)]
    settings: toml::Table,
    #[serde(default, rename = "display", skip_serializing_if = "Vec::is_empty")]
    displays: Vec<DisplayConfig>,
}

/// Settings persisted as TOML.
///
/// ```toml
/// [settings]
/// photopath = "/home/me/Pictures"
/// delay = "10"
/// imagediscoverymode = "ThisWeekInHistory"
///
/// [[display]]
/// name = "HDMI-A-1"
/// width = 1920
/// height = 1080
/// ```
#[derive(Debug)]
pub struct TomlSettingsStore {
    path: PathBuf,
    file: SettingsFile,
}

impl TomlSettingsStore {
    /// Opens the store at the default location.
    pub fn open() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from_path(&path)
    }

    /// Opens the store at `path`. A missing file is an empty store.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No settings file at {:?}, using defaults", path);
            return Ok(Self {
                path: path.to_path_buf(),
                file: SettingsFile::default(),
            });
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| PhotossError::Config(ConfigError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }))?;

        let file: SettingsFile = toml::from_str(&content)
            .map_err(|e| PhotossError::Config(ConfigError::TomlParse {
                message: e.to_string(),
            }))?;

        let store = Self {
            path: path.to_path_buf(),
            file,
        };
        store.validate()?;

        log::debug!("Loaded settings from {:?}", path);
        Ok(store)
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(PhotossError::Config(ConfigError::NoConfigDir))?
            .join("photoss");

        Ok(config_dir.join("settings.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn displays(&self) -> Vec<Display> {
        self.file.displays.iter().map(DisplayConfig::to_display).collect()
    }

    fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for display in &self.file.displays {
            display.validate()?;
            if !names.insert(display.name.as_str()) {
                return Err(invalid_value("display.name", &display.name));
            }
        }
        Ok(())
    }

    fn write(&self) -> Result<()> {
        let write_error = |e| PhotossError::Config(ConfigError::FileWrite {
            path: self.path.clone(),
            source: e,
        });

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }

        let content = toml::to_string_pretty(&self.file)
            .map_err(|e| PhotossError::Config(ConfigError::TomlParse {
                message: e.to_string(),
            }))?;

        std::fs::write(&self.path, content).map_err(write_error)?;
        log::debug!("Wrote settings to {:?}", self.path);
        Ok(())
    }
}

impl SettingsStore for TomlSettingsStore {
    fn load(&self, key: &str) -> Option<String> {
        match self.file.settings.get(key)? {
            toml::Value::String(s) => Some(s.clone()),
            toml::Value::Integer(i) => Some(i.to_string()),
            other => {
                log::warn!("Ignoring non-text setting {}: {}", key, other);
                None
            }
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        self.file
            .settings
            .insert(key.to_string(), toml::Value::String(value.to_string()));
        self.write()
    }
}

fn invalid_value(field: &str, value: &str) -> PhotossError {
    PhotossError::Config(ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use photoss_common::settings::{KEY_DELAY, KEY_DISCOVERY_MODE, KEY_PHOTO_PATH};
    use photoss_common::{DiscoveryMode, Settings};
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty_store() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("settings.toml");

        let store = TomlSettingsStore::load_from_path(&path).unwrap();

        assert_eq!(store.load(KEY_PHOTO_PATH), None);
        assert!(store.displays().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn test_load_settings_and_displays() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("settings.toml");
        let content = r#"
            [settings]
            photopath = "/srv/photos"
            delay = 10
            imagediscoverymode = "RandomSelection"

            [[display]]
            name = "left"
            x = -1920
            width = 1920
            height = 1080

            [[display]]
            name = "right"
            width = 2560
            height = 1440
        "#;
        fs::write(&path, content).unwrap();

        let store = TomlSettingsStore::load_from_path(&path).unwrap();

        assert_eq!(store.load(KEY_PHOTO_PATH).as_deref(), Some("/srv/photos"));
        assert_eq!(store.load(KEY_DELAY).as_deref(), Some("10"));

        let settings = Settings::load(&store);
        assert_eq!(settings.delay, Duration::from_secs(10));
        assert_eq!(settings.discovery_mode, DiscoveryMode::RandomSelection);

        let displays = store.displays();
        assert_eq!(displays.len(), 2);
        assert_eq!(displays[0].bounds.x, -1920);
        assert_eq!(displays[1].bounds.y, 0);
        assert_eq!(displays[1].name, "right");
    }

    #[test]
    fn test_save_creates_file_and_parent_dir() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("settings.toml");

        let mut store = TomlSettingsStore::load_from_path(&path).unwrap();
        store.save(KEY_DISCOVERY_MODE, "ThisWeekInHistory").unwrap();

        assert!(path.exists());
        let reopened = TomlSettingsStore::load_from_path(&path).unwrap();
        assert_eq!(
            reopened.load(KEY_DISCOVERY_MODE).as_deref(),
            Some("ThisWeekInHistory")
        );
    }

    #[test]
    fn test_save_keeps_declared_displays() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("settings.toml");
        fs::write(&path, "[[display]]\nname = \"only\"\nwidth = 800\nheight = 600\n").unwrap();

        let mut store = TomlSettingsStore::load_from_path(&path).unwrap();
        Settings {
            photo_path: Some(PathBuf::from("/home/me/Pictures")),
            ..Settings::default()
        }
        .save(&mut store)
        .unwrap();

        let reopened = TomlSettingsStore::load_from_path(&path).unwrap();
        assert_eq!(reopened.displays().len(), 1);
        assert_eq!(
            Settings::load(&reopened).photo_path,
            Some(PathBuf::from("/home/me/Pictures"))
        );
    }

    #[test]
    fn test_invalid_toml() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("settings.toml");
        fs::write(&path, "[settings\nphotopath = ").unwrap();

        match TomlSettingsStore::load_from_path(&path).unwrap_err() {
            PhotossError::Config(ConfigError::TomlParse { .. }) => {},
            other => panic!("Expected ConfigError::TomlParse, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_sized_display_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("settings.toml");
        fs::write(&path, "[[display]]\nname = \"bad\"\nwidth = 0\nheight = 600\n").unwrap();

        match TomlSettingsStore::load_from_path(&path).unwrap_err() {
            PhotossError::Config(ConfigError::InvalidValue { .. }) => {},
            other => panic!("Expected ConfigError::InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_display_names_are_rejected() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("settings.toml");
        let content = r#"
            [[display]]
            name = "DP-1"
            width = 800
            height = 600

            [[display]]
            name = "DP-1"
            width = 1024
            height = 768
        "#;
        fs::write(&path, content).unwrap();

        assert!(TomlSettingsStore::load_from_path(&path).is_err());
    }

    #[test]
    fn test_non_text_setting_is_ignored() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("settings.toml");
        fs::write(&path, "[settings]\ndelay = [1, 2]\n").unwrap();

        let store = TomlSettingsStore::load_from_path(&path).unwrap();
        assert_eq!(store.load(KEY_DELAY), None);
    }

    #[test]
    fn test_config_path_location() {
        if let Ok(path) = TomlSettingsStore::config_path() {
            assert!(path.ends_with("photoss/settings.toml"));
        }
    }
}

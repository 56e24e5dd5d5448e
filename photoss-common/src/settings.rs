use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::duration::{parse_delay, DEFAULT_DELAY};
use crate::error::{ConfigError, PhotossError};
use crate::image_discovery::DiscoveryMode;
use crate::Result;

pub const KEY_PHOTO_PATH: &str = "photopath";
pub const KEY_DELAY: &str = "delay";
pub const KEY_DISCOVERY_MODE: &str = "imagediscoverymode";

/// Durable key/value storage for settings.
pub trait SettingsStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub photo_path: Option<PathBuf>,
    pub delay: Duration,
    pub discovery_mode: DiscoveryMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            photo_path: None,
            delay: DEFAULT_DELAY,
            discovery_mode: DiscoveryMode::default(),
        }
    }
}

impl Settings {
    /// Reads all settings, replacing bad values with defaults.
    pub fn load(store: &dyn SettingsStore) -> Self {
        let photo_path = store
            .load(KEY_PHOTO_PATH)
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        let delay = match store.load(KEY_DELAY) {
            Some(raw) => parse_delay(&raw).unwrap_or_else(|e| {
                log::warn!("Ignoring delay setting {:?}: {}", raw, e);
                DEFAULT_DELAY
            }),
            None => DEFAULT_DELAY,
        };

        let discovery_mode = match store.load(KEY_DISCOVERY_MODE) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
                log::warn!("Ignoring discovery mode setting: {}", e);
                DiscoveryMode::default()
            }),
            None => DiscoveryMode::default(),
        };

        Self {
            photo_path,
            delay,
            discovery_mode,
        }
    }

    /// Writes every setting. An unset photo path is left untouched.
    pub fn save(&self, store: &mut dyn SettingsStore) -> Result<()> {
        if let Some(path) = &self.photo_path {
            store.save(KEY_PHOTO_PATH, &path.to_string_lossy())?;
        }
        store.save(KEY_DELAY, &self.delay.as_secs().to_string())?;
        store.save(KEY_DISCOVERY_MODE, self.discovery_mode.name())?;
        Ok(())
    }

    pub fn require_photo_path(&self) -> Result<&PathBuf> {
        self.photo_path
            .as_ref()
            .ok_or(PhotossError::Config(ConfigError::MissingPhotoPath))
    }
}

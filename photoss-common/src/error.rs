use std::path::PathBuf;
use thiserror::Error;

/// Main error type for photoss operations
#[derive(Error, Debug)]
pub enum PhotossError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Image discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Image decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Display error: {0}")]
    Display(#[from] DisplayError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Settings store errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No photo folder has been configured")]
    MissingPhotoPath,

    #[error("Failed to read settings file: {path:?}")]
    FileRead { path: PathBuf, source: std::io::Error },

    #[error("Failed to write settings file: {path:?}")]
    FileWrite { path: PathBuf, source: std::io::Error },

    #[error("Failed to parse TOML settings: {message}")]
    TomlParse { message: String },

    #[error("Invalid settings value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Image discovery errors
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Failed to read directory: {path:?}")]
    DirectoryRead { path: PathBuf, source: std::io::Error },

    #[error("No images found in directory: {path:?}")]
    NoImagesFound { path: PathBuf },

    #[error("No directory under {path:?} holds more than {min_files} files")]
    NoCandidateDirectories { path: PathBuf, min_files: usize },
}

/// Per-image decode errors. These never reach the user; the session retries.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to open image file: {path:?}")]
    Open { path: PathBuf, source: std::io::Error },

    #[error("Failed to decode image {path:?}: {message}")]
    Format { path: PathBuf, message: String },
}

/// Display enumeration errors
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("No displays found")]
    NoDisplays,

    #[error("Display query failed: {message}")]
    Query { message: String },

    #[error("Failed to show image on {display}: {message}")]
    Present { display: String, message: String },
}

/// Validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid delay: {delay}")]
    InvalidDelay { delay: String },

    #[error("Invalid discovery mode: {mode}")]
    InvalidDiscoveryMode { mode: String },
}

// Convenience type alias
pub type Result<T> = std::result::Result<T, PhotossError>;

// Error reporting utilities
pub trait ErrorReporting {
    fn log_error(&self, context: &str);
    fn user_friendly_message(&self) -> String;
}

impl ErrorReporting for PhotossError {
    fn log_error(&self, context: &str) {
        log::error!("{}: {:?}", context, self);
    }

    fn user_friendly_message(&self) -> String {
        match self {
            PhotossError::Config(ConfigError::MissingPhotoPath) => {
                "No folder with photos has been set. Run `photoss-cli set --photo-path <DIR>` to add your folder.".to_string()
            }
            PhotossError::Config(ConfigError::FileRead { path, .. }) => {
                format!("Settings file could not be read: {:?}", path)
            }
            PhotossError::Config(ConfigError::TomlParse { message }) => {
                format!("Invalid settings format: {}", message)
            }
            PhotossError::Discovery(DiscoveryError::DirectoryRead { path, .. }) => {
                format!("Photo folder not found: {:?}", path)
            }
            PhotossError::Discovery(DiscoveryError::NoImagesFound { path }) => {
                format!("No images found in directory: {:?}", path)
            }
            PhotossError::Display(DisplayError::NoDisplays) => {
                "No displays found. Start swww-daemon or declare [[display]] entries in the settings file.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

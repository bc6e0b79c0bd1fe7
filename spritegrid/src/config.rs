//! Persisted default settings in `config.ini`.
//!
//! ```ini
//! [layout]
//! x_offset = 0
//! y_offset = 0
//! x_padding = 0
//! y_padding = 0
//! width = 32
//! height = 32
//! columns = 4
//! rows = 4
//! auto_calc = false
//! gms_compatible = false
//! bundle_files = false
//! allow_empty = false
//!
//! [output]
//! directory =
//! ask_location = false
//! ```
//!
//! Missing keys keep their defaults, so an empty or absent file yields
//! [`ConfigFile::default`].

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use crate::layout::LayoutOptions;

/// Directory name under the platform config directory.
const APP_DIR: &str = "spritegrid";

/// Config file name.
const CONFIG_FILE: &str = "config.ini";

/// Errors that can occur while loading or changing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform has no config directory.
    #[error("Could not determine the configuration directory")]
    NoConfigDir,

    /// Reading or writing the file failed.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not valid INI.
    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// The key is not a known `section.key`.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// The value does not fit the key.
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: ConfigKey,
        value: String,
        reason: String,
    },
}

/// Where exported files go by default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSettings {
    /// Output directory. `None` means the current directory.
    pub directory: Option<PathBuf>,
    /// Ask for the output directory on every run.
    pub ask_location: bool,
}

/// Contents of `config.ini`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub layout: LayoutOptions,
    pub output: OutputSettings,
}

/// `<platform config dir>/spritegrid`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR))
}

/// `<platform config dir>/spritegrid/config.ini`.
pub fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

impl ConfigFile {
    /// Load from the default location, falling back to defaults if the file
    /// does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_file_path().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&path)
    }

    /// Load from `path`, falling back to defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(source) => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
            ini::Error::Parse(err) => ConfigError::Parse {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
        })?;

        let mut config = Self::default();
        for key in ConfigKey::ALL {
            if let Some(value) = ini.get_from(Some(key.section()), key.field()) {
                key.set(&mut config, value)?;
            }
        }
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = config_file_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::ALL {
            ini.with_section(Some(key.section()))
                .set(key.field(), key.get(self));
        }
        ini.write_to_file(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// A single setting, addressed as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    LayoutXOffset,
    LayoutYOffset,
    LayoutXPadding,
    LayoutYPadding,
    LayoutWidth,
    LayoutHeight,
    LayoutColumns,
    LayoutRows,
    LayoutAutoCalc,
    LayoutGmsCompatible,
    LayoutBundleFiles,
    LayoutAllowEmpty,
    OutputDirectory,
    OutputAskLocation,
}

impl ConfigKey {
    /// Every key, in file order.
    pub const ALL: [ConfigKey; 14] = [
        ConfigKey::LayoutXOffset,
        ConfigKey::LayoutYOffset,
        ConfigKey::LayoutXPadding,
        ConfigKey::LayoutYPadding,
        ConfigKey::LayoutWidth,
        ConfigKey::LayoutHeight,
        ConfigKey::LayoutColumns,
        ConfigKey::LayoutRows,
        ConfigKey::LayoutAutoCalc,
        ConfigKey::LayoutGmsCompatible,
        ConfigKey::LayoutBundleFiles,
        ConfigKey::LayoutAllowEmpty,
        ConfigKey::OutputDirectory,
        ConfigKey::OutputAskLocation,
    ];

    /// INI section.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::OutputDirectory | ConfigKey::OutputAskLocation => "output",
            _ => "layout",
        }
    }

    /// Key within the section.
    pub fn field(&self) -> &'static str {
        match self {
            ConfigKey::LayoutXOffset => "x_offset",
            ConfigKey::LayoutYOffset => "y_offset",
            ConfigKey::LayoutXPadding => "x_padding",
            ConfigKey::LayoutYPadding => "y_padding",
            ConfigKey::LayoutWidth => "width",
            ConfigKey::LayoutHeight => "height",
            ConfigKey::LayoutColumns => "columns",
            ConfigKey::LayoutRows => "rows",
            ConfigKey::LayoutAutoCalc => "auto_calc",
            ConfigKey::LayoutGmsCompatible => "gms_compatible",
            ConfigKey::LayoutBundleFiles => "bundle_files",
            ConfigKey::LayoutAllowEmpty => "allow_empty",
            ConfigKey::OutputDirectory => "directory",
            ConfigKey::OutputAskLocation => "ask_location",
        }
    }

    /// Current value as written to the file.
    pub fn get(&self, config: &ConfigFile) -> String {
        let layout = &config.layout;
        match self {
            ConfigKey::LayoutXOffset => layout.x_offset.to_string(),
            ConfigKey::LayoutYOffset => layout.y_offset.to_string(),
            ConfigKey::LayoutXPadding => layout.x_padding.to_string(),
            ConfigKey::LayoutYPadding => layout.y_padding.to_string(),
            ConfigKey::LayoutWidth => layout.width.to_string(),
            ConfigKey::LayoutHeight => layout.height.to_string(),
            ConfigKey::LayoutColumns => layout.columns.to_string(),
            ConfigKey::LayoutRows => layout.rows.to_string(),
            ConfigKey::LayoutAutoCalc => layout.auto_calc_spritesheet.to_string(),
            ConfigKey::LayoutGmsCompatible => layout.gms_compatible.to_string(),
            ConfigKey::LayoutBundleFiles => layout.bundle_files.to_string(),
            ConfigKey::LayoutAllowEmpty => layout.allow_empty.to_string(),
            ConfigKey::OutputDirectory => config
                .output
                .directory
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            ConfigKey::OutputAskLocation => config.output.ask_location.to_string(),
        }
    }

    /// Parse `value` and store it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the value does not parse, or
    /// if a cell size or count would be zero.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let layout = &mut config.layout;
        match self {
            ConfigKey::LayoutXOffset => layout.x_offset = self.parse_u32(value)?,
            ConfigKey::LayoutYOffset => layout.y_offset = self.parse_u32(value)?,
            ConfigKey::LayoutXPadding => layout.x_padding = self.parse_u32(value)?,
            ConfigKey::LayoutYPadding => layout.y_padding = self.parse_u32(value)?,
            ConfigKey::LayoutWidth => layout.width = self.parse_positive(value)?,
            ConfigKey::LayoutHeight => layout.height = self.parse_positive(value)?,
            ConfigKey::LayoutColumns => layout.columns = self.parse_positive(value)?,
            ConfigKey::LayoutRows => layout.rows = self.parse_positive(value)?,
            ConfigKey::LayoutAutoCalc => layout.auto_calc_spritesheet = self.parse_bool(value)?,
            ConfigKey::LayoutGmsCompatible => layout.gms_compatible = self.parse_bool(value)?,
            ConfigKey::LayoutBundleFiles => layout.bundle_files = self.parse_bool(value)?,
            ConfigKey::LayoutAllowEmpty => layout.allow_empty = self.parse_bool(value)?,
            ConfigKey::OutputDirectory => {
                config.output.directory = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            ConfigKey::OutputAskLocation => config.output.ask_location = self.parse_bool(value)?,
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidValue {
            key: *self,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    fn parse_u32(&self, value: &str) -> Result<u32, ConfigError> {
        value
            .parse()
            .map_err(|_| self.invalid(value, "expected a non-negative integer"))
    }

    fn parse_positive(&self, value: &str) -> Result<u32, ConfigError> {
        match self.parse_u32(value)? {
            0 => Err(self.invalid(value, "must be greater than zero")),
            n => Ok(n),
        }
    }

    fn parse_bool(&self, value: &str) -> Result<bool, ConfigError> {
        match value.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(self.invalid(value, "expected true or false")),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.field())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.to_string() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

//! Airlock settings loaded from an optional TOML file.
//!
//! Lookup order, first hit wins:
//!
//! 1. a path given explicitly (the `--settings` flag),
//! 2. the path in the `MODEL_AIRLOCK_SETTINGS` environment variable,
//! 3. `airlock.toml` in the platform configuration directory.
//!
//! A file named by (1) or (2) must exist. A missing file at (3) yields the
//! defaults. Every field is optional:
//!
//! ```toml
//! max_tensor_volume = 10000000
//!
//! [transfer]
//! endpoint = "http://localhost:9000"
//! timeout_secs = 30
//! ```

use crate::dirs::BaseDirs;
use crate::logic::MAX_TENSOR_VOLUME;
use camino::Utf8Path;
use log::debug;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming a settings file.
pub const SETTINGS_ENV_VAR: &str = "MODEL_AIRLOCK_SETTINGS";

/// File name looked up in the platform configuration directory.
pub const SETTINGS_FILE_NAME: &str = "airlock.toml";

/// Errors arising from settings discovery and parsing.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings file {path}: {source}")]
    Read {
        /// Path to the settings file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The settings file is not valid TOML or has unknown keys.
    #[error("invalid settings file {path}: {reason}")]
    Parse {
        /// Path to the settings file.
        path: PathBuf,
        /// The decoder's description of the problem.
        reason: String,
    },

    /// A setting has an unusable value.
    #[error("invalid setting {field}: {reason}")]
    Invalid {
        /// Dotted name of the setting.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Top-level airlock settings.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AirlockSettings {
    /// Ceiling on the volume of any single input tensor.
    #[serde(default = "AirlockSettings::default_max_tensor_volume")]
    pub max_tensor_volume: u64,
    /// Upload sink settings.
    pub transfer: TransferSettings,
}

impl AirlockSettings {
    const fn default_max_tensor_volume() -> u64 {
        MAX_TENSOR_VOLUME
    }

    /// Resolve and load settings using the documented lookup order.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] when an explicitly named file is missing,
    /// when any file found is malformed, or when a value is out of range.
    pub fn load(explicit: Option<&Utf8Path>, dirs: &dyn BaseDirs) -> Result<Self, SettingsError> {
        if let Some(path) = explicit {
            return Self::load_from(path.as_std_path());
        }
        if let Some(path) = std::env::var_os(SETTINGS_ENV_VAR).filter(|value| !value.is_empty()) {
            return Self::load_from(&PathBuf::from(path));
        }
        match default_settings_path(dirs) {
            Some(path) if path.is_file() => Self::load_from(&path),
            _ => {
                debug!(target: "settings", "no settings file found; using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load settings from a specific file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Read`] if the file cannot be read and the
    /// errors of [`Self::from_toml`] otherwise.
    pub fn load_from(path: &std::path::Path) -> Result<Self, SettingsError> {
        debug!(target: "settings", "loading settings from {}", path.display());
        let source = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&source).map_err(|err| match err {
            SettingsError::Parse { reason, .. } => SettingsError::Parse {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    /// Parse and validate settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Parse`] for malformed TOML or unknown keys and
    /// [`SettingsError::Invalid`] for out-of-range values.
    ///
    /// # Examples
    ///
    /// ```
    /// use model_airlock::settings::AirlockSettings;
    ///
    /// let settings = AirlockSettings::from_toml("max_tensor_volume = 500\n")
    ///     .expect("valid settings");
    /// assert_eq!(settings.max_tensor_volume, 500);
    /// assert_eq!(settings.transfer.timeout_secs, 30);
    /// ```
    pub fn from_toml(source: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(source).map_err(|err| SettingsError::Parse {
            path: PathBuf::from("<inline>"),
            reason: err.message().to_owned(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check value ranges that the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_tensor_volume == 0 {
            return Err(SettingsError::Invalid {
                field: "max_tensor_volume",
                reason: "must be greater than zero".to_owned(),
            });
        }
        if self.transfer.timeout_secs == 0 {
            return Err(SettingsError::Invalid {
                field: "transfer.timeout_secs",
                reason: "must be greater than zero".to_owned(),
            });
        }
        if let Some(endpoint) = self.transfer.endpoint.as_deref() {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(SettingsError::Invalid {
                    field: "transfer.endpoint",
                    reason: format!("expected an http:// or https:// URL, got \"{endpoint}\""),
                });
            }
        }
        Ok(())
    }
}

impl Default for AirlockSettings {
    fn default() -> Self {
        Self {
            max_tensor_volume: Self::default_max_tensor_volume(),
            transfer: TransferSettings::default(),
        }
    }
}

/// Settings for the HTTP upload sink.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TransferSettings {
    /// Base URL of the object store; `--endpoint` takes precedence.
    pub endpoint: Option<String>,
    /// Whole-request timeout in seconds.
    #[serde(default = "TransferSettings::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl TransferSettings {
    const fn default_timeout_secs() -> u64 {
        30
    }

    /// Return the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

/// Return the settings path in the platform configuration directory.
#[must_use]
pub fn default_settings_path(dirs: &dyn BaseDirs) -> Option<PathBuf> {
    dirs.config_dir().map(|dir| dir.join(SETTINGS_FILE_NAME))
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;

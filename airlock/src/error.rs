//! Error types for the model airlock.
//!
//! Every failure the pipeline or the transfer step can produce is a variant
//! of [`AirlockError`]. Variants keep the offending path or field so that
//! the console message alone is enough to locate the problem.

use crate::logic::LogicError;
use crate::manifest::SchemaError;
use crate::settings::SettingsError;
use crate::sniff::{FormatError, ModelFormat};
use crate::transfer::TransferError;
use camino::Utf8PathBuf;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors that can occur while admitting or transferring an artefact.
#[derive(Debug, Error)]
pub enum AirlockError {
    /// The model artefact does not exist or is not a regular file.
    #[error("Model file not found: {path}")]
    ArtifactNotFound {
        /// Path that was checked.
        path: Utf8PathBuf,
    },

    /// The manifest document could not be read.
    #[error("Error reading file {path}: {source}")]
    ConfigRead {
        /// Path to the manifest document.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The manifest document is not valid JSON.
    #[error("Error reading file {path}: {source}")]
    ConfigSyntax {
        /// Path to the manifest document.
        path: Utf8PathBuf,
        /// The underlying decoder error.
        source: serde_json::Error,
    },

    /// The manifest is structurally invalid.
    #[error("Schema Validation Failed: {0}")]
    Schema(#[from] SchemaError),

    /// The manifest violates a numeric constraint.
    #[error("Logic Check Failed: {0}")]
    Logic(#[from] LogicError),

    /// The artefact bytes do not match its claimed format.
    #[error("Model Validation Failed: File Signature Mismatch: {0}")]
    Format(#[from] FormatError),

    /// The artefact extension is not in the signature table.
    #[error("Model Validation Failed: Unsupported model file type: {extension}")]
    UnsupportedFormat {
        /// The extension as it appears on the file name, or `(none)`.
        extension: String,
    },

    /// The artefact is shorter than its signature check requires.
    #[error("artefact {path} is too short for a {format} signature check (needs {required} byte(s))")]
    ArtifactTooShort {
        /// Path to the artefact.
        path: Utf8PathBuf,
        /// The format being checked.
        format: ModelFormat,
        /// Number of bytes the check reads.
        required: usize,
    },

    /// The artefact could not be opened or read.
    #[error("failed to read artefact {path}: {source}")]
    ArtifactRead {
        /// Path to the artefact.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Uploading an admitted artefact failed.
    #[error("Upload Failed: {0}")]
    Transfer(#[from] TransferError),

    /// The settings file is unusable.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl AirlockError {
    /// Map the error onto its reporting category.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8PathBuf;
    /// use model_airlock::error::{AirlockError, ErrorCategory};
    ///
    /// let err = AirlockError::ArtifactNotFound { path: Utf8PathBuf::from("model.pt") };
    /// assert_eq!(err.category(), ErrorCategory::Io);
    /// ```
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ArtifactNotFound { .. }
            | Self::ConfigRead { .. }
            | Self::ConfigSyntax { .. }
            | Self::ArtifactTooShort { .. }
            | Self::ArtifactRead { .. } => ErrorCategory::Io,
            Self::Schema(_) => ErrorCategory::Schema,
            Self::Logic(_) => ErrorCategory::Logic,
            Self::Format(_) => ErrorCategory::Format,
            Self::UnsupportedFormat { .. } => ErrorCategory::UnsupportedFormat,
            Self::Transfer(_) => ErrorCategory::Transfer,
            Self::Settings(_) => ErrorCategory::Configuration,
        }
    }
}

/// Coarse classification of an [`AirlockError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// An artefact or manifest could not be read.
    Io,
    /// The manifest is structurally invalid.
    Schema,
    /// The manifest violates a numeric constraint.
    Logic,
    /// The artefact bytes contradict the claimed format.
    Format,
    /// The artefact extension is not supported.
    UnsupportedFormat,
    /// The upload sink failed.
    Transfer,
    /// The airlock settings are unusable.
    Configuration,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Io => "io",
            Self::Schema => "schema",
            Self::Logic => "logic",
            Self::Format => "format",
            Self::UnsupportedFormat => "unsupported_format",
            Self::Transfer => "transfer",
            Self::Configuration => "configuration",
        };
        f.write_str(name)
    }
}

/// Result type alias for airlock operations.
pub type Result<T> = std::result::Result<T, AirlockError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::FieldError;
    use rstest::rstest;

    #[rstest]
    #[case::missing(
        AirlockError::ArtifactNotFound { path: Utf8PathBuf::from("m.pt") },
        ErrorCategory::Io
    )]
    #[case::schema(
        AirlockError::Schema(SchemaError::new(vec![FieldError::new("version", "field required")])),
        ErrorCategory::Schema
    )]
    #[case::logic(
        AirlockError::Logic(LogicError::VolumeOverflow { tensor: "in".to_owned(), ceiling: 1 }),
        ErrorCategory::Logic
    )]
    #[case::format(
        AirlockError::Format(FormatError::OnnxIrVersion { found: 0 }),
        ErrorCategory::Format
    )]
    #[case::unsupported(
        AirlockError::UnsupportedFormat { extension: ".h5".to_owned() },
        ErrorCategory::UnsupportedFormat
    )]
    #[case::too_short(
        AirlockError::ArtifactTooShort {
            path: Utf8PathBuf::from("m.pkl"),
            format: ModelFormat::Pickle,
            required: 1,
        },
        ErrorCategory::Io
    )]
    fn categories_follow_taxonomy(#[case] err: AirlockError, #[case] expected: ErrorCategory) {
        assert_eq!(err.category(), expected);
    }

    #[test]
    fn format_error_message_keeps_signature_prefix() {
        let err = AirlockError::Format(FormatError::PickleStart { found: b'X' });
        assert!(err.to_string().contains("File Signature Mismatch"));
        assert!(err.to_string().contains("PROTO opcode"));
    }

    #[test]
    fn logic_error_message_names_tensor() {
        let err = AirlockError::Logic(LogicError::VolumeExceeded {
            tensor: "image".to_owned(),
            volume: 11,
            ceiling: 10,
        });
        assert_eq!(
            err.to_string(),
            "Logic Check Failed: Tensor image exceeds max volume (11 > 10)"
        );
    }
}

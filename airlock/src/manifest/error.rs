//! Error types for manifest construction and schema validation.
//!
//! Newtype constructors report a single [`ManifestError`]. The document
//! walker in [`super::parser`] collects one [`FieldError`] per offending
//! field and returns them together as a [`SchemaError`].

use std::fmt;
use thiserror::Error;

/// Errors arising from invalid manifest values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    /// The version string is not three dot-separated integers.
    #[error("invalid version \"{value}\": {reason}")]
    InvalidVersion {
        /// The rejected version string.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// A tensor declares a zero-sized dimension.
    #[error("dimension {index} of tensor \"{tensor}\" must be a positive integer, got 0")]
    ZeroDimension {
        /// Name of the offending tensor.
        tensor: String,
        /// Position of the dimension within `dims`.
        index: usize,
    },
}

/// A single structural problem located by its field path.
///
/// Paths use dotted member access and bracketed indices, for example
/// `input_tensors[0].dims[2]`. The document root is `$`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    path: String,
    reason: String,
}

impl FieldError {
    /// Create a field error for `path`.
    #[must_use]
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Return the path of the offending field.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Return the reason the field was rejected.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// Every structural problem found in a manifest document.
///
/// # Examples
///
/// ```
/// use model_airlock::manifest::error::{FieldError, SchemaError};
///
/// let err = SchemaError::new(vec![
///     FieldError::new("version", "field required"),
///     FieldError::new("input_tensors[0].dims[1]", "must be a positive integer, got -1"),
/// ]);
/// assert_eq!(err.errors().len(), 2);
/// assert!(err.to_string().contains("version: field required"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} schema error(s): {}", .errors.len(), render_errors(.errors))]
pub struct SchemaError {
    errors: Vec<FieldError>,
}

impl SchemaError {
    /// Wrap a list of field errors.
    #[must_use]
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Return the collected field errors in document order.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Return whether any error was recorded against `path`.
    #[must_use]
    pub fn mentions(&self, path: &str) -> bool {
        self.errors.iter().any(|error| error.path == path)
    }
}

fn render_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_error_display_joins_path_and_reason() {
        let err = FieldError::new("author_email", "expected a string, found number");
        assert_eq!(err.to_string(), "author_email: expected a string, found number");
    }

    #[test]
    fn schema_error_counts_and_lists_every_field() {
        let err = SchemaError::new(vec![
            FieldError::new("model_name", "field required"),
            FieldError::new("framework", "field required"),
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("2 schema error(s)"));
        assert!(msg.contains("model_name: field required; framework: field required"));
    }

    #[test]
    fn mentions_matches_exact_paths_only() {
        let err = SchemaError::new(vec![FieldError::new("input_tensors[0].dims[1]", "bad")]);
        assert!(err.mentions("input_tensors[0].dims[1]"));
        assert!(!err.mentions("input_tensors[0]"));
    }

    #[test]
    fn zero_dimension_names_tensor_and_index() {
        let err = ManifestError::ZeroDimension {
            tensor: "image".to_owned(),
            index: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("image"));
        assert!(msg.contains("dimension 2"));
    }
}

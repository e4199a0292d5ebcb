//! Model version newtype.
//!
//! A version is three dot-separated runs of ASCII digits (`1.0.0`,
//! `2.10.3`). Leading zeros and arbitrarily long components are accepted;
//! the value is kept as text because it only ever feeds the deployment key.

use super::error::ManifestError;
use serde::Serialize;
use std::fmt;

/// Number of dot-separated components in a model version.
const COMPONENTS: usize = 3;

/// A validated `MAJOR.MINOR.PATCH` model version.
///
/// # Examples
///
/// ```
/// use model_airlock::manifest::version::ModelVersion;
///
/// let version = ModelVersion::try_from("1.0.0").expect("valid version");
/// assert_eq!(version.as_str(), "1.0.0");
/// assert!(ModelVersion::try_from("v1.0").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ModelVersion(String);

impl ModelVersion {
    /// Return the version as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ModelVersion {
    type Error = ManifestError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        validate_version(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for ModelVersion {
    type Error = ManifestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_version(&value)?;
        Ok(Self(value))
    }
}

impl AsRef<str> for ModelVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate that `value` matches `^\d+\.\d+\.\d+$` over ASCII digits.
fn validate_version(value: &str) -> Result<(), ManifestError> {
    let invalid = |reason: String| ManifestError::InvalidVersion {
        value: value.to_owned(),
        reason,
    };

    let components: Vec<&str> = value.split('.').collect();
    if components.len() != COMPONENTS {
        return Err(invalid(format!(
            "expected {COMPONENTS} dot-separated components, got {}",
            components.len()
        )));
    }
    for (position, component) in components.iter().enumerate() {
        if component.is_empty() {
            return Err(invalid(format!("component {position} is empty")));
        }
        if let Some(bad) = component.chars().find(|c| !c.is_ascii_digit()) {
            return Err(invalid(format!("non-digit character '{bad}'")));
        }
    }
    Ok(())
}

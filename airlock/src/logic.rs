//! Numeric constraint checks over a parsed manifest.
//!
//! Only input tensors are bounded: their volume (the product of all
//! dimensions) models what the serving hardware must ingest per request.
//! Output tensors are not checked.
//!
//! The check is fail-fast: the first input tensor over the ceiling, in
//! declared order, is reported and later tensors are not examined.

use crate::manifest::ModelManifest;
use std::fmt;
use thiserror::Error;

/// Reference ceiling on the volume of any single input tensor.
pub const MAX_TENSOR_VOLUME: u64 = 10_000_000;

/// A manifest that is structurally valid but violates a numeric constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogicError {
    /// An input tensor's volume is above the ceiling.
    #[error("Tensor {tensor} exceeds max volume ({volume} > {ceiling})")]
    VolumeExceeded {
        /// Name of the offending tensor.
        tensor: String,
        /// Product of the tensor's dimensions.
        volume: u128,
        /// The configured ceiling.
        ceiling: u64,
    },

    /// An input tensor's volume does not fit in 128 bits.
    #[error("Tensor {tensor} exceeds max volume (volume overflows u128 > {ceiling})")]
    VolumeOverflow {
        /// Name of the offending tensor.
        tensor: String,
        /// The configured ceiling.
        ceiling: u64,
    },
}

impl LogicError {
    /// Return the name of the offending tensor.
    #[must_use]
    pub fn tensor(&self) -> &str {
        match self {
            Self::VolumeExceeded { tensor, .. } | Self::VolumeOverflow { tensor, .. } => tensor,
        }
    }
}

/// Summary of a passed constraint check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstraintReport {
    /// Number of input tensors examined.
    pub tensors_checked: usize,
    /// The ceiling they were checked against.
    pub ceiling: u64,
}

impl fmt::Display for ConstraintReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Math validation passed ({} input tensor(s) within volume {})",
            self.tensors_checked, self.ceiling
        )
    }
}

/// Product of `dims`, or `None` if it overflows `u128`.
///
/// An empty shape (a scalar) has volume 1.
///
/// # Examples
///
/// ```
/// use model_airlock::logic::tensor_volume;
///
/// assert_eq!(tensor_volume(&[1, 3, 224, 224]), Some(150_528));
/// assert_eq!(tensor_volume(&[]), Some(1));
/// assert_eq!(tensor_volume(&[u64::MAX, u64::MAX, u64::MAX]), None);
/// ```
#[must_use]
pub fn tensor_volume(dims: &[u64]) -> Option<u128> {
    dims.iter()
        .try_fold(1_u128, |volume, &dim| volume.checked_mul(u128::from(dim)))
}

/// Check every input tensor against [`MAX_TENSOR_VOLUME`].
///
/// # Errors
///
/// Returns a [`LogicError`] naming the first input tensor over the ceiling.
pub fn check_constraints(manifest: &ModelManifest) -> Result<ConstraintReport, LogicError> {
    check_constraints_with(manifest, MAX_TENSOR_VOLUME)
}

/// Check every input tensor against a caller-supplied ceiling.
///
/// # Errors
///
/// Returns a [`LogicError`] naming the first input tensor over `ceiling`.
pub fn check_constraints_with(
    manifest: &ModelManifest,
    ceiling: u64,
) -> Result<ConstraintReport, LogicError> {
    for tensor in manifest.input_tensors() {
        match tensor_volume(tensor.dims()) {
            Some(volume) if volume > u128::from(ceiling) => {
                return Err(LogicError::VolumeExceeded {
                    tensor: tensor.name().to_owned(),
                    volume,
                    ceiling,
                });
            }
            Some(_) => {}
            None => {
                return Err(LogicError::VolumeOverflow {
                    tensor: tensor.name().to_owned(),
                    ceiling,
                });
            }
        }
    }
    Ok(ConstraintReport {
        tensors_checked: manifest.input_tensors().len(),
        ceiling,
    })
}

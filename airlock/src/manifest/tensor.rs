//! Tensor shape declarations.

use super::error::ManifestError;
use serde::Serialize;

/// A named tensor with a fixed shape and element type.
///
/// Every dimension is strictly positive; a zero-sized dimension is rejected
/// at construction time rather than by later logic checks.
///
/// # Examples
///
/// ```
/// use model_airlock::manifest::tensor::TensorSpec;
///
/// let spec = TensorSpec::new("image", vec![1, 3, 224, 224], "float32")
///     .expect("positive dims");
/// assert_eq!(spec.dims(), &[1, 3, 224, 224]);
/// assert!(TensorSpec::new("bad", vec![1, 0], "float32").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TensorSpec {
    name: String,
    dims: Vec<u64>,
    dtype: String,
}

impl TensorSpec {
    /// Build a tensor spec, rejecting zero-sized dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::ZeroDimension`] naming the first zero entry.
    pub fn new(
        name: impl Into<String>,
        dims: Vec<u64>,
        dtype: impl Into<String>,
    ) -> Result<Self, ManifestError> {
        let name = name.into();
        if let Some(index) = dims.iter().position(|&dim| dim == 0) {
            return Err(ManifestError::ZeroDimension {
                tensor: name,
                index,
            });
        }
        Ok(Self {
            name,
            dims,
            dtype: dtype.into(),
        })
    }

    /// Return the tensor name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the declared dimensions in order.
    #[must_use]
    pub fn dims(&self) -> &[u64] {
        &self.dims
    }

    /// Return the element type, for example `float32`.
    #[must_use]
    pub fn dtype(&self) -> &str {
        &self.dtype
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_positive_dims() {
        let spec = TensorSpec::new("in", vec![1, 10], "float32").expect("valid spec");
        assert_eq!(spec.name(), "in");
        assert_eq!(spec.dtype(), "float32");
        assert_eq!(spec.dims(), [1, 10]);
    }

    #[test]
    fn accepts_scalar_with_no_dims() {
        let spec = TensorSpec::new("scale", Vec::new(), "float32").expect("valid spec");
        assert!(spec.dims().is_empty());
    }

    #[test]
    fn rejects_first_zero_dimension() {
        let err = TensorSpec::new("in", vec![4, 0, 0], "int8").expect_err("zero dim");
        assert_eq!(
            err,
            ManifestError::ZeroDimension {
                tensor: "in".to_owned(),
                index: 1,
            }
        );
    }
}

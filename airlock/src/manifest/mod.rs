//! Manifest model for model artefacts awaiting admission.
//!
//! A manifest declares a model's identity, version, framework, and tensor
//! shapes. It is parsed once per invocation from the JSON document that
//! accompanies the artefact and is immutable afterwards.
//!
//! # Sub-modules
//!
//! - [`error`] - Field and schema error types.
//! - [`parser`] - JSON document walker that aggregates field errors.
//! - [`tensor`] - Tensor shape declarations (`TensorSpec`).
//! - [`version`] - `MAJOR.MINOR.PATCH` version newtype (`ModelVersion`).

pub mod error;
pub mod parser;
pub mod tensor;
pub mod version;

pub use error::{FieldError, ManifestError, SchemaError};
pub use parser::{ManifestParseError, parse_manifest};
pub use tensor::TensorSpec;
pub use version::ModelVersion;

use serde::Serialize;
use std::fmt;

/// Identity fields of a manifest.
///
/// Groups the fields that name and attribute a model so that the
/// [`ModelManifest`] constructor stays within Clippy's parameter limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestIdentity {
    /// Model name; the first component of the deployment key.
    pub model_name: String,
    /// Model version; the second component of the deployment key.
    pub version: ModelVersion,
    /// Training framework, for example `PyTorch`.
    pub framework: String,
    /// Contact address of the model author.
    pub author_email: String,
    /// Optional experiment tracker identifier.
    pub experiment_id: Option<String>,
}

/// Tensor declarations of a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestTensors {
    /// Input tensors in declared order.
    pub input_tensors: Vec<TensorSpec>,
    /// Output tensors in declared order.
    pub output_tensors: Vec<TensorSpec>,
}

/// The declared contract of a model before deployment.
///
/// The document shape is:
///
/// ```json
/// {
///   "model_name": "test-model",
///   "version": "1.0.0",
///   "framework": "PyTorch",
///   "input_tensors": [{"name": "in", "dims": [1, 3, 224, 224], "dtype": "float32"}],
///   "output_tensors": [{"name": "out", "dims": [1, 10], "dtype": "float32"}],
///   "author_email": "tester@example.com",
///   "experiment_id": null
/// }
/// ```
///
/// # Examples
///
/// ```
/// model_airlock::_manifest_doc_setup!(manifest);
/// assert_eq!(manifest.model_name(), "test-model");
/// assert_eq!(manifest.deployment_key().as_str(), "test-model/1.0.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelManifest {
    #[serde(flatten)]
    identity: ManifestIdentity,
    #[serde(flatten)]
    tensors: ManifestTensors,
}

/// Helper macro for manifest doc examples. Constructs a sample
/// [`ModelManifest`] bound to `manifest`.
///
/// Hidden from the rendered docs; keeps per-function examples concise.
#[doc(hidden)]
#[macro_export]
macro_rules! _manifest_doc_setup {
    ($manifest:ident) => {
        use model_airlock::manifest::{
            ManifestIdentity, ManifestTensors, ModelManifest, ModelVersion, TensorSpec,
        };

        let identity = ManifestIdentity {
            model_name: "test-model".to_owned(),
            version: ModelVersion::try_from("1.0.0").expect("valid version"),
            framework: "PyTorch".to_owned(),
            author_email: "tester@example.com".to_owned(),
            experiment_id: None,
        };
        let tensors = ManifestTensors {
            input_tensors: vec![
                TensorSpec::new("in", vec![1, 3, 224, 224], "float32").expect("valid tensor"),
            ],
            output_tensors: vec![
                TensorSpec::new("out", vec![1, 10], "float32").expect("valid tensor"),
            ],
        };
        let $manifest = ModelManifest::new(identity, tensors);
    };
}

impl ModelManifest {
    /// Construct a manifest from identity and tensor groups.
    #[must_use]
    pub fn new(identity: ManifestIdentity, tensors: ManifestTensors) -> Self {
        Self { identity, tensors }
    }

    /// Return the model name.
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.identity.model_name
    }

    /// Return the model version.
    ///
    /// # Examples
    ///
    /// ```
    /// model_airlock::_manifest_doc_setup!(manifest);
    /// assert_eq!(manifest.version().as_str(), "1.0.0");
    /// ```
    #[must_use]
    pub fn version(&self) -> &ModelVersion {
        &self.identity.version
    }

    /// Return the training framework.
    #[must_use]
    pub fn framework(&self) -> &str {
        &self.identity.framework
    }

    /// Return the author contact address.
    #[must_use]
    pub fn author_email(&self) -> &str {
        &self.identity.author_email
    }

    /// Return the experiment identifier, if one was declared.
    #[must_use]
    pub fn experiment_id(&self) -> Option<&str> {
        self.identity.experiment_id.as_deref()
    }

    /// Return the input tensors in declared order.
    ///
    /// # Examples
    ///
    /// ```
    /// model_airlock::_manifest_doc_setup!(manifest);
    /// assert_eq!(manifest.input_tensors()[0].name(), "in");
    /// ```
    #[must_use]
    pub fn input_tensors(&self) -> &[TensorSpec] {
        &self.tensors.input_tensors
    }

    /// Return the output tensors in declared order.
    #[must_use]
    pub fn output_tensors(&self) -> &[TensorSpec] {
        &self.tensors.output_tensors
    }

    /// Return the object-store prefix `{model_name}/{version}`.
    #[must_use]
    pub fn deployment_key(&self) -> DeploymentKey {
        DeploymentKey::new(&self.identity.model_name, &self.identity.version)
    }
}

/// Destination prefix under which an artefact and its manifest are stored.
///
/// # Examples
///
/// ```
/// use model_airlock::manifest::{DeploymentKey, ModelVersion};
///
/// let version = ModelVersion::try_from("2.1.0").expect("valid version");
/// let key = DeploymentKey::new("resnet", &version);
/// assert_eq!(key.object_key("model.pt"), "resnet/2.1.0/model.pt");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DeploymentKey(String);

impl DeploymentKey {
    /// Derive the key from a model name and version.
    #[must_use]
    pub fn new(model_name: &str, version: &ModelVersion) -> Self {
        Self(format!("{model_name}/{version}"))
    }

    /// Return the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the object key for `file_name` beneath this prefix.
    #[must_use]
    pub fn object_key(&self, file_name: &str) -> String {
        format!("{}/{file_name}", self.0)
    }
}

impl fmt::Display for DeploymentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! Manifest deserialization and structural validation.
//!
//! Parsing happens in two steps so that callers can tell a malformed
//! document from a well-formed document with the wrong shape:
//!
//! 1. the raw bytes are decoded into an untyped JSON value, and
//! 2. the value is walked field by field, collecting a [`FieldError`] for
//!    every missing field, wrong primitive kind, malformed version, and
//!    non-positive dimension before giving up.
//!
//! Unknown top-level and tensor fields are ignored.

use super::error::{FieldError, SchemaError};
use super::tensor::TensorSpec;
use super::version::ModelVersion;
use super::{ManifestIdentity, ManifestTensors, ModelManifest};
use serde_json::{Map, Number, Value};

/// Errors arising from manifest parsing.
#[derive(Debug, thiserror::Error)]
pub enum ManifestParseError {
    /// The bytes are not a JSON document.
    #[error("manifest is not valid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    /// The document does not have the manifest shape.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Parse raw manifest bytes into a validated [`ModelManifest`].
///
/// # Errors
///
/// Returns [`ManifestParseError::Syntax`] for malformed JSON and
/// [`ManifestParseError::Schema`] listing every structural problem.
///
/// # Examples
///
/// ```
/// use model_airlock::manifest::parse_manifest;
///
/// let json = concat!(
///     r#"{"model_name":"test-model","version":"1.0.0","framework":"PyTorch","#,
///     r#""input_tensors":[{"name":"in","dims":[1,3,224,224],"dtype":"float32"}],"#,
///     r#""output_tensors":[{"name":"out","dims":[1,10],"dtype":"float32"}],"#,
///     r#""author_email":"tester@example.com"}"#,
/// );
/// let manifest = parse_manifest(json.as_bytes()).expect("valid manifest");
/// assert_eq!(manifest.deployment_key().as_str(), "test-model/1.0.0");
/// ```
pub fn parse_manifest(bytes: &[u8]) -> Result<ModelManifest, ManifestParseError> {
    let document = parse_document(bytes)?;
    Ok(ModelManifest::from_value(&document)?)
}

/// Decode raw bytes into an untyped JSON value without checking its shape.
///
/// # Errors
///
/// Returns the decoder error when the bytes are not a JSON document.
pub fn parse_document(bytes: &[u8]) -> Result<Value, serde_json::Error> {
    serde_json::from_slice(bytes)
}

impl ModelManifest {
    /// Validate an untyped JSON value against the manifest shape.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] aggregating every offending field.
    pub fn from_value(document: &Value) -> Result<Self, SchemaError> {
        let Some(object) = document.as_object() else {
            return Err(SchemaError::new(vec![FieldError::new(
                "$",
                format!("expected an object, found {}", describe(document)),
            )]));
        };

        let mut fields = FieldCollector::default();
        let model_name = fields.required_string(object, "model_name", "model_name");
        let version = fields.version(object);
        let framework = fields.required_string(object, "framework", "framework");
        let input_tensors = fields.tensor_list(object, "input_tensors");
        let output_tensors = fields.tensor_list(object, "output_tensors");
        let author_email = fields.required_string(object, "author_email", "author_email");
        let experiment_id = fields.optional_string(object, "experiment_id");

        let errors = fields.into_errors();
        match (
            model_name,
            version,
            framework,
            input_tensors,
            output_tensors,
            author_email,
            experiment_id,
        ) {
            (
                Some(model_name),
                Some(version),
                Some(framework),
                Some(input_tensors),
                Some(output_tensors),
                Some(author_email),
                Some(experiment_id),
            ) if errors.is_empty() => Ok(Self::new(
                ManifestIdentity {
                    model_name,
                    version,
                    framework,
                    author_email,
                    experiment_id,
                },
                ManifestTensors {
                    input_tensors,
                    output_tensors,
                },
            )),
            _ => Err(SchemaError::new(errors)),
        }
    }
}

impl TryFrom<&Value> for ModelManifest {
    type Error = SchemaError;

    fn try_from(document: &Value) -> Result<Self, Self::Error> {
        Self::from_value(document)
    }
}

/// Accumulates field errors while the document is walked.
#[derive(Default)]
struct FieldCollector {
    errors: Vec<FieldError>,
}

impl FieldCollector {
    fn push(&mut self, path: impl Into<String>, reason: impl Into<String>) {
        self.errors.push(FieldError::new(path, reason));
    }

    fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    /// Read a required string member, recording an error at `path`.
    fn required_string(
        &mut self,
        object: &Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<String> {
        match object.get(key) {
            None => {
                self.push(path, "field required");
                None
            }
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => {
                self.push(path, format!("expected a string, found {}", describe(other)));
                None
            }
        }
    }

    /// Read an optional string member; absent and `null` both mean `None`.
    ///
    /// The outer `Option` is `None` when the member has the wrong kind.
    fn optional_string(&mut self, object: &Map<String, Value>, key: &str) -> Option<Option<String>> {
        match object.get(key) {
            None | Some(Value::Null) => Some(None),
            Some(Value::String(text)) => Some(Some(text.clone())),
            Some(other) => {
                self.push(
                    key,
                    format!("expected a string or null, found {}", describe(other)),
                );
                None
            }
        }
    }

    fn version(&mut self, object: &Map<String, Value>) -> Option<ModelVersion> {
        let text = self.required_string(object, "version", "version")?;
        match ModelVersion::try_from(text) {
            Ok(version) => Some(version),
            Err(err) => {
                self.push("version", err.to_string());
                None
            }
        }
    }

    fn tensor_list(&mut self, object: &Map<String, Value>, key: &str) -> Option<Vec<TensorSpec>> {
        let entries = match object.get(key) {
            None => {
                self.push(key, "field required");
                return None;
            }
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                self.push(key, format!("expected an array, found {}", describe(other)));
                return None;
            }
        };

        let before = self.errors.len();
        let specs: Vec<TensorSpec> = entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| self.tensor(entry, &format!("{key}[{index}]")))
            .collect();
        (self.errors.len() == before).then_some(specs)
    }

    fn tensor(&mut self, entry: &Value, path: &str) -> Option<TensorSpec> {
        let Some(object) = entry.as_object() else {
            self.push(
                path,
                format!("expected an object, found {}", describe(entry)),
            );
            return None;
        };

        let name = self.required_string(object, "name", &format!("{path}.name"));
        let dims = self.dims(object, &format!("{path}.dims"));
        let dtype = self.required_string(object, "dtype", &format!("{path}.dtype"));

        let (name, dims, dtype) = (name?, dims?, dtype?);
        match TensorSpec::new(name, dims, dtype) {
            Ok(spec) => Some(spec),
            Err(err) => {
                self.push(format!("{path}.dims"), err.to_string());
                None
            }
        }
    }

    fn dims(&mut self, object: &Map<String, Value>, path: &str) -> Option<Vec<u64>> {
        let entries = match object.get("dims") {
            None => {
                self.push(path, "field required");
                return None;
            }
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                self.push(path, format!("expected an array, found {}", describe(other)));
                return None;
            }
        };

        let mut dims = Vec::with_capacity(entries.len());
        let mut valid = true;
        for (index, entry) in entries.iter().enumerate() {
            match positive_dimension(entry) {
                Ok(dim) => dims.push(dim),
                Err(reason) => {
                    self.push(format!("{path}[{index}]"), reason);
                    valid = false;
                }
            }
        }
        valid.then_some(dims)
    }
}

/// Interpret a JSON value as a strictly positive integer dimension.
fn positive_dimension(value: &Value) -> Result<u64, String> {
    let Value::Number(number) = value else {
        return Err(format!("expected an integer, found {}", describe(value)));
    };
    match integer_of(number) {
        Some(Integer::Unsigned(dim)) if dim > 0 => Ok(dim),
        Some(Integer::Unsigned(dim)) => Err(format!("must be a positive integer, got {dim}")),
        Some(Integer::Negative(dim)) => Err(format!("must be a positive integer, got {dim}")),
        None => Err(format!("expected an integer, found {number}")),
    }
}

enum Integer {
    Unsigned(u64),
    Negative(i64),
}

fn integer_of(number: &Number) -> Option<Integer> {
    if let Some(unsigned) = number.as_u64() {
        return Some(Integer::Unsigned(unsigned));
    }
    number.as_i64().map(Integer::Negative)
}

/// Name the JSON kind of `value` for error messages.
fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;

//! Fail-fast admission pipeline.
//!
//! A [`DeployRequest`] passes through five stages in a fixed order:
//!
//! ```text
//! FILE_EXISTS_CHECK → PARSE_CONFIG → SCHEMA_VALIDATION
//!     → LOGIC_VALIDATION → FORMAT_VALIDATION → admitted
//! ```
//!
//! The first failing stage ends the run with a [`Rejection`]; later stages
//! never execute. Reading the manifest and the artefact's signature bytes is
//! the only I/O performed here. Uploading is left to [`crate::transfer`].

use crate::error::AirlockError;
use crate::logic::{MAX_TENSOR_VOLUME, check_constraints_with};
use crate::manifest::{DeploymentKey, ModelManifest, parser::parse_document};
use crate::settings::AirlockSettings;
use crate::sniff::error::display_extension;
use crate::sniff::{SignatureMatch, SniffError, sniff_file};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::Serialize;
use std::fmt;

/// A pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    /// The artefact path names an existing regular file.
    FileExistsCheck,
    /// The manifest document is readable JSON.
    ParseConfig,
    /// The manifest has the required shape.
    SchemaValidation,
    /// Input tensor volumes are within the ceiling.
    LogicValidation,
    /// The artefact's signature bytes match its extension.
    FormatValidation,
}

impl Stage {
    /// Every stage in execution order.
    pub const ALL: [Self; 5] = [
        Self::FileExistsCheck,
        Self::ParseConfig,
        Self::SchemaValidation,
        Self::LogicValidation,
        Self::FormatValidation,
    ];

    /// Return the stable upper-case stage name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FileExistsCheck => "FILE_EXISTS_CHECK",
            Self::ParseConfig => "PARSE_CONFIG",
            Self::SchemaValidation => "SCHEMA_VALIDATION",
            Self::LogicValidation => "LOGIC_VALIDATION",
            Self::FormatValidation => "FORMAT_VALIDATION",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two inputs of an admission run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    /// Path to the binary model artefact.
    pub model_file: Utf8PathBuf,
    /// Path to the JSON manifest document.
    pub config: Utf8PathBuf,
}

impl DeployRequest {
    /// Pair an artefact with its manifest.
    #[must_use]
    pub fn new(model_file: impl Into<Utf8PathBuf>, config: impl Into<Utf8PathBuf>) -> Self {
        Self {
            model_file: model_file.into(),
            config: config.into(),
        }
    }
}

/// Outcome of a single stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    /// The stage that ran.
    pub stage: Stage,
    /// Whether the stage passed.
    pub ok: bool,
    /// Human-readable outcome.
    pub message: String,
}

/// A request that passed every stage.
#[derive(Debug, Clone)]
pub struct Admission {
    manifest: ModelManifest,
    deployment_key: DeploymentKey,
    signature: SignatureMatch,
    stages: Vec<StageReport>,
}

impl Admission {
    /// Return the validated manifest.
    #[must_use]
    pub fn manifest(&self) -> &ModelManifest {
        &self.manifest
    }

    /// Return the destination prefix `{model_name}/{version}`.
    #[must_use]
    pub fn deployment_key(&self) -> &DeploymentKey {
        &self.deployment_key
    }

    /// Return the artefact's signature match.
    #[must_use]
    pub fn signature(&self) -> &SignatureMatch {
        &self.signature
    }

    /// Return the stage reports in execution order.
    #[must_use]
    pub fn stages(&self) -> &[StageReport] {
        &self.stages
    }
}

/// A request stopped at its first failing stage.
#[derive(Debug, thiserror::Error)]
#[error("rejected at {stage}: {error}")]
pub struct Rejection {
    stage: Stage,
    #[source]
    error: AirlockError,
    stages: Vec<StageReport>,
}

impl Rejection {
    /// Return the stage that failed.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Return the failure.
    #[must_use]
    pub fn error(&self) -> &AirlockError {
        &self.error
    }

    /// Return the stage reports up to and including the failure.
    #[must_use]
    pub fn stages(&self) -> &[StageReport] {
        &self.stages
    }
}

/// The admission pipeline.
///
/// # Examples
///
/// ```no_run
/// use model_airlock::pipeline::{DeployRequest, Pipeline};
///
/// let request = DeployRequest::new("model.pt", "model_config.json");
/// match Pipeline::default().run(&request) {
///     Ok(admission) => println!("admitted as {}", admission.deployment_key()),
///     Err(rejection) => eprintln!("{rejection}"),
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pipeline {
    max_tensor_volume: u64,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(MAX_TENSOR_VOLUME)
    }
}

impl Pipeline {
    /// Build a pipeline with the given input tensor volume ceiling.
    #[must_use]
    pub fn new(max_tensor_volume: u64) -> Self {
        Self { max_tensor_volume }
    }

    /// Build a pipeline from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &AirlockSettings) -> Self {
        Self::new(settings.max_tensor_volume)
    }

    /// Return the configured volume ceiling.
    #[must_use]
    pub fn max_tensor_volume(&self) -> u64 {
        self.max_tensor_volume
    }

    /// Run every stage against `request`.
    ///
    /// # Errors
    ///
    /// Returns a [`Rejection`] naming the first stage that failed.
    pub fn run(&self, request: &DeployRequest) -> Result<Admission, Rejection> {
        let mut trail = StageTrail::default();

        trail.enter(Stage::FileExistsCheck);
        if !request.model_file.is_file() {
            return Err(trail.fail(AirlockError::ArtifactNotFound {
                path: request.model_file.clone(),
            }));
        }
        trail.pass(format!("Model file found: {}", request.model_file));

        trail.enter(Stage::ParseConfig);
        let document = match read_document(&request.config) {
            Ok(document) => document,
            Err(err) => return Err(trail.fail(err)),
        };
        trail.pass(format!("Loaded manifest {}", request.config));

        trail.enter(Stage::SchemaValidation);
        let manifest = match ModelManifest::from_value(&document) {
            Ok(manifest) => manifest,
            Err(err) => return Err(trail.fail(err.into())),
        };
        trail.pass("Schema Validation Passed");

        trail.enter(Stage::LogicValidation);
        match check_constraints_with(&manifest, self.max_tensor_volume) {
            Ok(report) => trail.pass(report.to_string()),
            Err(err) => return Err(trail.fail(err.into())),
        }

        trail.enter(Stage::FormatValidation);
        let signature = match sniff_file(request.model_file.as_std_path()) {
            Ok(signature) => signature,
            Err(err) => return Err(trail.fail(sniff_failure(&request.model_file, err))),
        };
        trail.pass(signature.to_string());

        let deployment_key = manifest.deployment_key();
        debug!(target: "pipeline", "admitted {deployment_key}");
        Ok(Admission {
            manifest,
            deployment_key,
            signature,
            stages: trail.into_reports(),
        })
    }
}

/// Records stage outcomes as the pipeline advances.
struct StageTrail {
    current: Stage,
    reports: Vec<StageReport>,
}

impl Default for StageTrail {
    fn default() -> Self {
        Self {
            current: Stage::FileExistsCheck,
            reports: Vec::with_capacity(Stage::ALL.len()),
        }
    }
}

impl StageTrail {
    fn enter(&mut self, stage: Stage) {
        debug!(target: "pipeline", "entering {stage}");
        self.current = stage;
    }

    fn pass(&mut self, message: impl Into<String>) {
        self.reports.push(StageReport {
            stage: self.current,
            ok: true,
            message: message.into(),
        });
    }

    fn fail(mut self, error: AirlockError) -> Rejection {
        debug!(target: "pipeline", "{} failed: {error}", self.current);
        self.reports.push(StageReport {
            stage: self.current,
            ok: false,
            message: error.to_string(),
        });
        Rejection {
            stage: self.current,
            error,
            stages: self.reports,
        }
    }

    fn into_reports(self) -> Vec<StageReport> {
        self.reports
    }
}

fn read_document(path: &Utf8Path) -> Result<serde_json::Value, AirlockError> {
    let bytes = std::fs::read(path).map_err(|source| AirlockError::ConfigRead {
        path: path.to_owned(),
        source,
    })?;
    parse_document(&bytes).map_err(|source| AirlockError::ConfigSyntax {
        path: path.to_owned(),
        source,
    })
}

fn sniff_failure(path: &Utf8Path, err: SniffError) -> AirlockError {
    match err {
        SniffError::Unsupported { extension } => AirlockError::UnsupportedFormat {
            extension: display_extension(&extension),
        },
        SniffError::Mismatch(mismatch) => AirlockError::Format(mismatch),
        SniffError::Truncated { format, required } => AirlockError::ArtifactTooShort {
            path: path.to_owned(),
            format,
            required,
        },
        SniffError::Io(source) => AirlockError::ArtifactRead {
            path: path.to_owned(),
            source,
        },
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;

//! Output formatting for the airlock CLI.
//!
//! Progress and verdicts are plain text lines written to stderr. The
//! `check --json` and `formats --json` commands serialize the structures
//! defined here to stdout instead.

use crate::error::ErrorCategory;
use crate::manifest::DeploymentKey;
use crate::pipeline::{Admission, Rejection, Stage, StageReport};
use crate::sniff::{FORMAT_SIGNATURES, ModelFormat};
use camino::Utf8Path;
use serde::Serialize;
use std::fmt::Display;
use std::io::Write;

/// Write a line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Format the banner printed before validation starts.
#[must_use]
pub fn start_message(config: &Utf8Path) -> String {
    format!("Starting Model Airlock for {config}")
}

/// Format a single stage outcome.
///
/// # Examples
///
/// ```
/// use model_airlock::output::stage_line;
/// use model_airlock::pipeline::{Stage, StageReport};
///
/// let report = StageReport {
///     stage: Stage::SchemaValidation,
///     ok: true,
///     message: "Schema Validation Passed".to_owned(),
/// };
/// assert_eq!(stage_line(&report), "[pass] SCHEMA_VALIDATION: Schema Validation Passed");
/// ```
#[must_use]
pub fn stage_line(report: &StageReport) -> String {
    let verdict = if report.ok { "pass" } else { "FAIL" };
    format!("[{verdict}] {}: {}", report.stage, report.message)
}

/// Write every stage outcome, one per line.
///
/// In quiet mode only failed stages are written, so rejections are always
/// visible.
pub fn write_stage_lines(reports: &[StageReport], quiet: bool, stderr: &mut dyn Write) {
    for report in reports.iter().filter(|report| !quiet || !report.ok) {
        write_stderr_line(stderr, stage_line(report));
    }
}

/// Information shown when a deploy stops short of uploading.
///
/// # Example
///
/// ```
/// use camino::Utf8PathBuf;
/// use model_airlock::manifest::{DeploymentKey, ModelVersion};
/// use model_airlock::output::DryRunInfo;
///
/// let version = ModelVersion::try_from("1.0.0").expect("valid version");
/// let key = DeploymentKey::new("test-model", &version);
/// let model_file = Utf8PathBuf::from("/tmp/model.pt");
/// let config = Utf8PathBuf::from("/tmp/model_config.json");
///
/// let info = DryRunInfo {
///     bucket: "models",
///     deployment_key: &key,
///     model_file: &model_file,
///     config: &config,
/// };
///
/// let output = info.display_text();
/// assert!(output.contains("Dry Run: Skipping Upload"));
/// assert!(output.contains("models/test-model/1.0.0/model.pt"));
/// ```
#[derive(Debug)]
pub struct DryRunInfo<'a> {
    /// Target bucket.
    pub bucket: &'a str,
    /// Destination prefix derived from the manifest.
    pub deployment_key: &'a DeploymentKey,
    /// The admitted artefact.
    pub model_file: &'a Utf8Path,
    /// The artefact's manifest.
    pub config: &'a Utf8Path,
}

impl DryRunInfo<'_> {
    /// Format the dry-run information for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        let mut lines = vec![
            "Dry Run: Skipping Upload".to_owned(),
            String::new(),
            "Would upload:".to_owned(),
        ];
        for path in [self.model_file, self.config] {
            let name = path.file_name().unwrap_or(path.as_str());
            lines.push(format!(
                "  {path} -> {}/{}",
                self.bucket,
                self.deployment_key.object_key(name)
            ));
        }
        lines.join("\n")
    }
}

/// Format the message printed after a successful upload.
#[must_use]
pub fn success_message(location: &str, deployment_key: &str) -> String {
    format!("Deployment Complete: {location}/{deployment_key}")
}

/// Machine-readable outcome of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    /// Whether every stage passed.
    pub admitted: bool,
    /// Destination prefix, when admitted.
    pub deployment_key: Option<String>,
    /// Detected format, when admitted.
    pub format: Option<ModelFormat>,
    /// The failing stage, when rejected.
    pub failed_stage: Option<Stage>,
    /// Category of the failure, when rejected.
    pub error_category: Option<ErrorCategory>,
    /// Stage outcomes in execution order.
    pub stages: Vec<StageReport>,
}

impl PipelineReport {
    /// Summarize a pipeline outcome.
    #[must_use]
    pub fn from_outcome(outcome: &Result<Admission, Rejection>) -> Self {
        match outcome {
            Ok(admission) => Self {
                admitted: true,
                deployment_key: Some(admission.deployment_key().to_string()),
                format: Some(admission.signature().format()),
                failed_stage: None,
                error_category: None,
                stages: admission.stages().to_vec(),
            },
            Err(rejection) => Self {
                admitted: false,
                deployment_key: None,
                format: None,
                failed_stage: Some(rejection.stage()),
                error_category: Some(rejection.error().category()),
                stages: rejection.stages().to_vec(),
            },
        }
    }
}

/// One row of the supported-format listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatEntry {
    /// File extension without the leading dot.
    pub extension: &'static str,
    /// Format the extension maps to.
    pub format: ModelFormat,
    /// Leading bytes the signature check reads.
    pub bytes_required: usize,
}

/// List every extension in the signature table.
#[must_use]
pub fn format_entries() -> Vec<FormatEntry> {
    FORMAT_SIGNATURES
        .iter()
        .map(|&(extension, format)| FormatEntry {
            extension,
            format,
            bytes_required: format.bytes_required(),
        })
        .collect()
}

/// Format the supported-format listing as aligned text.
#[must_use]
pub fn format_table(entries: &[FormatEntry]) -> String {
    let mut lines = vec!["Supported model file types:".to_owned()];
    lines.extend(
        entries
            .iter()
            .map(|entry| format!("  .{:<6} {}", entry.extension, entry.format)),
    );
    lines.join("\n")
}

//! CLI argument definitions for the model airlock.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::pipeline::DeployRequest;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Validate model artefacts before they reach the object store.
#[derive(Parser, Debug)]
#[command(name = "model-airlock")]
#[command(version, about)]
#[command(long_about = concat!(
    "Validate model artefacts before they reach the object store.\n\n",
    "Each deploy runs a fail-fast pipeline: the artefact must exist, its JSON ",
    "manifest must parse and match the manifest schema, every input tensor must ",
    "stay within the volume ceiling, and the artefact's leading (and for pickles, ",
    "trailing) bytes must match the format its extension claims. Only an admitted ",
    "artefact is uploaded, together with its manifest, under ",
    "<model_name>/<version>/.\n\n",
    "Signature checks are heuristic; they do not deserialize the model.",
))]
#[command(after_help = concat!(
    "EXIT STATUS:\n",
    "  0  admitted (and uploaded unless --dry-run)\n",
    "  1  rejected by a validation stage\n",
    "  2  invalid invocation or settings\n",
    "  3  admitted but the upload failed\n\n",
    "EXAMPLES:\n",
    "  Validate without uploading:\n",
    "    $ model-airlock deploy --model-file model.pt --config model_config.json \\\n",
    "        --bucket models --dry-run\n\n",
    "  Upload to an S3-compatible endpoint:\n",
    "    $ model-airlock deploy --model-file model.onnx --config model_config.json \\\n",
    "        --bucket models --endpoint http://localhost:9000\n\n",
    "  Print a machine-readable validation report:\n",
    "    $ model-airlock check --model-file model.pkl --config model_config.json --json",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Validate an artefact and upload it when admitted.
    Deploy(DeployArgs),

    /// Validate an artefact without uploading.
    Check(CheckArgs),

    /// List the supported model file extensions.
    Formats(FormatsArgs),
}

/// The artefact and manifest under validation.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ArtefactArgs {
    /// Path to the model binary (.pt, .pth, .onnx, .pkl).
    #[arg(long, value_name = "FILE")]
    pub model_file: Utf8PathBuf,

    /// Path to the model's JSON manifest.
    #[arg(long, value_name = "FILE")]
    pub config: Utf8PathBuf,
}

impl ArtefactArgs {
    /// Build the pipeline request for these paths.
    #[must_use]
    pub fn request(&self) -> DeployRequest {
        DeployRequest::new(self.model_file.clone(), self.config.clone())
    }
}

/// Arguments for the deploy command.
#[derive(Args, Debug, Clone)]
pub struct DeployArgs {
    /// Artefact and manifest paths.
    #[command(flatten)]
    pub artefact: ArtefactArgs,

    /// Target bucket in the object store.
    #[arg(long, value_name = "BUCKET")]
    pub bucket: String,

    /// Validate without uploading.
    #[arg(long)]
    pub dry_run: bool,

    /// Object store base URL [default: from settings].
    #[arg(long, value_name = "URL", conflicts_with = "local_store")]
    pub endpoint: Option<String>,

    /// Copy into DIR/<bucket>/ instead of uploading over HTTP.
    #[arg(long, value_name = "DIR")]
    pub local_store: Option<Utf8PathBuf>,

    /// Settings file [default: $MODEL_AIRLOCK_SETTINGS or platform config].
    #[arg(long, value_name = "FILE")]
    pub settings: Option<Utf8PathBuf>,

    /// Suppress progress output (errors still shown).
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the check command.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Artefact and manifest paths.
    #[command(flatten)]
    pub artefact: ArtefactArgs,

    /// Print the stage report as JSON on stdout.
    #[arg(long)]
    pub json: bool,

    /// Settings file [default: $MODEL_AIRLOCK_SETTINGS or platform config].
    #[arg(long, value_name = "FILE")]
    pub settings: Option<Utf8PathBuf>,

    /// Suppress progress output (errors still shown).
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the formats command.
#[derive(Args, Debug, Clone)]
pub struct FormatsArgs {
    /// Output in JSON format for scripting.
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;

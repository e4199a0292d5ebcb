//! Model airlock CLI entrypoint.
//!
//! This binary validates a model artefact and its manifest, then uploads
//! both to an object store when every validation stage passes.

use clap::Parser;
use model_airlock::cli::{CheckArgs, Cli, Command, DeployArgs, FormatsArgs};
use model_airlock::dirs::{BaseDirs, NoBaseDirs, SystemBaseDirs};
use model_airlock::error::AirlockError;
use model_airlock::output::{
    DryRunInfo, PipelineReport, format_entries, format_table, start_message, success_message,
    write_stage_lines, write_stderr_line,
};
use model_airlock::pipeline::Pipeline;
use model_airlock::settings::{AirlockSettings, SettingsError};
use model_airlock::status::ExitStatus;
use model_airlock::transfer::{DirectoryGateway, HttpGateway, TransferGateway, transfer_admitted};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let status = match SystemBaseDirs::new() {
        Some(dirs) => run(&cli, &dirs, &mut stdout, &mut stderr),
        None => run(&cli, &NoBaseDirs, &mut stdout, &mut stderr),
    };
    if status != ExitStatus::Success {
        std::process::exit(status.code());
    }
}

fn run(
    cli: &Cli,
    dirs: &dyn BaseDirs,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> ExitStatus {
    match &cli.command {
        Command::Deploy(args) => run_deploy(args, dirs, stderr),
        Command::Check(args) => run_check(args, dirs, stdout, stderr),
        Command::Formats(args) => run_formats(args, stdout, stderr),
    }
}

/// Validates the artefact and uploads it when admitted.
fn run_deploy(args: &DeployArgs, dirs: &dyn BaseDirs, stderr: &mut dyn Write) -> ExitStatus {
    let settings = match AirlockSettings::load(args.settings.as_deref(), dirs) {
        Ok(settings) => settings,
        Err(err) => return report_error(&err.into(), stderr),
    };

    // Resolve the destination before validating so a misconfigured run
    // fails without doing any work.
    let gateway = if args.dry_run {
        None
    } else {
        match resolve_gateway(args, &settings) {
            Ok(gateway) => Some(gateway),
            Err(err) => return report_error(&err.into(), stderr),
        }
    };

    if !args.quiet {
        write_stderr_line(stderr, start_message(&args.artefact.config));
    }

    let request = args.artefact.request();
    let admission = match Pipeline::from_settings(&settings).run(&request) {
        Ok(admission) => admission,
        Err(rejection) => {
            write_stage_lines(rejection.stages(), args.quiet, stderr);
            return ExitStatus::Rejected;
        }
    };
    write_stage_lines(admission.stages(), args.quiet, stderr);

    let Some(gateway) = gateway else {
        if !args.quiet {
            let info = DryRunInfo {
                bucket: &args.bucket,
                deployment_key: admission.deployment_key(),
                model_file: &request.model_file,
                config: &request.config,
            };
            write_stderr_line(stderr, info.display_text());
        }
        return ExitStatus::Success;
    };

    match transfer_admitted(&admission, &request, gateway.as_ref(), args.quiet, stderr) {
        Ok(receipt) => {
            if !args.quiet {
                write_stderr_line(
                    stderr,
                    success_message(&receipt.location, &receipt.deployment_key),
                );
            }
            ExitStatus::Success
        }
        Err(err) => report_error(&err.into(), stderr),
    }
}

/// Validates the artefact without uploading.
fn run_check(
    args: &CheckArgs,
    dirs: &dyn BaseDirs,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> ExitStatus {
    let settings = match AirlockSettings::load(args.settings.as_deref(), dirs) {
        Ok(settings) => settings,
        Err(err) => return report_error(&err.into(), stderr),
    };

    let outcome = Pipeline::from_settings(&settings).run(&args.artefact.request());
    if args.json {
        write_json(stdout, &PipelineReport::from_outcome(&outcome), stderr);
    } else {
        let stages = match &outcome {
            Ok(admission) => admission.stages(),
            Err(rejection) => rejection.stages(),
        };
        write_stage_lines(stages, args.quiet, stderr);
    }

    match outcome {
        Ok(_) => ExitStatus::Success,
        Err(_) => ExitStatus::Rejected,
    }
}

/// Lists the supported model file types.
fn run_formats(args: &FormatsArgs, stdout: &mut dyn Write, stderr: &mut dyn Write) -> ExitStatus {
    let entries = format_entries();
    if args.json {
        write_json(stdout, &entries, stderr);
    } else if writeln!(stdout, "{}", format_table(&entries)).is_err() {
        // Best-effort output; ignore write failures.
    }
    ExitStatus::Success
}

/// Picks the upload destination from the flags, then the settings file.
fn resolve_gateway(
    args: &DeployArgs,
    settings: &AirlockSettings,
) -> Result<Box<dyn TransferGateway>, SettingsError> {
    if let Some(root) = &args.local_store {
        return Ok(Box::new(DirectoryGateway::new(root.clone(), &args.bucket)));
    }
    let endpoint = args
        .endpoint
        .as_deref()
        .or(settings.transfer.endpoint.as_deref())
        .ok_or_else(|| SettingsError::Invalid {
            field: "transfer.endpoint",
            reason: "no upload destination; pass --endpoint or --local-store, \
                     or set transfer.endpoint in the settings file"
                .to_owned(),
        })?;
    Ok(Box::new(HttpGateway::new(
        endpoint,
        &args.bucket,
        settings.transfer.timeout(),
    )))
}

fn write_json(stdout: &mut dyn Write, value: &impl serde::Serialize, stderr: &mut dyn Write) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            if writeln!(stdout, "{json}").is_err() {
                // Best-effort output; ignore write failures.
            }
        }
        Err(err) => write_stderr_line(stderr, format!("failed to serialise report: {err}")),
    }
}

fn report_error(err: &AirlockError, stderr: &mut dyn Write) -> ExitStatus {
    write_stderr_line(stderr, err);
    ExitStatus::for_error(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use model_airlock::cli::ArtefactArgs;
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    const MANIFEST: &str = concat!(
        r#"{"model_name":"test-model","version":"1.0.0","framework":"PyTorch","#,
        r#""input_tensors":[{"name":"in","dims":[1,3,224,224],"dtype":"float32"}],"#,
        r#""output_tensors":[{"name":"out","dims":[1,10],"dtype":"float32"}],"#,
        r#""author_email":"tester@example.com"}"#,
    );

    struct Workspace {
        dir: TempDir,
    }

    impl Workspace {
        fn path(&self, name: &str) -> Utf8PathBuf {
            Utf8PathBuf::from_path_buf(self.dir.path().join(name)).expect("utf-8 path")
        }

        fn artefact(&self, model_bytes: &[u8]) -> ArtefactArgs {
            let model_file = self.path("model.pt");
            let config = self.path("model_config.json");
            fs::write(&model_file, model_bytes).expect("write model");
            fs::write(&config, MANIFEST).expect("write manifest");
            ArtefactArgs { model_file, config }
        }

        fn deploy_args(&self, model_bytes: &[u8]) -> DeployArgs {
            DeployArgs {
                artefact: self.artefact(model_bytes),
                bucket: "models".to_owned(),
                dry_run: false,
                endpoint: None,
                local_store: None,
                settings: None,
                quiet: false,
            }
        }
    }

    #[fixture]
    fn workspace() -> Workspace {
        Workspace {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    fn text(buffer: Vec<u8>) -> String {
        String::from_utf8(buffer).expect("utf-8 output")
    }

    #[rstest]
    fn dry_run_admits_without_destination(workspace: Workspace) {
        let args = DeployArgs {
            dry_run: true,
            ..workspace.deploy_args(b"PK\x03\x04")
        };
        let mut stderr = Vec::new();
        let status = run_deploy(&args, &NoBaseDirs, &mut stderr);

        assert_eq!(status, ExitStatus::Success);
        let output = text(stderr);
        assert!(output.contains("Schema Validation Passed"));
        assert!(output.contains("Dry Run: Skipping Upload"));
    }

    #[rstest]
    fn bad_magic_bytes_are_rejected(workspace: Workspace) {
        let args = DeployArgs {
            dry_run: true,
            ..workspace.deploy_args(b"\x00\x01\x02\x03")
        };
        let mut stderr = Vec::new();
        let status = run_deploy(&args, &NoBaseDirs, &mut stderr);

        assert_eq!(status, ExitStatus::Rejected);
        let output = text(stderr);
        assert!(output.contains("[FAIL] FORMAT_VALIDATION"));
        assert!(output.contains("File Signature Mismatch"));
        assert!(!output.contains("Dry Run"));
    }

    #[rstest]
    fn missing_destination_is_invalid_invocation(workspace: Workspace) {
        let args = workspace.deploy_args(b"PK");
        let mut stderr = Vec::new();
        let status = temp_env::with_var_unset("MODEL_AIRLOCK_SETTINGS", || {
            run_deploy(&args, &NoBaseDirs, &mut stderr)
        });

        assert_eq!(status, ExitStatus::InvalidInvocation);
        assert!(text(stderr).contains("no upload destination"));
    }

    #[rstest]
    fn local_store_receives_artefact_and_manifest(workspace: Workspace) {
        let store = workspace.path("store");
        let args = DeployArgs {
            local_store: Some(store.clone()),
            ..workspace.deploy_args(b"PK\x03\x04")
        };
        let mut stderr = Vec::new();
        let status = run_deploy(&args, &NoBaseDirs, &mut stderr);

        assert_eq!(status, ExitStatus::Success);
        assert!(store.join("models/test-model/1.0.0/model.pt").is_file());
        assert!(store.join("models/test-model/1.0.0/model_config.json").is_file());
        assert!(text(stderr).contains("Deployment Complete:"));
    }

    #[rstest]
    fn unreachable_endpoint_is_transfer_failure(workspace: Workspace) {
        let args = DeployArgs {
            endpoint: Some("http://127.0.0.1:9".to_owned()),
            quiet: true,
            ..workspace.deploy_args(b"PK\x03\x04")
        };
        let mut stderr = Vec::new();
        let status = run_deploy(&args, &NoBaseDirs, &mut stderr);

        assert_eq!(status, ExitStatus::TransferFailed);
        assert!(text(stderr).contains("Upload Failed"));
    }

    #[rstest]
    fn invalid_settings_file_is_invalid_invocation(workspace: Workspace) {
        let settings = workspace.path("airlock.toml");
        fs::write(&settings, "max_tensor_volume = 0\n").expect("write settings");
        let args = DeployArgs {
            settings: Some(settings),
            dry_run: true,
            ..workspace.deploy_args(b"PK")
        };
        let mut stderr = Vec::new();
        let status = run_deploy(&args, &NoBaseDirs, &mut stderr);

        assert_eq!(status, ExitStatus::InvalidInvocation);
        assert!(text(stderr).contains("max_tensor_volume"));
    }

    #[rstest]
    fn check_json_reports_failed_stage(workspace: Workspace) {
        let args = CheckArgs {
            artefact: workspace.artefact(b"\x00\x01"),
            json: true,
            settings: None,
            quiet: false,
        };
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let status = temp_env::with_var_unset("MODEL_AIRLOCK_SETTINGS", || {
            run_check(&args, &NoBaseDirs, &mut stdout, &mut stderr)
        });

        assert_eq!(status, ExitStatus::Rejected);
        let report: serde_json::Value = serde_json::from_slice(&stdout).expect("JSON report");
        assert_eq!(report["admitted"], false);
        assert_eq!(report["failed_stage"], "FORMAT_VALIDATION");
        assert_eq!(report["error_category"], "format");
    }

    #[rstest]
    #[case::text(false, ".onnx")]
    #[case::json(true, "\"extension\": \"onnx\"")]
    fn formats_lists_signature_table(#[case] json: bool, #[case] expected: &str) {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let status = run_formats(&FormatsArgs { json }, &mut stdout, &mut stderr);

        assert_eq!(status, ExitStatus::Success);
        assert!(text(stdout).contains(expected));
    }
}

//! Unit tests for settings discovery and validation.

use super::*;
use crate::dirs::NoBaseDirs;
use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use std::fs;
use tempfile::TempDir;

struct FixedDirs(PathBuf);

impl BaseDirs for FixedDirs {
    fn config_dir(&self) -> Option<PathBuf> {
        Some(self.0.clone())
    }
}

#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("temp dir")
}

fn write_settings(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write settings");
    path
}

#[rstest]
fn defaults_match_reference_ceiling() {
    let settings = AirlockSettings::default();
    assert_eq!(settings.max_tensor_volume, MAX_TENSOR_VOLUME);
    assert_eq!(settings.transfer.endpoint, None);
    assert_eq!(settings.transfer.timeout(), Duration::from_secs(30));
}

#[rstest]
fn empty_document_yields_defaults() {
    let settings = AirlockSettings::from_toml("").expect("empty is valid");
    assert_eq!(settings, AirlockSettings::default());
}

#[rstest]
fn deserialises_transfer_table() {
    let source = concat!(
        "max_tensor_volume = 42\n",
        "[transfer]\n",
        "endpoint = \"http://localhost:9000\"\n",
        "timeout_secs = 5\n",
    );
    let settings = AirlockSettings::from_toml(source).expect("valid settings");
    assert_eq!(settings.max_tensor_volume, 42);
    assert_eq!(
        settings.transfer.endpoint.as_deref(),
        Some("http://localhost:9000")
    );
    assert_eq!(settings.transfer.timeout_secs, 5);
}

#[rstest]
#[case::unknown_key("ceiling = 3\n")]
#[case::wrong_type("max_tensor_volume = \"big\"\n")]
#[case::negative("max_tensor_volume = -1\n")]
fn rejects_malformed_documents(#[case] source: &str) {
    let err = AirlockSettings::from_toml(source).expect_err("malformed");
    assert!(matches!(err, SettingsError::Parse { .. }), "{err}");
}

#[rstest]
#[case::zero_volume("max_tensor_volume = 0\n", "max_tensor_volume")]
#[case::zero_timeout("[transfer]\ntimeout_secs = 0\n", "transfer.timeout_secs")]
#[case::bad_scheme("[transfer]\nendpoint = \"ftp://host\"\n", "transfer.endpoint")]
fn rejects_out_of_range_values(#[case] source: &str, #[case] expected_field: &str) {
    let err = AirlockSettings::from_toml(source).expect_err("invalid");
    assert!(
        matches!(err, SettingsError::Invalid { field, .. } if field == expected_field),
        "{err}"
    );
}

#[rstest]
fn explicit_path_wins(temp_dir: TempDir) {
    let explicit = write_settings(&temp_dir, "explicit.toml", "max_tensor_volume = 7\n");
    let from_env = write_settings(&temp_dir, "env.toml", "max_tensor_volume = 8\n");
    let explicit = Utf8PathBuf::from_path_buf(explicit).expect("utf-8 path");

    temp_env::with_var(SETTINGS_ENV_VAR, Some(from_env.as_os_str()), || {
        let settings =
            AirlockSettings::load(Some(&explicit), &NoBaseDirs).expect("explicit settings");
        assert_eq!(settings.max_tensor_volume, 7);
    });
}

#[rstest]
fn environment_variable_beats_config_dir(temp_dir: TempDir) {
    write_settings(&temp_dir, SETTINGS_FILE_NAME, "max_tensor_volume = 9\n");
    let from_env = write_settings(&temp_dir, "env.toml", "max_tensor_volume = 8\n");
    let dirs = FixedDirs(temp_dir.path().to_path_buf());

    temp_env::with_var(SETTINGS_ENV_VAR, Some(from_env.as_os_str()), || {
        let settings = AirlockSettings::load(None, &dirs).expect("env settings");
        assert_eq!(settings.max_tensor_volume, 8);
    });
}

#[rstest]
fn config_dir_file_is_used_when_present(temp_dir: TempDir) {
    write_settings(&temp_dir, SETTINGS_FILE_NAME, "max_tensor_volume = 9\n");
    let dirs = FixedDirs(temp_dir.path().to_path_buf());

    temp_env::with_var_unset(SETTINGS_ENV_VAR, || {
        let settings = AirlockSettings::load(None, &dirs).expect("config dir settings");
        assert_eq!(settings.max_tensor_volume, 9);
    });
}

#[rstest]
fn missing_config_dir_file_falls_back_to_defaults(temp_dir: TempDir) {
    let dirs = FixedDirs(temp_dir.path().join("absent"));

    temp_env::with_var_unset(SETTINGS_ENV_VAR, || {
        let settings = AirlockSettings::load(None, &dirs).expect("defaults");
        assert_eq!(settings, AirlockSettings::default());
    });
}

#[rstest]
fn missing_explicit_file_is_an_error(temp_dir: TempDir) {
    let missing = Utf8PathBuf::from_path_buf(temp_dir.path().join("absent.toml"))
        .expect("utf-8 path");
    let err = AirlockSettings::load(Some(&missing), &NoBaseDirs).expect_err("missing");
    assert!(matches!(err, SettingsError::Read { .. }));
}

#[rstest]
fn parse_errors_name_the_file(temp_dir: TempDir) {
    let path = write_settings(&temp_dir, "bad.toml", "max_tensor_volume = [\n");
    let err = AirlockSettings::load_from(&path).expect_err("malformed");
    assert!(err.to_string().contains("bad.toml"), "{err}");
}

#[rstest]
fn default_settings_path_joins_file_name(temp_dir: TempDir) {
    let dirs = FixedDirs(temp_dir.path().to_path_buf());
    let path = default_settings_path(&dirs).expect("config dir");
    assert!(path.ends_with(SETTINGS_FILE_NAME));
    assert!(default_settings_path(&NoBaseDirs).is_none());
}

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use monobuild::config::settings::is_truthy;
use monobuild::config::{
    default_config_path, find_repo_root, load_and_validate, load_or_default, parse_duration,
    ConfigFile, RawConfigFile, Settings,
};
use monobuild::errors::MonobuildError;
use monobuild::fs::mock::MockFileSystem;

fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

fn config_error(contents: &str) -> String {
    let raw: RawConfigFile = toml::from_str(contents).unwrap();
    match ConfigFile::try_from(raw) {
        Err(MonobuildError::ConfigError(msg)) => msg,
        other => panic!("expected a config error, got {other:?}"),
    }
}

#[test]
fn durations_accept_each_unit() {
    assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
    assert_eq!(parse_duration("90s").unwrap(), Duration::from_secs(90));
    assert_eq!(parse_duration("30m").unwrap(), Duration::from_secs(30 * 60));
    assert_eq!(parse_duration(" 2h ").unwrap(), Duration::from_secs(2 * 60 * 60));
}

#[test]
fn durations_reject_bad_input() {
    assert!(parse_duration("").is_err());
    assert!(parse_duration("30").is_err());
    assert!(parse_duration("m").is_err());
    assert!(parse_duration("3d").is_err());
    assert!(parse_duration("99999999999999999999h").is_err());
}

#[test]
fn empty_file_yields_defaults() {
    let (_dir, path) = write_config("");
    let config = load_and_validate(&path).unwrap();

    assert_eq!(config.config.main_branch, "main");
    assert_eq!(config.config.worker_count, 1);
    assert_eq!(config.config.ci_worker_count, 1);
    assert_eq!(config.config.timeout, Duration::from_secs(1800));
    assert_eq!(config.config.output_dir, PathBuf::from("/tmp/monobuild"));
    assert_eq!(config.projects.declaration_file, "settings.gradle");
    assert_eq!(config.projects.markers.len(), 5);
    assert!(config.projects.markers.iter().any(|m| m == "package.json"));
}

#[test]
fn explicit_values_are_read() {
    let (_dir, path) = write_config(
        r#"
[config]
main_branch = "develop"
worker_count = 4
ci_worker_count = 2
timeout = "90s"
output_dir = "build-output"

[projects]
markers = ["Cargo.toml"]
declaration_file = "settings.gradle.kts"
"#,
    );
    let config = load_and_validate(&path).unwrap();

    assert_eq!(config.config.main_branch, "develop");
    assert_eq!(config.config.worker_count, 4);
    assert_eq!(config.config.ci_worker_count, 2);
    assert_eq!(config.config.timeout, Duration::from_secs(90));
    assert_eq!(config.config.output_dir, PathBuf::from("build-output"));
    assert_eq!(config.projects.markers, vec!["Cargo.toml".to_string()]);
    assert_eq!(config.projects.declaration_file, "settings.gradle.kts");
}

#[test]
fn unknown_keys_are_rejected() {
    let (_dir, path) = write_config("[config]\nworkers = 3\n");
    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, MonobuildError::TomlError(_)), "got {err:?}");
}

#[test]
fn invalid_values_are_config_errors() {
    assert!(config_error("[config]\nworker_count = 0\n").contains("worker_count"));
    assert!(config_error("[config]\nci_worker_count = 0\n").contains("ci_worker_count"));
    assert!(config_error("[config]\nmain_branch = \" \"\n").contains("main_branch"));
    assert!(config_error("[config]\ntimeout = \"soon\"\n").contains("timeout"));
    assert!(config_error("[config]\ntimeout = \"0s\"\n").contains("timeout"));
    assert!(config_error("[projects]\nmarkers = []\n").contains("markers"));
    assert!(config_error("[projects]\nmarkers = [\"a/b.txt\"]\n").contains("a/b.txt"));
    assert!(config_error("[projects]\ndeclaration_file = \"\"\n").contains("file names"));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_or_default(default_config_path(dir.path())).unwrap();
    assert_eq!(config.config.main_branch, "main");
}

#[test]
fn explicitly_named_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_and_validate(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, MonobuildError::IoError(_)));
}

#[test]
fn default_config_path_is_inside_dot_monobuild() {
    assert_eq!(
        default_config_path(Path::new("/repo")),
        PathBuf::from("/repo/.monobuild/config.toml")
    );
}

#[test]
fn repo_root_is_the_closest_ancestor_with_dot_monobuild() {
    let fs = MockFileSystem::new();
    fs.add_dir("/work/outer/.monobuild");
    fs.add_dir("/work/outer/inner/.monobuild");
    fs.add_dir("/work/outer/inner/app/src");

    assert_eq!(
        find_repo_root(&fs, Path::new("/work/outer/inner/app/src")).unwrap(),
        PathBuf::from("/work/outer/inner")
    );
    assert_eq!(
        find_repo_root(&fs, Path::new("/work/outer")).unwrap(),
        PathBuf::from("/work/outer")
    );
}

#[test]
fn dot_monobuild_file_does_not_mark_a_root() {
    let fs = MockFileSystem::new();
    fs.add_file("/work/.monobuild", "");
    let err = find_repo_root(&fs, Path::new("/work")).unwrap_err();
    assert!(matches!(err, MonobuildError::ConfigError(_)));
}

#[test]
fn settings_pick_the_ci_worker_count() {
    let mut config = ConfigFile::default();
    config.config.worker_count = 8;
    config.config.ci_worker_count = 2;

    assert_eq!(Settings::new("/repo", &config, false, None).worker_count, 8);
    assert_eq!(Settings::new("/repo", &config, true, None).worker_count, 2);
}

#[test]
fn settings_resolve_relative_output_dir_and_base_ref() {
    let mut config = ConfigFile::default();
    config.config.output_dir = PathBuf::from("out");

    let settings = Settings::new("/repo", &config, false, Some("release-1".to_string()));
    assert_eq!(settings.output_dir, PathBuf::from("/repo/out"));
    assert_eq!(settings.log_dir(), PathBuf::from("/repo/out/logs"));
    assert_eq!(settings.base_ref, "release-1");

    let defaults = Settings::new("/repo", &ConfigFile::default(), false, None);
    assert_eq!(defaults.output_dir, PathBuf::from("/tmp/monobuild"));
    assert_eq!(defaults.base_ref, "main");
}

#[test]
fn ci_flag_values() {
    for value in ["true", "TRUE", "1", "yes", " Yes "] {
        assert!(is_truthy(Some(value)), "{value:?}");
    }
    for value in ["false", "0", "", "no", "y"] {
        assert!(!is_truthy(Some(value)), "{value:?}");
    }
    assert!(!is_truthy(None));
}

#[test]
fn relative_start_resolves_to_an_absolute_root() {
    let cwd = std::env::current_dir().unwrap();
    let fs = MockFileSystem::new();
    fs.add_dir(cwd.join(".monobuild"));

    let root = find_repo_root(&fs, Path::new(".")).unwrap();
    assert!(root.is_absolute());
    assert_eq!(root, cwd);

    let nested = cwd.join("sub");
    fs.add_dir(&nested);
    assert_eq!(find_repo_root(&fs, Path::new("sub/../sub")).unwrap(), cwd);
}

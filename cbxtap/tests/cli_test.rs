use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::NamedTempFile;

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    write!(file, "{content}").expect("write temp config");
    file
}

#[test]
fn test_help_lists_modes() {
    let out = cargo_bin_cmd!("cbxtap")
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8(out).expect("utf8 help output");
    assert!(text.contains("--config"));
    assert!(text.contains("--state"));
    assert!(text.contains("--discover"));
}

#[test]
fn test_config_flag_is_required() {
    cargo_bin_cmd!("cbxtap").assert().failure();
}

#[test]
fn test_missing_config_file_fails() {
    cargo_bin_cmd!("cbxtap")
        .args(["--config", "/nonexistent/cbxtap-config.json"])
        .assert()
        .failure();
}

#[test]
fn test_config_without_credentials_fails() {
    let file = config_file(r#"{ "organization_id": "org-1" }"#);

    cargo_bin_cmd!("cbxtap")
        .args(["--config", file.path().to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn test_unreachable_auth_endpoint_fails() {
    let file = config_file(
        r#"{
            "access_key": "ak-1",
            "organization_id": "org-1",
            "auth_url": "http://127.0.0.1:1/token",
            "request_timeout_secs": 1
        }"#,
    );

    cargo_bin_cmd!("cbxtap")
        .args(["--config", file.path().to_str().unwrap(), "--discover"])
        .assert()
        .failure();
}

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

/// Without login info the binary must stop before any network call and list
/// every variable it needs.
#[test]
fn missing_credentials_fail_before_network() {
    let workdir = tempdir().expect("temp dir");
    let mut cmd = Command::cargo_bin("swift-upload").expect("Binary exists");

    cmd.current_dir(workdir.path())
        .env_clear()
        .args(["--source", ".", "--destination", "db-backups/nightly"]);

    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains(
            "This script uploads files to an OpenStack object store container",
        ))
        .stdout(predicate::str::contains("Getting authentication token").not())
        .stderr(
            predicate::str::contains("OS_USER_DOMAIN_NAME")
                .and(predicate::str::contains("OS_USERNAME"))
                .and(predicate::str::contains("OS_PASSWORD"))
                .and(predicate::str::contains("OS_PROJECT_DOMAIN_NAME"))
                .and(predicate::str::contains("OS_PROJECT_NAME"))
                .and(predicate::str::contains("OS_AUTH_URL")),
        );
}

#[test]
fn missing_required_flag_is_a_usage_error() {
    let mut cmd = Command::cargo_bin("swift-upload").expect("Binary exists");
    cmd.env_clear().args(["--source", "."]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--destination"));
}

#[test]
fn help_lists_all_options() {
    let mut cmd = Command::cargo_bin("swift-upload").expect("Binary exists");
    cmd.arg("--help");
    cmd.assert().success().stdout(
        predicate::str::contains("--source")
            .and(predicate::str::contains("--destination"))
            .and(predicate::str::contains("--ttl-days"))
            .and(predicate::str::contains("--verbose")),
    );
}

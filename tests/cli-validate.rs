use assert_cmd::prelude::*; // Add methods on commands
use indoc::indoc;
use predicates::prelude::*; // Used for writing assertions
use std::io::Write;
use std::path::PathBuf;
use std::process::Command; // Run programs
use tempfile::NamedTempFile;

/// `./vault-grant validate --file` must have a valid file
#[test]
fn validate_file_not_found() {
    let mut cmd = Command::cargo_bin("vault-grant").unwrap();
    cmd.arg("validate")
        .arg("--file")
        .arg("/tmp/test-file-not-found")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

/// Test the validate command with a valid file
#[test]
fn validate_file_valid() {
    let _text = indoc! {"
        vault:
          address: ${VAULT_ADDR:http://127.0.0.1:8200}
          token: ${VAULT_TOKEN}
          db_config: DCIR-DEVDB

        role:
          name: svcA
          app: orders-app

        databases:
          - name: orders
            permission: ReadWrite
          - name: reporting
            permission: ReadOnly
          - name: archive
    "};

    let mut file = NamedTempFile::new().expect("failed to create temp file");
    file.write_all(_text.as_bytes())
        .expect("failed to write to temp file");
    let path = PathBuf::from(file.path().to_str().unwrap());

    let mut cmd = Command::cargo_bin("vault-grant").unwrap();
    cmd.arg("validate")
        .arg("--file")
        .arg(path)
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));
}

/// Test the validate command with an unknown permission
#[test]
fn validate_file_invalid_permission() {
    let _text = indoc! {"
        vault:
          address: http://127.0.0.1:8200
          db_config: DCIR-DEVDB
        role:
          name: svcA
          app: orders
        databases:
          - name: orders
            permission: Owner
    "};

    let mut file = NamedTempFile::new().expect("failed to create temp file");
    file.write_all(_text.as_bytes())
        .expect("failed to write to temp file");
    let path = PathBuf::from(file.path().to_str().unwrap());

    let mut cmd = Command::cargo_bin("vault-grant").unwrap();
    cmd.arg("validate")
        .arg("--file")
        .arg(path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid"))
        .stderr(predicate::str::contains("unknown variant `Owner`"));
}

/// Test the validate command with a directory
#[test]
fn validate_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("svc.yaml"),
        indoc! {"
            vault:
              address: http://127.0.0.1:8200
              db_config: DCIR-DEVDB
            role:
              name: svcA
              app: orders
            databases:
              - name: orders
                permission: ReadOnly
        "},
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("vault-grant").unwrap();
    cmd.arg("validate")
        .arg("--file")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("svc.yaml"))
        .stdout(predicate::str::contains("ok"));

    dir.close().unwrap();
}

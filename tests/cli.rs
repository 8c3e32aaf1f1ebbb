use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cli_cmd(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sqlward").expect("failed to find binary");
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("REMOTE_USER");
    cmd.env_remove("SQLWARD_ENGINE_URL");
    cmd.arg("--data-dir").arg(data_dir.path());
    cmd
}

fn init_registry(data_dir: &TempDir) {
    cli_cmd(data_dir).arg("init").assert().success();
}

#[test]
fn test_init_creates_the_registry() {
    let data_dir = TempDir::new().unwrap();

    cli_cmd(&data_dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Registry initialized at"));

    assert!(data_dir.path().join("sqlward.db").exists());
}

#[test]
fn test_missing_remote_user_is_an_internal_error() {
    let data_dir = TempDir::new().unwrap();
    init_registry(&data_dir);

    cli_cmd(&data_dir)
        .args(["account", "delete", "alice"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("REMOTE_USER"));
}

#[test]
fn test_unauthorized_refusal_is_a_failure_payload() {
    let data_dir = TempDir::new().unwrap();
    init_registry(&data_dir);

    cli_cmd(&data_dir)
        .env("REMOTE_USER", "mallory")
        .args(["account", "delete", "alice"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(r#"{"error":"unauthorized"}"#));
}

#[test]
fn test_wrong_arity_is_a_failure_payload() {
    let data_dir = TempDir::new().unwrap();
    init_registry(&data_dir);

    cli_cmd(&data_dir)
        .env("REMOTE_USER", "alice")
        .args(["password", "set", "alice"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "expected exactly one argument, got 0",
        ));
}

#[test]
fn test_drop_of_unknown_database_is_not_found() {
    let data_dir = TempDir::new().unwrap();
    init_registry(&data_dir);

    // Never touches the engine, so no MySQL server is needed.
    cli_cmd(&data_dir)
        .env("REMOTE_USER", "alice")
        .args(["db", "drop", "alice", "web"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            r#"{"error":"database alice+web not found"}"#,
        ));
}

#[test]
fn test_remote_user_realm_is_stripped() {
    let data_dir = TempDir::new().unwrap();
    init_registry(&data_dir);

    // alice@EXAMPLE.COM acts as plain alice; the self-service rule applies
    // and the lookup proceeds to not-found instead of unauthorized.
    cli_cmd(&data_dir)
        .env("REMOTE_USER", "alice@EXAMPLE.COM")
        .args(["db", "drop", "alice", "web"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("not found"));
}

#[test]
fn test_delete_of_unknown_account_is_not_found() {
    let data_dir = TempDir::new().unwrap();
    init_registry(&data_dir);

    cli_cmd(&data_dir)
        .env("REMOTE_USER", "alice")
        .args(["account", "delete", "alice"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            r#"{"error":"account alice not found"}"#,
        ));
}

use assert_cmd::prelude::*;
use predicates::str::{contains, is_empty};
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn kvfile(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("kvfile").unwrap();
    cmd.current_dir(dir.path());
    cmd
}

#[test]
fn cli_no_args() {
    let dir = TempDir::new().unwrap();
    kvfile(&dir).assert().failure();
}

#[test]
fn cli_version() {
    let dir = TempDir::new().unwrap();
    kvfile(&dir)
        .arg("-V")
        .assert()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_set_stores_string() {
    let dir = TempDir::new().unwrap();
    kvfile(&dir)
        .args(["--file", "db", "set", "foo", "[1,2,3]"])
        .assert()
        .success()
        .stdout(is_empty());
    assert_eq!(
        fs::read_to_string(dir.path().join("db.json")).unwrap(),
        r#"{"foo":"[1,2,3]"}"#
    );
}

#[test]
fn cli_set_json_then_get() {
    let dir = TempDir::new().unwrap();
    kvfile(&dir)
        .args(["-F", "msgpack", "set", "--json", "flag", "[false,[],true,1.2]"])
        .assert()
        .success();
    assert!(dir.path().join("kvfile.msgpack").exists());

    kvfile(&dir)
        .args(["-F", "msgpack", "get", "flag"])
        .assert()
        .success()
        .stdout("[false,[],true,1.2]\n");
}

#[test]
fn cli_set_invalid_json() {
    let dir = TempDir::new().unwrap();
    kvfile(&dir)
        .args(["set", "--json", "foo", "[1,"])
        .assert()
        .failure();
    assert!(!dir.path().join("kvfile.json").exists());
}

#[test]
fn cli_get_missing() {
    let dir = TempDir::new().unwrap();
    kvfile(&dir)
        .args(["get", "foo"])
        .assert()
        .failure()
        .stdout("Key not found");

    kvfile(&dir).args(["set", "bar", "1"]).assert().success();
    kvfile(&dir)
        .args(["get", "foo"])
        .assert()
        .failure()
        .stdout("Key not found");
}

#[test]
fn cli_keys_and_rm() {
    let dir = TempDir::new().unwrap();
    kvfile(&dir).args(["set", "foo", "1"]).assert().success();
    kvfile(&dir).args(["set", "bar", "2"]).assert().success();
    kvfile(&dir)
        .arg("keys")
        .assert()
        .success()
        .stdout("bar\nfoo\n");

    kvfile(&dir).args(["rm", "foo"]).assert().success();
    kvfile(&dir).arg("keys").assert().success().stdout("bar\n");
    kvfile(&dir)
        .args(["rm", "foo"])
        .assert()
        .failure()
        .stdout("Key not found");
}

#[test]
fn cli_dump_and_truncate() {
    let dir = TempDir::new().unwrap();
    kvfile(&dir).arg("dump").assert().success().stdout("{}\n");

    kvfile(&dir).args(["set", "foo", "x"]).assert().success();
    kvfile(&dir)
        .arg("dump")
        .assert()
        .success()
        .stdout(contains(r#""foo": "x""#));

    kvfile(&dir).arg("truncate").assert().success();
    assert!(!dir.path().join("kvfile.json").exists());
    kvfile(&dir).arg("truncate").assert().success();
    kvfile(&dir).arg("keys").assert().failure();
}

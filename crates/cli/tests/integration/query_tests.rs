//! Read-only commands: list, search, info.

use std::fs;

use predicates::prelude::*;

use super::common::TestEnv;

fn indexed_env() -> TestEnv {
  let env = TestEnv::new();
  env.add_package("hello", "name: hello\nversion: 2.12\ndescription: GNU greeting\nsource: file:///x\n");
  env.add_package("jq", "name: jq\ndescription: 'JSON processor'\nsource: file:///y\n");
  env
}

#[test]
fn list_empty() {
  let env = TestEnv::new();

  env
    .cmd()
    .arg("list")
    .assert()
    .success()
    .stdout(predicate::str::contains("No packages installed"));
}

#[test]
fn list_text_and_json() {
  let env = TestEnv::new();
  let installed = env.root_path().join("installed");
  fs::create_dir_all(&installed).unwrap();
  fs::write(installed.join("installed.db"), "hello 2.12\njq unknown\n").unwrap();

  env
    .cmd()
    .arg("list")
    .assert()
    .success()
    .stdout(predicate::str::contains("hello 2.12\njq unknown\n"));

  let output = env.cmd().args(["list", "--output", "json"]).output().unwrap();
  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json[0]["name"], "hello");
  assert_eq!(json[1]["version"], "unknown");
}

#[test]
fn search_by_description() {
  let env = indexed_env();

  env
    .cmd()
    .args(["search", "json"])
    .assert()
    .success()
    .stdout(predicate::str::contains("jq"))
    .stdout(predicate::str::contains("hello").not());
}

#[test]
fn search_without_match() {
  let env = indexed_env();

  env
    .cmd()
    .args(["search", "zzz"])
    .assert()
    .success()
    .stdout(predicate::str::contains("No packages match"));
}

#[test]
fn search_before_update_fails() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["search", "x"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("tinypkg update"));
}

#[test]
fn info_shows_manifest_fields() {
  let env = indexed_env();

  env
    .cmd()
    .args(["info", "hello"])
    .assert()
    .success()
    .stdout(predicate::str::contains("2.12"))
    .stdout(predicate::str::contains("GNU greeting"))
    .stdout(predicate::str::contains("Installed: no"));
}

#[test]
fn info_json_unquotes_values() {
  let env = indexed_env();

  let output = env.cmd().args(["info", "jq", "--output", "json"]).output().unwrap();
  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["description"], "JSON processor");
  assert_eq!(json["installed"], serde_json::Value::Null);
}

#[test]
fn info_unknown_package() {
  let env = indexed_env();

  env
    .cmd()
    .args(["info", "ghost"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("not found in index"));
}

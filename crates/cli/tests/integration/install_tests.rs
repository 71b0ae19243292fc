//! Build, install and remove through the binary with real scripts.

use std::fs;

use predicates::prelude::*;

use super::common::TestEnv;

fn hello_env() -> TestEnv {
  let env = TestEnv::new();
  let url = env.source_archive("hello", &[("hello-1.0/greeting.txt", "hello world\n")]);
  env.add_package(
    "hello",
    &format!(
      "name: hello\n\
       version: 1.0\n\
       description: Friendly greeter\n\
       source: {url}\n\
       build: |\n  \
         cp greeting.txt built.txt\n  \
         echo \"built for $PREFIX\"\n\
       install: |\n  \
         mkdir -p \"$PREFIX/share\"\n  \
         cp built.txt \"$PREFIX/share/greeting.txt\"\n"
    ),
  );
  env
}

#[test]
fn install_builds_and_registers() {
  let env = hello_env();

  env
    .cmd()
    .args(["install", "hello", "--offline"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Installed hello 1.0"));

  let installed = env.prefix_path("hello").join("share/greeting.txt");
  assert_eq!(fs::read_to_string(installed).unwrap(), "hello world\n");
  assert_eq!(fs::read_to_string(env.registry_path()).unwrap(), "hello 1.0\n");

  let log = env.root_path().join("build/hello/hello-1.0/tinypkg.log");
  assert!(fs::read_to_string(log).unwrap().is_empty(), "install log replaces build log");
}

#[test]
fn reinstall_keeps_one_registry_line() {
  let env = hello_env();

  env.cmd().args(["install", "hello", "--offline"]).assert().success();
  env.cmd().args(["install", "hello", "--offline"]).assert().success();

  assert_eq!(fs::read_to_string(env.registry_path()).unwrap(), "hello 1.0\n");
}

#[test]
fn build_only_does_not_register() {
  let env = hello_env();

  env
    .cmd()
    .args(["build", "hello", "--offline"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Built hello 1.0"));

  let log = env.root_path().join("build/hello/hello-1.0/tinypkg.log");
  let expected = format!("built for {}\n", env.prefix_path("hello").display());
  assert_eq!(fs::read_to_string(log).unwrap(), expected);
  assert!(!env.registry_path().exists());
}

#[test]
fn install_skip_build_uses_existing_tree() {
  let env = hello_env();
  env.cmd().args(["build", "hello", "--offline"]).assert().success();

  env
    .cmd()
    .args(["install", "hello", "--offline", "--skip-build"])
    .assert()
    .success();

  assert!(env.prefix_path("hello").join("share/greeting.txt").exists());
}

#[test]
fn failing_build_exits_one_with_log_tail() {
  let env = TestEnv::new();
  let url = env.source_archive("broken", &[("broken-0.1/README", "x\n")]);
  env.add_package(
    "broken",
    &format!("source: {url}\nbuild: |\n  echo compiling\n  echo 'fatal: no compiler' >&2\n  exit 3\n"),
  );

  env
    .cmd()
    .args(["install", "broken", "--offline"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("build script failed (exit code 3)"))
    .stderr(predicate::str::contains("fatal: no compiler"));

  assert!(!env.registry_path().exists());
  assert!(!env.prefix_path("broken").exists());
}

#[test]
fn failing_build_echoes_last_fifty_log_lines_to_stderr() {
  let env = TestEnv::new();
  let url = env.source_archive("noisy", &[("noisy-1.0/README", "x\n")]);
  env.add_package(
    "noisy",
    &format!("source: {url}\nbuild: |\n  i=1\n  while [ $i -le 80 ]; do echo \"line $i\"; i=$((i + 1)); done\n  exit 1\n"),
  );

  let log = env.root_path().join("build/noisy/noisy-1.0/tinypkg.log");
  env
    .cmd()
    .args(["build", "noisy", "--offline"])
    .assert()
    .code(1)
    .stdout(predicate::str::contains("line 80").not())
    .stderr(predicate::str::contains(format!("--- last 50 lines of {} ---", log.display())))
    .stderr(predicate::str::contains("\nline 31\n"))
    .stderr(predicate::str::contains("\nline 80\n--- end of log ---"))
    .stderr(predicate::str::contains("\nline 30\n").not());
}

#[test]
fn missing_manifest_fails() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["build", "ghost", "--offline"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("manifest not found"));
}

#[test]
fn manifest_without_source_fails_before_build_dir() {
  let env = TestEnv::new();
  env.add_package("nosrc", "name: nosrc\nbuild: make\n");

  env
    .cmd()
    .args(["build", "nosrc", "--offline"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("no 'source' value"));

  assert!(!env.root_path().join("build/nosrc").exists());
}

#[test]
fn checksum_mismatch_fails() {
  let env = TestEnv::new();
  let url = env.source_archive("pinned", &[("pinned-1/f", "x\n")]);
  env.add_package(
    "pinned",
    &format!("source: {url}\nchecksum: sha256:{}\nbuild: true\n", "ab".repeat(32)),
  );

  env
    .cmd()
    .args(["build", "pinned", "--offline"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("checksum mismatch"));
}

#[test]
fn sync_failure_aborts_install() {
  let env = hello_env();

  env
    .cmd()
    .args(["install", "hello"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("failed to clone package index"));

  assert!(!env.registry_path().exists());
}

#[test]
fn remove_deletes_prefix_and_entry() {
  let env = hello_env();
  env.cmd().args(["install", "hello", "--offline"]).assert().success();

  env
    .cmd()
    .args(["remove", "hello"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Removed hello"));

  assert!(!env.prefix_path("hello").exists());
  assert_eq!(fs::read_to_string(env.registry_path()).unwrap(), "");
}

#[test]
fn remove_unknown_package_fails() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["remove", "ghost"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("ghost: not installed"));
}

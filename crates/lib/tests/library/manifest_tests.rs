//! Manifest decoding through the public API.

use std::fs;

use tempfile::TempDir;
use tinypkg_lib::config::Config;
use tinypkg_lib::manifest::{self, InvalidReason, ManifestError};

#[test]
fn block_lines_round_trip_for_various_lengths() {
  for n in 1..=12 {
    let lines: Vec<String> = (0..n).map(|i| format!("step {i} --flag='a b' && echo \"$PREFIX\"")).collect();
    let mut text = String::from("name: demo\nbuild: |\n");
    for line in &lines {
      text.push_str("    ");
      text.push_str(line);
      text.push('\n');
    }
    text.push_str("source: https://example.com/demo.tar.gz\n");

    let decoded = manifest::parse(&text).unwrap();

    let got: Vec<&str> = decoded.build.lines().collect();
    assert_eq!(got, lines, "block of {n} lines");
    assert_eq!(decoded.source, "https://example.com/demo.tar.gz");
  }
}

#[test]
fn missing_source_rejected_whatever_else_is_present() {
  let bodies = [
    "",
    "name: a\n",
    "name: a\nversion: 1\ndescription: x\nbuild: make\ninstall: make install\nchecksum: sha256:00\n",
    "source:\n",
    "build: |\n  source: not-a-key\n",
  ];
  for body in bodies {
    let err = manifest::parse(body).unwrap_err();
    assert!(
      matches!(err, ManifestError::Invalid(InvalidReason::MissingSource)),
      "{body:?} gave {err}"
    );
  }
}

#[test]
fn decode_reads_from_index_layout() {
  let temp = TempDir::new().unwrap();
  let config = Config::new(temp.path());
  let path = temp.path().join("cache/repo/packages/foo/manifest.yaml");
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(&path, "name: foo\nsource: http://x/foo.tar.gz\nbuild: make\ninstall: make install\n").unwrap();

  let decoded = manifest::decode(&config, "foo").unwrap();

  assert_eq!(decoded.name, "foo");
  assert_eq!(decoded.version, "");
  assert_eq!(decoded.build, "make");
  assert_eq!(decoded.install, "make install");
  assert_eq!(decoded.version_or_unknown(), "unknown");
}

#[test]
fn decode_missing_file_is_not_found() {
  let temp = TempDir::new().unwrap();
  let config = Config::new(temp.path());

  assert!(matches!(
    manifest::decode(&config, "absent"),
    Err(ManifestError::NotFound { .. })
  ));
}

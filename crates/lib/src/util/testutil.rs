//! Test utilities for tinypkg-lib.

use std::process::Command;

/// Run `script` with `/bin/sh -c` and return its stdout.
#[cfg(unix)]
pub fn shell_output(script: &str) -> String {
  let output = Command::new("/bin/sh").arg("-c").arg(script).output().unwrap();
  assert!(output.status.success(), "script failed: {script}");
  String::from_utf8(output.stdout).unwrap()
}

/// Build an uncompressed tarball in memory from `(path, contents)` pairs.
pub fn plain_tar(files: &[(&str, &str)]) -> Vec<u8> {
  let mut builder = tar::Builder::new(Vec::new());
  for (path, contents) in files {
    let mut header = tar::Header::new_gnu();
    header.set_size(contents.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, path, contents.as_bytes()).unwrap();
  }
  builder.into_inner().unwrap()
}

/// Gzip-compressed [`plain_tar`].
pub fn tar_gz(files: &[(&str, &str)]) -> Vec<u8> {
  use flate2::Compression;
  use flate2::write::GzEncoder;
  use std::io::Write;

  let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
  encoder.write_all(&plain_tar(files)).unwrap();
  encoder.finish().unwrap()
}

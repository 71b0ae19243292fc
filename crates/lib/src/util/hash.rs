//! Hashing utilities for archive verification.
//!
//! This module provides:
//! - `hash_file()`: streaming SHA-256 of a file
//! - `hash_bytes()`: SHA-256 of an in-memory buffer
//! - `ExpectedChecksum`: the recognized forms of a manifest `checksum` value

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

/// Compute the lowercase hex SHA-256 of a file's contents.
pub fn hash_file(path: &Path) -> io::Result<String> {
  let mut reader = BufReader::new(File::open(path)?);
  let mut hasher = Sha256::new();
  let mut buf = [0u8; 64 * 1024];
  loop {
    let n = reader.read(&mut buf)?;
    if n == 0 {
      break;
    }
    hasher.update(&buf[..n]);
  }
  Ok(hex::encode(hasher.finalize()))
}

/// Compute the lowercase hex SHA-256 of `bytes`.
pub fn hash_bytes(bytes: &[u8]) -> String {
  let mut hasher = Sha256::new();
  hasher.update(bytes);
  hex::encode(hasher.finalize())
}

/// A checksum declared by a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedChecksum {
  /// No checksum was declared.
  None,
  /// A SHA-256 digest, normalized to lowercase hex.
  Sha256(String),
  /// A value in a form we cannot verify (kept verbatim for diagnostics).
  Unsupported(String),
}

impl ExpectedChecksum {
  /// Interpret a manifest `checksum` field.
  ///
  /// Accepts `sha256:<hex>` and bare 64-character hex digests.
  pub fn parse(value: &str) -> Self {
    let value = value.trim();
    if value.is_empty() {
      return Self::None;
    }

    let digest = match value.split_once(':') {
      Some((algo, digest)) if algo.eq_ignore_ascii_case("sha256") => digest.trim(),
      Some(_) => return Self::Unsupported(value.to_string()),
      None => value,
    };

    if digest.len() == 64 && digest.chars().all(|c| c.is_ascii_hexdigit()) {
      Self::Sha256(digest.to_ascii_lowercase())
    } else {
      Self::Unsupported(value.to_string())
    }
  }
}

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::consts::UNKNOWN_VERSION;

/// Declarative description of one package.
///
/// Every field is always present; keys missing from the file decode to `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
  pub name: String,
  pub version: String,
  pub description: String,
  /// URL of the source archive. Never empty in a decoded manifest.
  pub source: String,
  /// Build script body.
  pub build: String,
  /// Install script body.
  pub install: String,
  pub checksum: String,
}

impl Manifest {
  /// Version to record in the registry.
  pub fn version_or_unknown(&self) -> &str {
    if self.version.is_empty() {
      UNKNOWN_VERSION
    } else {
      &self.version
    }
  }
}

#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("manifest not found at '{path}': {source}")]
  NotFound {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to read manifest '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("invalid manifest: {0}")]
  Invalid(InvalidReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
  MissingSource,
}

impl std::fmt::Display for InvalidReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      InvalidReason::MissingSource => write!(f, "no 'source' value"),
    }
  }
}

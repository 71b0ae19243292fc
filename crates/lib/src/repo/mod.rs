//! The local package index.
//!
//! The index is a git repository cloned to `<root>/cache/repo` with one
//! directory per package under `packages/`, each holding a `manifest.yaml`.

mod sync;

pub use sync::{SyncError, SyncOutcome, sync};

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::config::Config;
use crate::consts::MANIFEST_FILENAME;
use crate::manifest::{self, Manifest, ManifestError};

#[derive(Debug, Error)]
pub enum IndexError {
  #[error("package index not found at '{path}'; run `tinypkg update` first")]
  NotSynced { path: PathBuf },

  #[error("failed to read package index '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("package '{package}' not found in index")]
  UnknownPackage { package: String },

  #[error("{package}: {source}")]
  Manifest {
    package: String,
    #[source]
    source: ManifestError,
  },
}

/// Summary of one package in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
  pub name: String,
  pub version: String,
  pub description: String,
}

/// Names of every package in the index that has a manifest, sorted.
pub fn available_packages(config: &Config) -> Result<Vec<String>, IndexError> {
  let dir = config.packages_dir();
  let entries = match fs::read_dir(&dir) {
    Ok(entries) => entries,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(IndexError::NotSynced { path: dir }),
    Err(source) => return Err(IndexError::Read { path: dir, source }),
  };

  let mut names: Vec<String> = entries
    .filter_map(Result::ok)
    .filter(|entry| entry.path().join(MANIFEST_FILENAME).is_file())
    .filter_map(|entry| entry.file_name().into_string().ok())
    .filter(|name| !name.starts_with('.'))
    .collect();
  names.sort();
  Ok(names)
}

/// Packages whose name or description contains `term`, ignoring case.
///
/// Manifests that fail to decode still match by name.
pub fn search(config: &Config, term: &str) -> Result<Vec<IndexEntry>, IndexError> {
  let needle = term.to_lowercase();
  let mut found = Vec::new();

  for name in available_packages(config)? {
    let entry = match manifest::decode(config, &name) {
      Ok(m) => IndexEntry {
        name: name.clone(),
        version: m.version,
        description: m.description,
      },
      Err(e) => {
        warn!(package = %name, error = %e, "skipping unreadable manifest fields");
        IndexEntry {
          name: name.clone(),
          version: String::new(),
          description: String::new(),
        }
      }
    };

    if entry.name.to_lowercase().contains(&needle) || entry.description.to_lowercase().contains(&needle) {
      found.push(entry);
    }
  }

  Ok(found)
}

/// Decoded manifest of `package`.
pub fn info(config: &Config, package: &str) -> Result<Manifest, IndexError> {
  manifest::decode(config, package).map_err(|source| match source {
    ManifestError::NotFound { source: io_err, .. } if io_err.kind() == io::ErrorKind::NotFound => {
      IndexError::UnknownPackage {
        package: package.to_string(),
      }
    }
    source => IndexError::Manifest {
      package: package.to_string(),
      source,
    },
  })
}

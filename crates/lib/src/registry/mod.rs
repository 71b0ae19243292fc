//! Installed-package registry.
//!
//! The store is a plain text file with one `name version` line per installed
//! package, in installation order:
//!
//! ```text
//! hello 2.12
//! jq unknown
//! ```
//!
//! Every mutation writes a complete replacement into a temporary file in the
//! same directory, syncs it, and renames it over the store, so a crash leaves
//! either the old or the new store and never a truncated one.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
  pub name: String,
  pub version: String,
}

impl RegistryEntry {
  fn parse(line: &str) -> Option<Self> {
    let line = line.trim();
    if line.is_empty() {
      return None;
    }
    let (name, version) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    Some(Self {
      name: name.to_string(),
      version: version.trim().to_string(),
    })
  }
}

#[derive(Debug, Error)]
pub enum RegistryError {
  #[error("failed to read registry '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write registry '{path}': {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Handle to the registry store at a fixed path.
#[derive(Debug, Clone)]
pub struct Registry {
  path: PathBuf,
}

impl Registry {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// Registry at the configured location.
  pub fn open(config: &Config) -> Self {
    Self::new(config.registry_path())
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// All entries in store order. A missing store means nothing is installed.
  pub fn entries(&self) -> Result<Vec<RegistryEntry>, RegistryError> {
    Ok(self.read_lines()?.iter().filter_map(|l| RegistryEntry::parse(l)).collect())
  }

  pub fn contains(&self, name: &str) -> Result<bool, RegistryError> {
    Ok(self.version_of(name)?.is_some())
  }

  pub fn version_of(&self, name: &str) -> Result<Option<String>, RegistryError> {
    Ok(self.entries()?.into_iter().find(|e| e.name == name).map(|e| e.version))
  }

  /// Record `name` at `version`.
  ///
  /// A name already present has its version replaced in place; a new name is
  /// appended. Either way the store holds at most one line per name.
  pub fn add(&self, name: &str, version: &str) -> Result<(), RegistryError> {
    let line = format!("{} {}", name, version);
    let mut lines = self.read_lines()?;

    if lines.iter().any(|l| line_matches(l, name)) {
      debug!(name, version, "replacing registry entry");
      let mut replaced = false;
      lines.retain_mut(|l| {
        if !line_matches(l, name) {
          true
        } else if !replaced {
          replaced = true;
          *l = line.clone();
          true
        } else {
          false
        }
      });
    } else {
      debug!(name, version, "appending registry entry");
      lines.push(line);
    }

    self.replace_with(&lines)
  }

  /// Remove every entry for `name`.
  ///
  /// Returns `false`, leaving the store untouched, when `name` is absent.
  pub fn remove(&self, name: &str) -> Result<bool, RegistryError> {
    if !self.path.exists() {
      return Ok(false);
    }

    let lines = self.read_lines()?;
    let mut staged = self.stage()?;
    let mut removed = false;
    for line in &lines {
      if line_matches(line, name) {
        removed = true;
      } else {
        writeln!(staged, "{}", line).map_err(|e| self.write_error(e))?;
      }
    }

    if !removed {
      // Dropping the staged file deletes it.
      return Ok(false);
    }

    self.commit(staged)?;
    debug!(name, path = %self.path.display(), "removed registry entry");
    Ok(true)
  }

  fn read_lines(&self) -> Result<Vec<String>, RegistryError> {
    match fs::read_to_string(&self.path) {
      Ok(content) => Ok(content.lines().map(str::to_string).collect()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
      Err(source) => Err(RegistryError::Read {
        path: self.path.clone(),
        source,
      }),
    }
  }

  fn replace_with(&self, lines: &[String]) -> Result<(), RegistryError> {
    let mut staged = self.stage()?;
    for line in lines {
      writeln!(staged, "{}", line).map_err(|e| self.write_error(e))?;
    }
    self.commit(staged)
  }

  fn stage(&self) -> Result<NamedTempFile, RegistryError> {
    let dir = self.ensure_parent()?;
    tempfile::Builder::new()
      .prefix(".installed-")
      .suffix(".tmp")
      .tempfile_in(dir)
      .map_err(|e| self.write_error(e))
  }

  fn commit(&self, staged: NamedTempFile) -> Result<(), RegistryError> {
    staged.as_file().sync_all().map_err(|e| self.write_error(e))?;
    staged.persist(&self.path).map_err(|e| self.write_error(e.error))?;
    // Make the rename itself durable.
    if let Some(dir) = self.path.parent()
      && let Ok(dir) = File::open(dir)
    {
      let _ = dir.sync_all();
    }
    Ok(())
  }

  fn ensure_parent(&self) -> Result<&Path, RegistryError> {
    let dir = self
      .path
      .parent()
      .filter(|p| !p.as_os_str().is_empty())
      .unwrap_or(Path::new("."));
    fs::create_dir_all(dir).map_err(|e| self.write_error(e))?;
    Ok(dir)
  }

  fn write_error(&self, source: io::Error) -> RegistryError {
    RegistryError::Write {
      path: self.path.clone(),
      source,
    }
  }
}

fn line_matches(line: &str, name: &str) -> bool {
  line.split_whitespace().next() == Some(name)
}

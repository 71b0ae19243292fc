//! Types for the build, install and remove pipelines.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::execute::{ExtractError, FetchError, ScriptError, ScriptStatus};
use crate::registry::RegistryError;

/// Pipeline step an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Manifest,
  Prepare,
  Download,
  Verify,
  Extract,
  Locate,
  Build,
  Install,
  Register,
  Remove,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Phase::Manifest => "manifest",
      Phase::Prepare => "prepare",
      Phase::Download => "download",
      Phase::Verify => "verify",
      Phase::Extract => "extract",
      Phase::Locate => "locate",
      Phase::Build => "build",
      Phase::Install => "install",
      Phase::Register => "register",
      Phase::Remove => "remove",
    };
    f.write_str(name)
  }
}

/// Errors that abort a pipeline. Each carries the package it concerns.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("{package}: manifest not found at '{path}'")]
  ManifestNotFound {
    package: String,
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("{package}: invalid manifest '{path}': {reason}")]
  ManifestInvalid {
    package: String,
    path: PathBuf,
    reason: String,
  },

  #[error("{package}: download failed: {source}")]
  DownloadFailed {
    package: String,
    #[source]
    source: FetchError,
  },

  #[error("{package}: checksum mismatch for '{archive}': expected {expected}, got {actual}")]
  ChecksumMismatch {
    package: String,
    archive: PathBuf,
    expected: String,
    actual: String,
  },

  #[error("{package}: extraction failed: {source}")]
  ExtractFailed {
    package: String,
    #[source]
    source: ExtractError,
  },

  #[error("{package}: expected exactly one source directory in '{build_dir}', found {}", describe_found(.found))]
  SourceLayoutUnexpected {
    package: String,
    build_dir: PathBuf,
    found: Vec<String>,
  },

  #[error("{package}: build script failed ({status}); see '{log}'")]
  BuildScriptFailed {
    package: String,
    status: ScriptStatus,
    log: PathBuf,
    tail: Vec<String>,
  },

  #[error("{package}: install script failed ({status}); see '{log}'")]
  InstallScriptFailed {
    package: String,
    status: ScriptStatus,
    log: PathBuf,
    tail: Vec<String>,
  },

  #[error("{package}: {source}")]
  RegistryReadFailed {
    package: String,
    #[source]
    source: RegistryError,
  },

  #[error("{package}: failed to update registry: {source}")]
  RegistryWriteFailed {
    package: String,
    #[source]
    source: RegistryError,
  },

  #[error("{package}: could not run {phase} script: {source}")]
  Script {
    package: String,
    phase: Phase,
    #[source]
    source: ScriptError,
  },

  #[error("{package}: {phase} failed for '{path}': {source}")]
  Io {
    package: String,
    phase: Phase,
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("{package}: not installed")]
  NotInstalled { package: String },
}

impl PipelineError {
  pub fn package(&self) -> &str {
    match self {
      PipelineError::ManifestNotFound { package, .. }
      | PipelineError::ManifestInvalid { package, .. }
      | PipelineError::DownloadFailed { package, .. }
      | PipelineError::ChecksumMismatch { package, .. }
      | PipelineError::ExtractFailed { package, .. }
      | PipelineError::SourceLayoutUnexpected { package, .. }
      | PipelineError::BuildScriptFailed { package, .. }
      | PipelineError::InstallScriptFailed { package, .. }
      | PipelineError::RegistryReadFailed { package, .. }
      | PipelineError::RegistryWriteFailed { package, .. }
      | PipelineError::Script { package, .. }
      | PipelineError::Io { package, .. }
      | PipelineError::NotInstalled { package } => package,
    }
  }

  pub fn phase(&self) -> Phase {
    match self {
      PipelineError::ManifestNotFound { .. } | PipelineError::ManifestInvalid { .. } => Phase::Manifest,
      PipelineError::DownloadFailed { .. } => Phase::Download,
      PipelineError::ChecksumMismatch { .. } => Phase::Verify,
      PipelineError::ExtractFailed { .. } => Phase::Extract,
      PipelineError::SourceLayoutUnexpected { .. } => Phase::Locate,
      PipelineError::BuildScriptFailed { .. } => Phase::Build,
      PipelineError::InstallScriptFailed { .. } => Phase::Install,
      PipelineError::RegistryReadFailed { .. } | PipelineError::RegistryWriteFailed { .. } => Phase::Register,
      PipelineError::Script { phase, .. } | PipelineError::Io { phase, .. } => *phase,
      PipelineError::NotInstalled { .. } => Phase::Remove,
    }
  }

  /// Captured log tail for script failures.
  pub fn log_tail(&self) -> Option<&[String]> {
    match self {
      PipelineError::BuildScriptFailed { tail, .. } | PipelineError::InstallScriptFailed { tail, .. } => Some(tail),
      _ => None,
    }
  }
}

fn describe_found(found: &[String]) -> String {
  if found.is_empty() {
    "none".to_string()
  } else {
    found.join(", ")
  }
}

/// Outcome of a successful build.
#[derive(Debug, Clone)]
pub struct BuildReport {
  pub package: String,
  pub version: String,
  pub build_dir: PathBuf,
  pub source_dir: PathBuf,
  pub prefix: PathBuf,
  pub log: PathBuf,
}

/// Outcome of a successful install.
#[derive(Debug, Clone)]
pub struct InstallReport {
  pub package: String,
  pub version: String,
  pub prefix: PathBuf,
  pub log: PathBuf,
  /// `false` when the install script succeeded but the registry could not
  /// be updated.
  pub registered: bool,
}

/// Outcome of a successful removal.
#[derive(Debug, Clone)]
pub struct RemoveReport {
  pub package: String,
  /// Whether a registry entry was removed.
  pub unregistered: bool,
  /// Prefix directory that was deleted, if one existed.
  pub prefix_removed: Option<PathBuf>,
}

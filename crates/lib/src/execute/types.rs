//! Types shared by the script runner, fetcher and extractor.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// How a script process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptStatus {
  code: Option<i32>,
}

impl ScriptStatus {
  pub fn from_code(code: i32) -> Self {
    Self { code: Some(code) }
  }

  pub fn code(&self) -> Option<i32> {
    self.code
  }

  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}

impl From<std::process::ExitStatus> for ScriptStatus {
  fn from(status: std::process::ExitStatus) -> Self {
    Self { code: status.code() }
  }
}

impl fmt::Display for ScriptStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.code {
      Some(code) => write!(f, "exit code {}", code),
      None => write!(f, "terminated by signal"),
    }
  }
}

/// Result of one script run.
#[derive(Debug, Clone)]
pub struct ScriptOutcome {
  pub status: ScriptStatus,
  /// Log holding the combined stdout/stderr of the run.
  pub log_path: PathBuf,
  /// Last lines of the log; only collected when the script failed.
  pub tail: Vec<String>,
}

/// Internal failures of the script runner.
///
/// A script exiting non-zero is not an error here; see [`ScriptOutcome`].
#[derive(Debug, Error)]
pub enum ScriptError {
  #[error("failed to write temporary script: {0}")]
  WriteScript(#[source] io::Error),

  #[error("failed to start '{interpreter}' in '{working_dir}': {source}")]
  Spawn {
    interpreter: PathBuf,
    working_dir: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Errors from downloading a source archive.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("request to {url} failed: {source}")]
  Request {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("{url} returned HTTP {status}")]
  Status { url: String, status: u16 },

  #[error("failed to read local source '{path}': {source}")]
  Local {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write '{path}': {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Errors from unpacking a source archive.
#[derive(Debug, Error)]
pub enum ExtractError {
  #[error("failed to open archive '{path}': {source}")]
  Open {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to unpack '{archive}' into '{dest}': {source}")]
  Unpack {
    archive: PathBuf,
    dest: PathBuf,
    #[source]
    source: io::Error,
  },
}

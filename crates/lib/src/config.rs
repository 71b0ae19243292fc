//! Root-relative path configuration.
//!
//! A [`Config`] is built once at startup and passed by reference to every
//! component. It owns no mutable state: every directory the package manager
//! touches is derived from the root on demand.
//!
//! # Layout
//!
//! ```text
//! <root>/
//! ├── .lock                                  # advisory lock for mutating commands
//! ├── cache/repo/packages/<name>/manifest.yaml
//! ├── build/<name>/                          # archive, extracted tree, script log
//! ├── opt/<name>/                            # install prefix
//! └── installed/installed.db                 # registry
//! ```

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::consts::{DEFAULT_REPO_URL, MANIFEST_FILENAME, REGISTRY_FILENAME, REPO_URL_ENV, ROOT_ENV};
use crate::platform::paths::root_dir;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("cannot determine tinypkg root: set TINYPKG_ROOT or HOME")]
  NoRoot,

  #[error("failed to create directory '{path}': {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  root: PathBuf,
  repo_url: String,
}

impl Config {
  /// Build a configuration rooted at `root` using the default index URL.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
      repo_url: DEFAULT_REPO_URL.to_string(),
    }
  }

  /// Resolve the configuration from the environment.
  ///
  /// Reads `TINYPKG_ROOT` (falling back to `$HOME/.tinypkg`) and
  /// `TINYPKG_REPO_URL`.
  pub fn from_env() -> Result<Self, ConfigError> {
    let root = root_dir().ok_or(ConfigError::NoRoot)?;
    let mut config = Self::new(root);
    if let Ok(url) = std::env::var(REPO_URL_ENV)
      && !url.is_empty()
    {
      config.repo_url = url;
    }
    Ok(config)
  }

  pub fn with_repo_url(mut self, url: impl Into<String>) -> Self {
    self.repo_url = url.into();
    self
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn repo_url(&self) -> &str {
    &self.repo_url
  }

  pub fn cache_dir(&self) -> PathBuf {
    self.root.join("cache")
  }

  /// Local clone of the package index.
  pub fn repo_dir(&self) -> PathBuf {
    self.cache_dir().join("repo")
  }

  pub fn packages_dir(&self) -> PathBuf {
    self.repo_dir().join("packages")
  }

  pub fn manifest_path(&self, package: &str) -> PathBuf {
    join_segment(&self.packages_dir(), package).join(MANIFEST_FILENAME)
  }

  pub fn build_root(&self) -> PathBuf {
    self.root.join("build")
  }

  pub fn package_build_dir(&self, package: &str) -> PathBuf {
    join_segment(&self.build_root(), package)
  }

  pub fn prefix_root(&self) -> PathBuf {
    self.root.join("opt")
  }

  /// Installation prefix exported to build and install scripts as `PREFIX`.
  pub fn package_prefix(&self, package: &str) -> PathBuf {
    join_segment(&self.prefix_root(), package)
  }

  pub fn installed_dir(&self) -> PathBuf {
    self.root.join("installed")
  }

  pub fn registry_path(&self) -> PathBuf {
    self.installed_dir().join(REGISTRY_FILENAME)
  }

  pub fn lock_path(&self) -> PathBuf {
    self.root.join(".lock")
  }

  /// Create the directory skeleton. Existing directories are not an error.
  pub fn ensure_dirs(&self) -> Result<(), ConfigError> {
    for dir in [
      self.root.clone(),
      self.cache_dir(),
      self.build_root(),
      self.installed_dir(),
      self.prefix_root(),
    ] {
      fs::create_dir_all(&dir).map_err(|source| ConfigError::CreateDir { path: dir.clone(), source })?;
    }
    debug!(root = %self.root.display(), "directory layout ready");
    Ok(())
  }
}

/// Join a single trusted segment onto `base`.
///
/// Package names are validated before they reach the library, so a segment
/// that is not one normal path component is a caller bug.
fn join_segment(base: &Path, segment: &str) -> PathBuf {
  debug_assert!(
    matches!(Path::new(segment).components().collect::<Vec<_>>().as_slice(), [Component::Normal(_)]),
    "path segment must be a single normal component: {segment:?}"
  );
  base.join(segment)
}

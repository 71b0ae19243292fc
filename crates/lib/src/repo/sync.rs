//! Cloning the package index with gix.
//!
//! A sync always produces a fresh clone in a staging directory under
//! `<root>/cache` and only then swaps it over `<root>/cache/repo`. A failed
//! clone leaves the previous index untouched.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum SyncError {
  #[error("failed to create directory '{path}': {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to clone package index '{url}': {source}")]
  Clone {
    url: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("failed to check out package index '{url}': {source}")]
  Checkout {
    url: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("failed to move fresh index into '{path}': {source}")]
  Swap {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Result of a successful sync.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
  pub path: PathBuf,
  /// Commit checked out, when HEAD could be resolved.
  pub commit: Option<String>,
  /// Whether an earlier index was replaced.
  pub replaced: bool,
}

/// Bring `<root>/cache/repo` up to date with the configured index URL.
pub fn sync(config: &Config) -> Result<SyncOutcome, SyncError> {
  let url = config.repo_url();
  let cache_dir = config.cache_dir();
  let repo_dir = config.repo_dir();

  fs::create_dir_all(&cache_dir).map_err(|source| SyncError::CreateDir {
    path: cache_dir.clone(),
    source,
  })?;

  let staging = tempfile::Builder::new()
    .prefix(".repo-")
    .tempdir_in(&cache_dir)
    .map_err(|source| SyncError::CreateDir {
      path: cache_dir.clone(),
      source,
    })?;
  let fresh = staging.path().join("repo");

  info!(url, path = %repo_dir.display(), "syncing package index");
  let repo = clone_repo(url, &fresh)?;
  let commit = match repo.head_id() {
    Ok(id) => Some(id.to_string()),
    Err(e) => {
      warn!(url, error = %e, "could not resolve HEAD of package index");
      None
    }
  };
  drop(repo);

  let replaced = swap_into_place(&fresh, &repo_dir, staging.path())?;
  debug!(path = %repo_dir.display(), ?commit, replaced, "package index in place");

  Ok(SyncOutcome {
    path: repo_dir,
    commit,
    replaced,
  })
}

fn clone_repo(url: &str, dest: &Path) -> Result<gix::Repository, SyncError> {
  let mut prepared = gix::prepare_clone(url, dest).map_err(|e| SyncError::Clone {
    url: url.to_string(),
    source: Box::new(e),
  })?;

  let (mut checkout, _outcome) = prepared
    .fetch_then_checkout(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
    .map_err(|e| SyncError::Clone {
      url: url.to_string(),
      source: Box::new(e),
    })?;

  let (repo, _outcome) = checkout
    .main_worktree(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
    .map_err(|e| SyncError::Checkout {
      url: url.to_string(),
      source: Box::new(e),
    })?;

  Ok(repo)
}

/// Move `fresh` to `target`, parking any existing `target` inside `parking`
/// (which is deleted afterwards with the staging directory).
fn swap_into_place(fresh: &Path, target: &Path, parking: &Path) -> Result<bool, SyncError> {
  let swap_error = |source| SyncError::Swap {
    path: target.to_path_buf(),
    source,
  };

  if !target.exists() {
    fs::rename(fresh, target).map_err(swap_error)?;
    return Ok(false);
  }

  let old = parking.join("previous");
  fs::rename(target, &old).map_err(swap_error)?;
  if let Err(e) = fs::rename(fresh, target) {
    if let Err(restore) = fs::rename(&old, target) {
      warn!(path = %target.display(), error = %restore, "could not restore previous package index");
    }
    return Err(swap_error(e));
  }
  Ok(true)
}

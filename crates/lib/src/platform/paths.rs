use crate::consts::{DEFAULT_ROOT_DIR, ROOT_ENV};
use std::path::PathBuf;

/// Returns the user's home directory, if `HOME` is set and non-empty.
pub fn home_dir() -> Option<PathBuf> {
  std::env::var_os("HOME")
    .filter(|home| !home.is_empty())
    .map(PathBuf::from)
}

/// Returns the tinypkg root directory.
///
/// `TINYPKG_ROOT` takes precedence; otherwise `$HOME/.tinypkg`.
pub fn root_dir() -> Option<PathBuf> {
  if let Some(root) = std::env::var_os(ROOT_ENV).filter(|root| !root.is_empty()) {
    return Some(PathBuf::from(root));
  }
  home_dir().map(|home| home.join(DEFAULT_ROOT_DIR))
}

//! Implementation of the `tinypkg update` command.

use anyhow::Result;

use tinypkg_lib::config::Config;
use tinypkg_lib::lock::{LockMode, RootLock};
use tinypkg_lib::repo;

use super::load_config;
use crate::output::{print_info, print_stat, print_success, truncate_hash};

pub fn cmd_update() -> Result<()> {
  let config = load_config()?;
  let _lock = RootLock::acquire(&config, LockMode::Exclusive, "update")?;
  sync_index(&config)
}

/// Sync the package index, reporting progress on stdout.
///
/// The caller must hold an exclusive lock.
pub(crate) fn sync_index(config: &Config) -> Result<()> {
  print_info(&format!("Syncing package index from {}", config.repo_url()));
  let outcome = repo::sync(config)?;

  print_success("Package index up to date");
  if let Some(commit) = &outcome.commit {
    print_stat("Commit", truncate_hash(commit));
  }
  Ok(())
}

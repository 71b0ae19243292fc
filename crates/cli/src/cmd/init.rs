use anyhow::Result;

use super::load_config;
use crate::output::{print_stat, print_success};

pub fn cmd_init() -> Result<()> {
  let config = load_config()?;
  config.ensure_dirs()?;

  print_success("Initialized tinypkg");
  print_stat("Root", &config.root().display().to_string());
  print_stat("Index", config.repo_url());
  Ok(())
}

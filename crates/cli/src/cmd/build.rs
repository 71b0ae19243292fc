use std::time::Instant;

use anyhow::Result;

use tinypkg_lib::lock::{LockMode, RootLock};
use tinypkg_lib::pipeline::Pipeline;

use super::load_config;
use super::update::sync_index;
use crate::output::{format_duration, print_info, print_stat, print_success};

pub fn cmd_build(package: &str, offline: bool) -> Result<()> {
  let start = Instant::now();
  let config = load_config()?;
  let _lock = RootLock::acquire(&config, LockMode::Exclusive, "build")?;
  config.ensure_dirs()?;

  if !offline {
    sync_index(&config)?;
  }

  print_info(&format!("Building {}", package));
  let report = Pipeline::new(&config).build(package)?;

  print_success(&format!("Built {} {}", report.package, report.version));
  print_stat("Source", &report.source_dir.display().to_string());
  print_stat("Log", &report.log.display().to_string());
  print_stat("Duration", &format_duration(start.elapsed()));
  Ok(())
}

use std::time::Instant;

use anyhow::Result;

use tinypkg_lib::lock::{LockMode, RootLock};
use tinypkg_lib::pipeline::Pipeline;

use super::load_config;
use super::update::sync_index;
use crate::output::{format_duration, print_info, print_stat, print_success, print_warning};

pub fn cmd_install(package: &str, offline: bool, skip_build: bool) -> Result<()> {
  let start = Instant::now();
  let config = load_config()?;
  let _lock = RootLock::acquire(&config, LockMode::Exclusive, "install")?;
  config.ensure_dirs()?;

  if !offline {
    sync_index(&config)?;
  }

  let pipeline = Pipeline::new(&config);
  if !skip_build {
    print_info(&format!("Building {}", package));
    pipeline.build(package)?;
  }

  print_info(&format!("Installing {}", package));
  let report = pipeline.install(package)?;

  if !report.registered {
    print_warning(&format!(
      "{} was installed but could not be recorded in {}",
      report.package,
      config.registry_path().display()
    ));
  }
  print_success(&format!("Installed {} {}", report.package, report.version));
  print_stat("Prefix", &report.prefix.display().to_string());
  print_stat("Duration", &format_duration(start.elapsed()));
  Ok(())
}

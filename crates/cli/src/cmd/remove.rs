use anyhow::Result;

use tinypkg_lib::lock::{LockMode, RootLock};
use tinypkg_lib::pipeline::Pipeline;

use super::load_config;
use crate::output::{print_stat, print_success, print_warning};

pub fn cmd_remove(package: &str) -> Result<()> {
  let config = load_config()?;
  let _lock = RootLock::acquire(&config, LockMode::Exclusive, "remove")?;

  let report = Pipeline::new(&config).remove(package)?;

  if !report.unregistered {
    print_warning(&format!("{} was not in the registry", report.package));
  }
  print_success(&format!("Removed {}", report.package));
  if let Some(prefix) = &report.prefix_removed {
    print_stat("Deleted", &prefix.display().to_string());
  }
  Ok(())
}

use anyhow::Result;

use tinypkg_lib::lock::{LockMode, RootLock};
use tinypkg_lib::pipeline::Pipeline;

use super::load_config;
use crate::output::{OutputFormat, print_info, print_json};

pub fn cmd_list(output: OutputFormat) -> Result<()> {
  let config = load_config()?;
  let _lock = RootLock::acquire(&config, LockMode::Shared, "list")?;

  let entries = Pipeline::new(&config).list_installed()?;

  if output.is_json() {
    return print_json(&entries);
  }

  if entries.is_empty() {
    print_info("No packages installed");
    return Ok(());
  }
  for entry in &entries {
    println!("{} {}", entry.name, entry.version);
  }
  Ok(())
}

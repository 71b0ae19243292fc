use anyhow::Result;
use serde::Serialize;

use tinypkg_lib::lock::{LockMode, RootLock};
use tinypkg_lib::manifest::Manifest;
use tinypkg_lib::registry::Registry;
use tinypkg_lib::repo;

use super::load_config;
use crate::output::{OutputFormat, print_json, print_stat};

#[derive(Serialize)]
struct PackageInfo {
  #[serde(flatten)]
  manifest: Manifest,
  installed: Option<String>,
}

pub fn cmd_info(package: &str, output: OutputFormat) -> Result<()> {
  let config = load_config()?;
  let _lock = RootLock::acquire(&config, LockMode::Shared, "info")?;

  let manifest = repo::info(&config, package)?;
  let installed = Registry::open(&config).version_of(package)?;

  if output.is_json() {
    return print_json(&PackageInfo { manifest, installed });
  }

  let name = if manifest.name.is_empty() { package } else { manifest.name.as_str() };
  println!("{}", name);
  print_stat("Version", manifest.version_or_unknown());
  if !manifest.description.is_empty() {
    print_stat("Description", &manifest.description);
  }
  print_stat("Source", &manifest.source);
  if !manifest.checksum.is_empty() {
    print_stat("Checksum", &manifest.checksum);
  }
  print_stat("Installed", installed.as_deref().unwrap_or("no"));
  Ok(())
}

use anyhow::Result;
use owo_colors::{OwoColorize, Stream};

use tinypkg_lib::lock::{LockMode, RootLock};
use tinypkg_lib::repo;

use super::load_config;
use crate::output::{OutputFormat, print_info, print_json};

pub fn cmd_search(term: &str, output: OutputFormat) -> Result<()> {
  let config = load_config()?;
  let _lock = RootLock::acquire(&config, LockMode::Shared, "search")?;

  let found = repo::search(&config, term)?;

  if output.is_json() {
    return print_json(&found);
  }

  if found.is_empty() {
    print_info(&format!("No packages match '{}'", term));
    return Ok(());
  }
  for entry in &found {
    let version = if entry.version.is_empty() { "-" } else { entry.version.as_str() };
    println!(
      "{} {} {}",
      entry.name.if_supports_color(Stream::Stdout, |s| s.cyan()),
      version.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      entry.description
    );
  }
  Ok(())
}

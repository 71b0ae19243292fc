mod build;
mod info;
mod init;
mod install;
mod list;
mod remove;
mod search;
mod update;

pub use build::cmd_build;
pub use info::cmd_info;
pub use init::cmd_init;
pub use install::cmd_install;
pub use list::cmd_list;
pub use remove::cmd_remove;
pub use search::cmd_search;
pub use update::cmd_update;

use anyhow::Result;
use tracing::debug;

use tinypkg_lib::config::Config;
use tinypkg_lib::consts::MAX_PACKAGE_NAME_LEN;

/// Resolve the configuration from the environment.
fn load_config() -> Result<Config> {
  let config = Config::from_env()?;
  debug!(root = %config.root().display(), repo = config.repo_url(), "resolved configuration");
  Ok(config)
}

/// Accept package names made of ASCII letters, digits, `-` and `_`.
///
/// Names become path segments and appear in scripts, so anything else is
/// rejected before it reaches the library.
pub fn parse_package_name(value: &str) -> Result<String, String> {
  if value.is_empty() {
    return Err("package name must not be empty".to_string());
  }
  if value.len() > MAX_PACKAGE_NAME_LEN {
    return Err(format!("package name is longer than {} characters", MAX_PACKAGE_NAME_LEN));
  }
  if let Some(bad) = value
    .chars()
    .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
  {
    return Err(format!("invalid character {:?} in package name", bad));
  }
  Ok(value.to_string())
}

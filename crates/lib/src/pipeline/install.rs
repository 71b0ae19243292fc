use std::fs;
use std::io;

use tracing::{info, warn};

use super::{Phase, Pipeline, PipelineError, resolve_source_dir};
use crate::execute::{Executor, Fetcher};
use crate::pipeline::{InstallReport, RemoveReport};

impl<F: Fetcher, E: Executor> Pipeline<'_, F, E> {
  /// Run the install script of an already built `package` and record it.
  ///
  /// Once the install script has succeeded the package counts as installed:
  /// a registry write failure is logged and reported through
  /// [`InstallReport::registered`] instead of failing the operation.
  pub fn install(&self, package: &str) -> Result<InstallReport, PipelineError> {
    let manifest = self.load_manifest(package)?;
    let build_dir = self.config.package_build_dir(package);
    let prefix = self.config.package_prefix(package);
    let version = manifest.version_or_unknown().to_string();

    let source_dir = resolve_source_dir(package, &build_dir)?;

    info!(package, version = %version, prefix = %prefix.display(), "running install script");
    let outcome = self
      .runner
      .run(&manifest.install, &source_dir, &prefix)
      .map_err(|source| PipelineError::Script {
        package: package.to_string(),
        phase: Phase::Install,
        source,
      })?;

    if !outcome.status.success() {
      return Err(PipelineError::InstallScriptFailed {
        package: package.to_string(),
        status: outcome.status,
        log: outcome.log_path,
        tail: outcome.tail,
      });
    }

    let registered = match self.registry().add(package, &version) {
      Ok(()) => true,
      Err(e) => {
        warn!(package, error = %e, "installed but could not record in registry");
        false
      }
    };

    info!(package, version = %version, "installed");
    Ok(InstallReport {
      package: package.to_string(),
      version,
      prefix,
      log: outcome.log_path,
      registered,
    })
  }

  /// Forget `package` and delete its install prefix.
  ///
  /// The build directory is kept.
  pub fn remove(&self, package: &str) -> Result<RemoveReport, PipelineError> {
    let unregistered = self
      .registry()
      .remove(package)
      .map_err(|source| PipelineError::RegistryWriteFailed {
        package: package.to_string(),
        source,
      })?;

    let prefix = self.config.package_prefix(package);
    let prefix_removed = match fs::remove_dir_all(&prefix) {
      Ok(()) => Some(prefix),
      Err(e) if e.kind() == io::ErrorKind::NotFound => None,
      Err(source) => {
        return Err(PipelineError::Io {
          package: package.to_string(),
          phase: Phase::Remove,
          path: prefix,
          source,
        });
      }
    };

    if !unregistered && prefix_removed.is_none() {
      return Err(PipelineError::NotInstalled {
        package: package.to_string(),
      });
    }

    info!(package, unregistered, prefix_removed = prefix_removed.is_some(), "removed");
    Ok(RemoveReport {
      package: package.to_string(),
      unregistered,
      prefix_removed,
    })
  }
}

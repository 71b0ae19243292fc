//! Build, install and remove pipelines.
//!
//! Every step gates the next: the first failure aborts the operation and is
//! returned with the package and phase it happened in. Nothing is retried and
//! nothing resumes from a checkpoint; re-running a command repeats all of its
//! steps against the (reused) build directory.
//!
//! ```text
//! build:   manifest → build dir → download → verify → extract → record source dir → build script
//! install: manifest → recorded source dir → install script → registry
//! remove:  registry → prefix
//! ```

mod build;
mod install;
mod types;

pub use types::{BuildReport, InstallReport, Phase, PipelineError, RemoveReport};

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::config::Config;
use crate::consts::SOURCE_DIR_MARKER;
use crate::execute::{Executor, Fetcher, HttpFetcher, ScriptRunner, ShellExecutor};
use crate::manifest::{self, Manifest, ManifestError};
use crate::registry::{Registry, RegistryEntry};

/// Entry point for package operations against one configuration.
pub struct Pipeline<'a, F = HttpFetcher, E = ShellExecutor> {
  config: &'a Config,
  fetcher: F,
  runner: ScriptRunner<E>,
}

impl<'a> Pipeline<'a> {
  /// Pipeline using real downloads and real processes.
  pub fn new(config: &'a Config) -> Self {
    Self::with_parts(config, HttpFetcher, ShellExecutor)
  }
}

impl<'a, F: Fetcher, E: Executor> Pipeline<'a, F, E> {
  pub fn with_parts(config: &'a Config, fetcher: F, executor: E) -> Self {
    Self {
      config,
      fetcher,
      runner: ScriptRunner::with_executor(executor),
    }
  }

  pub fn registry(&self) -> Registry {
    Registry::open(self.config)
  }

  pub fn is_installed(&self, package: &str) -> Result<bool, PipelineError> {
    self.registry().contains(package).map_err(|source| PipelineError::RegistryReadFailed {
      package: package.to_string(),
      source,
    })
  }

  pub fn list_installed(&self) -> Result<Vec<RegistryEntry>, PipelineError> {
    self.registry().entries().map_err(|source| PipelineError::RegistryReadFailed {
      package: String::from("*"),
      source,
    })
  }

  fn load_manifest(&self, package: &str) -> Result<Manifest, PipelineError> {
    manifest::decode(self.config, package).map_err(|e| {
      let path = self.config.manifest_path(package);
      match e {
        ManifestError::NotFound { source, .. } | ManifestError::Read { source, .. } => {
          PipelineError::ManifestNotFound {
            package: package.to_string(),
            path,
            source,
          }
        }
        ManifestError::Invalid(reason) => PipelineError::ManifestInvalid {
          package: package.to_string(),
          path,
          reason: reason.to_string(),
        },
      }
    })
  }
}

/// Remember `name` as the source tree of the build in `build_dir`.
fn record_source_dir(package: &str, build_dir: &Path, name: &str) -> Result<(), PipelineError> {
  let marker = build_dir.join(SOURCE_DIR_MARKER);
  fs::write(&marker, format!("{name}\n")).map_err(|source| PipelineError::Io {
    package: package.to_string(),
    phase: Phase::Locate,
    path: marker,
    source,
  })
}

/// Source tree the last build of `package` ran in.
///
/// Uses the name recorded by `build`. Build directories without a usable
/// record fall back to [`locate_source_dir`].
pub fn resolve_source_dir(package: &str, build_dir: &Path) -> Result<PathBuf, PipelineError> {
  let marker = build_dir.join(SOURCE_DIR_MARKER);
  match fs::read_to_string(&marker) {
    Ok(content) => {
      let name = content.trim();
      let mut components = Path::new(name).components();
      if let (Some(Component::Normal(_)), None) = (components.next(), components.next()) {
        let dir = build_dir.join(name);
        if dir.is_dir() {
          return Ok(dir);
        }
      }
      debug!(package, marker = %marker.display(), "recorded source dir unusable; scanning build dir");
    }
    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
    Err(source) => {
      return Err(PipelineError::Io {
        package: package.to_string(),
        phase: Phase::Locate,
        path: marker,
        source,
      });
    }
  }
  locate_source_dir(package, build_dir)
}

/// Find the directory a source archive unpacked into.
///
/// The build directory must contain exactly one non-hidden subdirectory;
/// none or several is reported rather than guessed at.
pub fn locate_source_dir(package: &str, build_dir: &Path) -> Result<PathBuf, PipelineError> {
  let entries = fs::read_dir(build_dir).map_err(|source| PipelineError::Io {
    package: package.to_string(),
    phase: Phase::Locate,
    path: build_dir.to_path_buf(),
    source,
  })?;

  let mut found: Vec<String> = entries
    .filter_map(Result::ok)
    .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
    .filter(|entry| entry.path().is_dir())
    .map(|entry| entry.file_name().to_string_lossy().into_owned())
    .collect();
  found.sort();

  match found.as_slice() {
    [single] => Ok(build_dir.join(single)),
    _ => Err(PipelineError::SourceLayoutUnexpected {
      package: package.to_string(),
      build_dir: build_dir.to_path_buf(),
      found,
    }),
  }
}

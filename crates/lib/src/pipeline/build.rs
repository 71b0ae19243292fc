use std::fs;

use tracing::{info, warn};

use super::{Phase, Pipeline, PipelineError, record_source_dir};
use crate::consts::ARCHIVE_FILENAME;
use crate::execute::{Executor, Fetcher, extract_archive};
use crate::pipeline::BuildReport;
use crate::util::hash::{ExpectedChecksum, hash_file};

impl<F: Fetcher, E: Executor> Pipeline<'_, F, E> {
  /// Fetch, unpack and build `package` inside `<root>/build/<package>`.
  ///
  /// The build directory is reused between runs. A previous archive is
  /// overwritten and extraction replaces files already present. Trees left
  /// by earlier versions stay on disk; the script runs in the one directory
  /// this archive unpacks to, which is recorded for `install`.
  pub fn build(&self, package: &str) -> Result<BuildReport, PipelineError> {
    let manifest = self.load_manifest(package)?;
    let build_dir = self.config.package_build_dir(package);
    let prefix = self.config.package_prefix(package);

    info!(package, version = manifest.version_or_unknown(), "building");

    fs::create_dir_all(&build_dir).map_err(|source| PipelineError::Io {
      package: package.to_string(),
      phase: Phase::Prepare,
      path: build_dir.clone(),
      source,
    })?;

    let archive = build_dir.join(ARCHIVE_FILENAME);
    info!(package, url = %manifest.source, "downloading source");
    self
      .fetcher
      .fetch(&manifest.source, &archive)
      .map_err(|source| PipelineError::DownloadFailed {
        package: package.to_string(),
        source,
      })?;

    match ExpectedChecksum::parse(&manifest.checksum) {
      ExpectedChecksum::None => {}
      ExpectedChecksum::Unsupported(value) => {
        warn!(package, checksum = %value, "unrecognized checksum format; skipping verification");
      }
      ExpectedChecksum::Sha256(expected) => {
        let actual = hash_file(&archive).map_err(|source| PipelineError::Io {
          package: package.to_string(),
          phase: Phase::Verify,
          path: archive.clone(),
          source,
        })?;
        if actual != expected {
          return Err(PipelineError::ChecksumMismatch {
            package: package.to_string(),
            archive,
            expected,
            actual,
          });
        }
        info!(package, sha256 = %actual, "checksum verified");
      }
    }

    info!(package, archive = %archive.display(), "extracting");
    let roots = extract_archive(&archive, &build_dir).map_err(|source| PipelineError::ExtractFailed {
      package: package.to_string(),
      source,
    })?;

    if roots.len() != 1 {
      return Err(PipelineError::SourceLayoutUnexpected {
        package: package.to_string(),
        build_dir,
        found: roots,
      });
    }
    record_source_dir(package, &build_dir, &roots[0])?;
    let source_dir = build_dir.join(&roots[0]);

    info!(package, dir = %source_dir.display(), "running build script");
    let outcome = self
      .runner
      .run(&manifest.build, &source_dir, &prefix)
      .map_err(|source| PipelineError::Script {
        package: package.to_string(),
        phase: Phase::Build,
        source,
      })?;

    if !outcome.status.success() {
      return Err(PipelineError::BuildScriptFailed {
        package: package.to_string(),
        status: outcome.status,
        log: outcome.log_path,
        tail: outcome.tail,
      });
    }

    info!(package, "build complete");
    Ok(BuildReport {
      package: package.to_string(),
      version: manifest.version_or_unknown().to_string(),
      build_dir,
      source_dir,
      prefix,
      log: outcome.log_path,
    })
  }
}

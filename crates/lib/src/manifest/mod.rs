//! Package manifest decoding.
//!
//! Manifests live at `<root>/cache/repo/packages/<name>/manifest.yaml` and use
//! a small line-oriented subset of YAML:
//!
//! ```text
//! name: hello
//! version: 2.12
//! source: https://ftp.gnu.org/gnu/hello/hello-2.12.tar.gz
//! build: |
//!   ./configure --prefix="$PREFIX"
//!   make
//! install: make install
//! ```
//!
//! `build` and `install` accept either a one-line script or a `|` block whose
//! indented continuation lines are joined with their indentation stripped.

mod types;

pub use types::{InvalidReason, Manifest, ManifestError};

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::config::Config;

/// Load and decode the manifest for `package` from the synced repository.
///
/// `package` must already be a validated identifier.
pub fn decode(config: &Config, package: &str) -> Result<Manifest, ManifestError> {
  let path = config.manifest_path(package);
  let manifest = decode_file(&path)?;
  debug!(package, path = %path.display(), version = %manifest.version, "decoded manifest");
  Ok(manifest)
}

/// Decode the manifest at `path`.
pub fn decode_file(path: &Path) -> Result<Manifest, ManifestError> {
  let text = fs::read_to_string(path).map_err(|source| {
    if source.kind() == io::ErrorKind::InvalidData {
      ManifestError::Read {
        path: path.to_path_buf(),
        source,
      }
    } else {
      ManifestError::NotFound {
        path: path.to_path_buf(),
        source,
      }
    }
  })?;
  parse(&text)
}

/// Decode manifest text.
pub fn parse(text: &str) -> Result<Manifest, ManifestError> {
  let mut manifest = Manifest::default();
  let mut lines = text.lines().peekable();

  while let Some(line) = lines.next() {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
      continue;
    }

    let Some((key, value)) = trimmed.split_once(':') else {
      continue;
    };
    let key = key.trim_end();
    let value = value.trim_start();

    match key {
      "build" | "install" => {
        let script = if value.starts_with('|') {
          let mut block = Vec::new();
          while let Some(next) = lines.next_if(|l| is_block_continuation(l)) {
            block.push(next.trim_start_matches([' ', '\t']));
          }
          join_block(block)
        } else {
          unquote(value).to_string()
        };
        if key == "build" {
          manifest.build = script;
        } else {
          manifest.install = script;
        }
      }
      "name" => manifest.name = unquote(value).to_string(),
      "version" => manifest.version = unquote(value).to_string(),
      "description" => manifest.description = unquote(value).to_string(),
      "source" => manifest.source = unquote(value).to_string(),
      "checksum" => manifest.checksum = unquote(value).to_string(),
      _ => {}
    }
  }

  if manifest.source.is_empty() {
    return Err(ManifestError::Invalid(InvalidReason::MissingSource));
  }

  Ok(manifest)
}

/// Indented lines continue a block; so do blank lines, which may separate
/// paragraphs of a script.
fn is_block_continuation(line: &str) -> bool {
  line.starts_with([' ', '\t']) || line.trim().is_empty()
}

fn join_block(mut lines: Vec<&str>) -> String {
  while lines.last().is_some_and(|l| l.trim().is_empty()) {
    lines.pop();
  }
  if lines.is_empty() {
    return String::new();
  }
  let mut script = lines.join("\n");
  script.push('\n');
  script
}

/// Strip one pair of matching surrounding quotes.
fn unquote(value: &str) -> &str {
  for quote in ['"', '\''] {
    if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
      return &value[1..value.len() - 1];
    }
  }
  value
}

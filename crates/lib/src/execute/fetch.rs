//! Source archive download.
//!
//! `http(s)://` URLs are fetched with a blocking `reqwest` client; `file://`
//! URLs are copied from the local filesystem. Either way the payload is staged
//! in a temporary file beside the destination and renamed into place, so a
//! failed transfer never leaves a truncated archive behind.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::consts::APP_NAME;
use crate::execute::types::FetchError;

/// Capability to transfer a whole file from a URL.
pub trait Fetcher {
  fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
  fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
    (**self).fetch(url, dest)
  }
}

/// Default fetcher backed by `reqwest`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFetcher;

impl Fetcher for HttpFetcher {
  fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
    info!(url = %url, dest = %dest.display(), "fetching source");

    let mut staged = stage_beside(dest)?;

    let size = match url.strip_prefix("file://") {
      Some(local) => copy_local(Path::new(local), staged.as_file_mut())?,
      None => download(url, staged.as_file_mut())?,
    };

    staged.as_file().sync_all().map_err(|source| write_error(dest, source))?;
    staged
      .persist(dest)
      .map_err(|e| write_error(dest, e.error))?;

    info!(path = %dest.display(), size, "download complete");
    Ok(())
  }
}

fn download(url: &str, out: &mut File) -> Result<u64, FetchError> {
  let client = reqwest::blocking::Client::builder()
    .user_agent(format!("{}/{}", APP_NAME, env!("CARGO_PKG_VERSION")))
    .build()
    .map_err(|source| FetchError::Request {
      url: url.to_string(),
      source,
    })?;

  let mut response = client.get(url).send().map_err(|source| FetchError::Request {
    url: url.to_string(),
    source,
  })?;

  if !response.status().is_success() {
    return Err(FetchError::Status {
      url: url.to_string(),
      status: response.status().as_u16(),
    });
  }

  response.copy_to(out).map_err(|source| FetchError::Request {
    url: url.to_string(),
    source,
  })
}

fn copy_local(path: &Path, out: &mut File) -> Result<u64, FetchError> {
  debug!(path = %path.display(), "copying local source");
  let mut input = File::open(path).map_err(|source| FetchError::Local {
    path: path.to_path_buf(),
    source,
  })?;
  io::copy(&mut input, out).map_err(|source| FetchError::Local {
    path: path.to_path_buf(),
    source,
  })
}

fn stage_beside(dest: &Path) -> Result<NamedTempFile, FetchError> {
  let dir = dest.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
  fs::create_dir_all(dir).map_err(|source| write_error(dest, source))?;
  tempfile::Builder::new()
    .prefix(".download-")
    .tempfile_in(dir)
    .map_err(|source| write_error(dest, source))
}

fn write_error(dest: &Path, source: io::Error) -> FetchError {
  FetchError::Write {
    path: PathBuf::from(dest),
    source,
  }
}

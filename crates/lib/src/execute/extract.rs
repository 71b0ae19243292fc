//! Source archive extraction.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Component, Path};

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use tar::{Archive, EntryType};
use tracing::{debug, info};
use xz2::read::XzDecoder;

use crate::execute::types::ExtractError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const XZ_MAGIC: [u8; 6] = [0xfd, b'7', b'z', b'X', b'Z', 0x00];
const BZIP2_MAGIC: &[u8] = b"BZh";

/// Compression wrapped around the tar stream, detected from leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compression {
  Gzip,
  Xz,
  Bzip2,
  Plain,
}

impl Compression {
  fn sniff(head: &[u8]) -> Self {
    if head.starts_with(&GZIP_MAGIC) {
      Compression::Gzip
    } else if head.starts_with(&XZ_MAGIC) {
      Compression::Xz
    } else if head.starts_with(BZIP2_MAGIC) {
      Compression::Bzip2
    } else {
      Compression::Plain
    }
  }
}

/// Unpack a tar archive into `dest`.
///
/// The compression (gzip, xz, bzip2 or plain) is detected from the content,
/// not the file name. Entries are written as-is, top-level directories
/// included, and existing files are overwritten. Entries whose paths would
/// escape `dest` are skipped.
///
/// Returns the sorted names of the non-hidden directories at the top of the
/// archive, so callers know what this archive contributed to `dest` even when
/// `dest` already holds trees from earlier archives.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<Vec<String>, ExtractError> {
  let unpack_error = |source: io::Error| ExtractError::Unpack {
    archive: archive.to_path_buf(),
    dest: dest.to_path_buf(),
    source,
  };

  let mut file = File::open(archive).map_err(|source| ExtractError::Open {
    path: archive.to_path_buf(),
    source,
  })?;

  let mut head = Vec::with_capacity(XZ_MAGIC.len());
  (&mut file)
    .take(XZ_MAGIC.len() as u64)
    .read_to_end(&mut head)
    .map_err(unpack_error)?;
  file.seek(SeekFrom::Start(0)).map_err(unpack_error)?;

  let compression = Compression::sniff(&head);
  debug!(archive = %archive.display(), ?compression, "detected archive compression");

  let reader = BufReader::new(file);
  let stream: Box<dyn Read> = match compression {
    Compression::Gzip => Box::new(GzDecoder::new(reader)),
    Compression::Xz => Box::new(XzDecoder::new(reader)),
    Compression::Bzip2 => Box::new(BzDecoder::new(reader)),
    Compression::Plain => Box::new(reader),
  };
  let roots = unpack(Archive::new(stream), dest).map_err(unpack_error)?;

  info!(archive = %archive.display(), dest = %dest.display(), roots = ?roots, "unpacked archive");
  Ok(roots)
}

/// Unpack entry by entry, recording top-level directories on the way.
///
/// Directory entries are applied last so a read-only directory mode does not
/// block the files inside it.
fn unpack<R: Read>(mut archive: Archive<R>, dest: &Path) -> io::Result<Vec<String>> {
  archive.set_overwrite(true);
  archive.set_preserve_mtime(true);
  fs::create_dir_all(dest)?;

  let mut roots = BTreeSet::new();
  let mut directories = Vec::new();
  for entry in archive.entries()? {
    let mut entry = entry?;
    let is_dir = entry.header().entry_type() == EntryType::Directory;
    if let Some(root) = top_level_dir(&entry.path()?, is_dir) {
      roots.insert(root);
    }
    if is_dir {
      directories.push(entry);
    } else {
      entry.unpack_in(dest)?;
    }
  }
  for mut dir in directories {
    dir.unpack_in(dest)?;
  }

  Ok(roots.into_iter().collect())
}

/// First path component of an entry when it names a non-hidden directory.
fn top_level_dir(path: &Path, is_dir: bool) -> Option<String> {
  let mut components = path.components().filter(|c| !matches!(c, Component::CurDir));
  let Some(Component::Normal(first)) = components.next() else {
    return None;
  };
  let nested = components.next().is_some();
  let name = first.to_string_lossy();
  ((nested || is_dir) && !name.starts_with('.')).then(|| name.into_owned())
}

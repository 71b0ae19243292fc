//! Names and fixed values shared across the crate.

pub const APP_NAME: &str = "tinypkg";

/// Default package index cloned by `tinypkg update`.
pub const DEFAULT_REPO_URL: &str = "https://github.com/Night-Traders-Dev/tinypkg-repo.git";

/// Directory (relative to `$HOME`) used when `TINYPKG_ROOT` is not set.
pub const DEFAULT_ROOT_DIR: &str = ".tinypkg";

pub const ROOT_ENV: &str = "TINYPKG_ROOT";
pub const REPO_URL_ENV: &str = "TINYPKG_REPO_URL";

pub const MANIFEST_FILENAME: &str = "manifest.yaml";
pub const ARCHIVE_FILENAME: &str = "source.tar.gz";
pub const REGISTRY_FILENAME: &str = "installed.db";

/// File in a package build directory naming the tree the last build unpacked.
pub const SOURCE_DIR_MARKER: &str = ".source-dir";

/// Log written into the script working directory, overwritten on every run.
pub const SCRIPT_LOG_FILENAME: &str = "tinypkg.log";

/// Number of log lines echoed to stderr when a script fails.
pub const LOG_TAIL_LINES: usize = 50;

/// Version recorded for packages whose manifest leaves `version` empty.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Longest package name accepted at the CLI boundary.
pub const MAX_PACKAGE_NAME_LEN: usize = 128;

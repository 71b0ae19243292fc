//! tinypkg-lib: the engine behind the `tinypkg` package manager.
//!
//! tinypkg builds packages from source. A package is described by a manifest
//! in a git-hosted index; building downloads and unpacks its source archive
//! and runs the manifest's build script, installing runs its install script
//! with `PREFIX` pointing at `<root>/opt/<name>`, and the registry remembers
//! what is installed.
//!
//! - [`config`]: the root directory and every path derived from it
//! - [`manifest`]: manifest decoding
//! - [`execute`]: downloads, archive extraction and script execution
//! - [`pipeline`]: the build, install and remove operations
//! - [`registry`]: the installed-package store
//! - [`repo`]: syncing and querying the package index
//! - [`lock`]: advisory locking of the root between processes

pub mod config;
pub mod consts;
pub mod execute;
pub mod lock;
pub mod manifest;
pub mod pipeline;
pub mod platform;
pub mod registry;
pub mod repo;
pub mod util;

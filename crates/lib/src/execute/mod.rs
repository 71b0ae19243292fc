//! Side-effecting collaborators of the pipeline.
//!
//! - [`runner`]: turn a script body into a logged subprocess run
//! - [`fetch`]: download a source archive
//! - [`extract`]: unpack a source archive

pub mod extract;
pub mod fetch;
pub mod runner;
pub mod types;

pub use extract::extract_archive;
pub use fetch::{Fetcher, HttpFetcher};
pub use runner::{Executor, Invocation, ScriptRunner, ShellExecutor};
pub use types::{ExtractError, FetchError, ScriptError, ScriptOutcome, ScriptStatus};

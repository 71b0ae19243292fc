//! Script materialization and execution.
//!
//! A script body from a manifest is written to a temporary file:
//!
//! ```text
//! #!/bin/sh
//! set -e
//! export PREFIX='<install prefix>'
//! <body>
//! ```
//!
//! and run with the interpreter inside the requested working directory, with
//! stdout and stderr captured in `<working dir>/tinypkg.log`. The temporary
//! file is removed once the process has exited, whatever the outcome.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::TempPath;
use tracing::{debug, info, warn};

use crate::consts::{LOG_TAIL_LINES, SCRIPT_LOG_FILENAME};
use crate::execute::types::{ScriptError, ScriptOutcome, ScriptStatus};
use crate::util::shell::shell_escape_path;

const DEFAULT_INTERPRETER: &str = "/bin/sh";

/// One fully prepared process launch.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
  pub interpreter: &'a Path,
  pub script: &'a Path,
  pub working_dir: &'a Path,
  /// File receiving combined stdout and stderr; truncated before the run.
  pub log: &'a Path,
}

/// Capability to launch a process and wait for it.
pub trait Executor {
  fn execute(&self, invocation: &Invocation<'_>) -> io::Result<ScriptStatus>;
}

impl<E: Executor + ?Sized> Executor for &E {
  fn execute(&self, invocation: &Invocation<'_>) -> io::Result<ScriptStatus> {
    (**self).execute(invocation)
  }
}

/// Runs invocations as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellExecutor;

impl Executor for ShellExecutor {
  fn execute(&self, invocation: &Invocation<'_>) -> io::Result<ScriptStatus> {
    let log = File::create(invocation.log)?;
    let log_err = log.try_clone()?;

    debug!(
      interpreter = %invocation.interpreter.display(),
      working_dir = ?invocation.working_dir,
      "spawning process"
    );

    let status = Command::new(invocation.interpreter)
      .arg(invocation.script)
      .current_dir(invocation.working_dir)
      .stdin(Stdio::null())
      .stdout(log)
      .stderr(log_err)
      .status()?;

    Ok(status.into())
  }
}

/// Turns script bodies into logged subprocess runs.
#[derive(Debug, Clone)]
pub struct ScriptRunner<E = ShellExecutor> {
  executor: E,
  interpreter: PathBuf,
}

impl ScriptRunner<ShellExecutor> {
  pub fn new() -> Self {
    Self::with_executor(ShellExecutor)
  }
}

impl Default for ScriptRunner<ShellExecutor> {
  fn default() -> Self {
    Self::new()
  }
}

impl<E: Executor> ScriptRunner<E> {
  pub fn with_executor(executor: E) -> Self {
    Self {
      executor,
      interpreter: PathBuf::from(DEFAULT_INTERPRETER),
    }
  }

  pub fn executor(&self) -> &E {
    &self.executor
  }

  /// Run `body` in `working_dir` with `PREFIX` set to `prefix`.
  ///
  /// Returns the exit status even when it is non-zero. On failure the last
  /// lines of the log are also written to stderr.
  pub fn run(&self, body: &str, working_dir: &Path, prefix: &Path) -> Result<ScriptOutcome, ScriptError> {
    let script = materialize(&self.interpreter, body, prefix).map_err(ScriptError::WriteScript)?;
    let log_path = working_dir.join(SCRIPT_LOG_FILENAME);

    info!(working_dir = %working_dir.display(), prefix = %prefix.display(), "running script");

    let result = self.executor.execute(&Invocation {
      interpreter: &self.interpreter,
      script: &script,
      working_dir,
      log: &log_path,
    });

    let script_path = script.to_path_buf();
    if let Err(e) = script.close() {
      warn!(path = %script_path.display(), error = %e, "failed to remove temporary script");
    }

    let status = result.map_err(|source| ScriptError::Spawn {
      interpreter: self.interpreter.clone(),
      working_dir: working_dir.to_path_buf(),
      source,
    })?;

    let tail = if status.success() {
      debug!(log = %log_path.display(), "script succeeded");
      Vec::new()
    } else {
      let tail = read_tail(&log_path, LOG_TAIL_LINES);
      if let Err(e) = write_tail(&mut io::stderr().lock(), &log_path, &tail) {
        debug!(error = %e, "could not echo log tail");
      }
      tail
    };

    Ok(ScriptOutcome { status, log_path, tail })
  }
}

/// Render the full text of a generated script.
pub fn render_script(interpreter: &Path, body: &str, prefix: &Path) -> String {
  let mut script = format!(
    "#!{}\nset -e\nexport PREFIX={}\n{}",
    interpreter.display(),
    shell_escape_path(prefix),
    body
  );
  if !script.ends_with('\n') {
    script.push('\n');
  }
  script
}

fn materialize(interpreter: &Path, body: &str, prefix: &Path) -> io::Result<TempPath> {
  let mut file = tempfile::Builder::new()
    .prefix("tinypkg-script-")
    .suffix(".sh")
    .tempfile()?;
  file.write_all(render_script(interpreter, body, prefix).as_bytes())?;
  file.as_file().sync_all()?;

  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(file.path(), fs::Permissions::from_mode(0o700))?;
  }

  Ok(file.into_temp_path())
}

/// Last `limit` lines of the log; empty if the log cannot be read.
fn read_tail(log: &Path, limit: usize) -> Vec<String> {
  let Ok(bytes) = fs::read(log) else {
    return Vec::new();
  };
  let text = String::from_utf8_lossy(&bytes);
  let lines: Vec<&str> = text.lines().collect();
  let start = lines.len().saturating_sub(limit);
  lines[start..].iter().map(|l| l.to_string()).collect()
}

fn write_tail(out: &mut impl Write, log: &Path, tail: &[String]) -> io::Result<()> {
  if tail.is_empty() {
    return Ok(());
  }
  writeln!(out, "--- last {} lines of {} ---", tail.len(), log.display())?;
  for line in tail {
    writeln!(out, "{}", line)?;
  }
  writeln!(out, "--- end of log ---")
}

//! Shell quoting for values that end up in generated scripts or command lines.

use std::path::Path;

/// Quote `value` for POSIX `sh` using single quotes.
///
/// Embedded single quotes become `'\''`, so the result always expands to
/// exactly `value` with no word splitting, globbing or substitution.
pub fn shell_escape(value: &str) -> String {
  let mut out = String::with_capacity(value.len() + 2);
  out.push('\'');
  for ch in value.chars() {
    if ch == '\'' {
      out.push_str("'\\''");
    } else {
      out.push(ch);
    }
  }
  out.push('\'');
  out
}

/// Quote a path. Non-UTF-8 bytes are replaced lossily.
pub fn shell_escape_path(path: &Path) -> String {
  shell_escape(&path.to_string_lossy())
}

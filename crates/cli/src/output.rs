//! Status lines, stats and JSON for the `tinypkg` commands.
//!
//! Results go to stdout, warnings and failures to stderr. Colors follow
//! whichever of the two streams a line is written to.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

/// `--output` choice for the query commands.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

#[derive(Debug, Clone, Copy)]
enum Tone {
  Success,
  Error,
  Warning,
  Info,
}

impl Tone {
  fn symbol(self) -> &'static str {
    match self {
      Tone::Success => "✓",
      Tone::Error => "✗",
      Tone::Warning => "⚠",
      Tone::Info => "•",
    }
  }

  fn stream(self) -> Stream {
    match self {
      Tone::Error | Tone::Warning => Stream::Stderr,
      Tone::Success | Tone::Info => Stream::Stdout,
    }
  }
}

/// Symbol plus message. Warnings and errors color the whole line.
fn status_line(tone: Tone, message: &str) {
  let stream = tone.stream();
  let symbol = tone.symbol();
  let line = match tone {
    Tone::Success => format!("{} {}", symbol.if_supports_color(stream, |s| s.green()), message),
    Tone::Info => format!("{} {}", symbol.if_supports_color(stream, |s| s.blue()), message),
    Tone::Warning => format!(
      "{} {}",
      symbol.if_supports_color(stream, |s| s.yellow()),
      message.if_supports_color(stream, |s| s.yellow())
    ),
    Tone::Error => format!(
      "{} {}",
      symbol.if_supports_color(stream, |s| s.red()),
      message.if_supports_color(stream, |s| s.red())
    ),
  };
  match stream {
    Stream::Stderr => eprintln!("{line}"),
    _ => println!("{line}"),
  }
}

pub fn print_success(message: &str) {
  status_line(Tone::Success, message);
}

pub fn print_error(message: &str) {
  status_line(Tone::Error, message);
}

pub fn print_warning(message: &str) {
  status_line(Tone::Warning, message);
}

pub fn print_info(message: &str) {
  status_line(Tone::Info, message);
}

/// Indented `label: value` detail under a status line.
pub fn print_stat(label: &str, value: &str) {
  println!("  {}: {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("failed to serialize to JSON")?;
  println!("{json}");
  Ok(())
}

/// First twelve characters of an index commit id.
pub fn truncate_hash(hash: &str) -> &str {
  &hash[..hash.len().min(12)]
}

// Milliseconds under a second, centiseconds under a minute, then whole
// minutes and seconds.
pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  match secs {
    0 => format!("{}ms", duration.subsec_millis()),
    1..60 => format!("{}.{:02}s", secs, duration.subsec_millis() / 10),
    _ => format!("{}m {}s", secs / 60, secs % 60),
  }
}

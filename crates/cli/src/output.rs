//! Terminal rendering for aotmake commands.
//!
//! Status lines go through `owo-colors` and only carry color when the stream
//! supports it, so piped output stays plain. `-o json` bypasses all of this.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

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

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
  /// Extra output of a collapsed rule.
  pub const BYPRODUCT: &str = "+";
  /// Auxiliary input of a rule.
  pub const DEP: &str = "•";
}

/// Size of a generated description. Build files stay well below a gigabyte.
pub fn format_size(bytes: usize) -> String {
  const KB: usize = 1024;
  const MB: usize = KB * 1024;

  match bytes {
    b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
    b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
    b => format!("{b} B"),
  }
}

/// Generation is fast; sub-millisecond runs are common.
pub fn format_elapsed(elapsed: Duration) -> String {
  match (elapsed.as_secs(), elapsed.subsec_millis()) {
    (0, 0) => format!("{}µs", elapsed.subsec_micros()),
    (0, millis) => format!("{millis}ms"),
    (secs, millis) => format!("{secs}.{:02}s", millis / 10),
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

/// `name → source`
pub fn print_module(name: &str, source: &Path) {
  println!(
    "{} {} {}",
    name.if_supports_color(Stream::Stdout, |s| s.bold()),
    symbols::ARROW.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    source.display()
  );
}

/// `input → output [stage]`
pub fn print_rule(input: &Path, output: &Path, stage: &str) {
  let output = output.display().to_string();
  let stage = format!("[{stage}]");
  println!(
    "{} {} {} {}",
    input.display(),
    symbols::ARROW.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    output.if_supports_color(Stream::Stdout, |s| s.cyan()),
    stage.if_supports_color(Stream::Stdout, |s| s.dimmed())
  );
}

/// An indented detail line under a rule.
pub fn print_rule_detail(symbol: &str, path: &Path) {
  println!(
    "    {} {}",
    symbol.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    path.display()
  );
}

pub fn print_stat(label: &str, value: impl std::fmt::Display) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{json}");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sizes() {
    assert_eq!(format_size(0), "0 B");
    assert_eq!(format_size(1536), "1.5 KB");
    assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
  }

  #[test]
  fn elapsed() {
    assert_eq!(format_elapsed(Duration::from_micros(250)), "250µs");
    assert_eq!(format_elapsed(Duration::from_millis(50)), "50ms");
    assert_eq!(format_elapsed(Duration::from_millis(1500)), "1.50s");
  }
}

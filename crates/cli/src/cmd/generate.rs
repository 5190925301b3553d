//! Implementation of the `aotmake generate` command.
//!
//! Scans the input directory, builds and validates the graph, then writes the
//! build description (or prints it with `--stdout`). Nothing is written unless
//! every step succeeds.

use std::time::Instant;

use anyhow::{Context, Result};

use aotmake_lib::generate::{generate, generate_to_file};

use super::ConfigArgs;
use crate::output::{format_elapsed, format_size, print_stat, print_success, print_warning};

pub fn cmd_generate(args: &ConfigArgs, stdout: bool) -> Result<()> {
  let start = Instant::now();
  let config = args.resolve()?;

  if stdout {
    let generated = generate(&config).context("Failed to generate build description")?;
    print!("{}", generated.text);
    return Ok(());
  }

  let (generated, path) = generate_to_file(&config)
    .with_context(|| format!("Failed to generate {}", config.output_path().display()))?;

  if generated.catalog.is_empty() {
    print_warning(&format!(
      "No '{}' sources in {}",
      config.extension,
      config.input_dir.display()
    ));
  }

  print_success(&format!("Wrote {}", path.display()));
  print_stat("Modules", generated.catalog.len());
  print_stat("Rules", generated.graph.rules.len());
  print_stat("Format", generated.format);
  print_stat("Size", format_size(generated.text.len()));
  print_stat("Duration", format_elapsed(start.elapsed()));

  Ok(())
}

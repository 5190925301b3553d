mod generate;
mod graph;
mod modules;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use aotmake_lib::config::{self, ConfigOverrides, GenerateConfig};
use aotmake_lib::emit::Format;
use aotmake_lib::pipeline::Preset;

pub use generate::cmd_generate;
pub use graph::cmd_graph;
pub use modules::cmd_modules;

/// Settings shared by every command, layered over the config file.
#[derive(Debug, Args)]
pub struct ConfigArgs {
  /// Lua config file (default: ./aotmake.lua when present)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Directory scanned for source modules
  #[arg(long)]
  input_dir: Option<PathBuf>,

  /// Directory receiving artifacts (default: the input directory)
  #[arg(long)]
  output_dir: Option<PathBuf>,

  /// Source file extension
  #[arg(long = "ext")]
  extension: Option<String>,

  /// Pipeline preset: assembly, object, direct or collapsed
  #[arg(long)]
  pipeline: Option<Preset>,

  /// Keep compiler intermediates and remove them on clean
  #[arg(long)]
  keep_intermediates: bool,

  /// Treat module names differing only in case as colliding
  #[arg(long)]
  case_insensitive: bool,

  /// Build description syntax: make or ninja
  #[arg(long)]
  format: Option<Format>,

  /// Where to write the description (default: Makefile or build.ninja)
  #[arg(long)]
  output: Option<PathBuf>,
}

impl ConfigArgs {
  fn overrides(&self) -> ConfigOverrides {
    ConfigOverrides {
      input_dir: self.input_dir.clone(),
      output_dir: self.output_dir.clone(),
      extension: self.extension.clone(),
      preset: self.pipeline,
      keep_intermediates: self.keep_intermediates,
      case_insensitive: self.case_insensitive,
      format: self.format,
      output: self.output.clone(),
    }
  }

  pub fn resolve(&self) -> Result<GenerateConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let config =
      config::resolve(&cwd, self.config.as_deref(), &self.overrides()).context("Failed to load configuration")?;
    debug!(
      input_dir = %config.input_dir.display(),
      output_dir = %config.output_dir().display(),
      pipeline = ?config.pipeline,
      format = %config.format,
      keep_intermediates = config.keep_intermediates,
      "resolved configuration"
    );
    Ok(config)
  }
}

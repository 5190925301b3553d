//! Generator configuration.
//!
//! Settings come from three layers, later ones winning: built-in defaults, an
//! optional Lua configuration file (see [`load_config`]), and command-line
//! overrides ([`ConfigOverrides`]).

mod lua;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::catalog::NamingMode;
use crate::command::CallConvention;
use crate::consts::{DEFAULT_CONFIG_FILE, DEFAULT_INPUT_DIR, DEFAULT_SOURCE_EXTENSION};
use crate::emit::Format;
use crate::graph::BuildPlan;
use crate::pipeline::{ArtifactKind, Layout, Pipeline, Preset, Transition};
use crate::toolchain::Toolchain;

pub use lua::load_config;

/// Errors in the configuration file or the resulting settings.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("config file not found: {}", path.display())]
  NotFound { path: PathBuf },

  #[error("failed to evaluate {}: {message}", path.display())]
  Lua { path: PathBuf, message: String },

  #[error("{} must return a table, got {found}", path.display())]
  NotATable { path: PathBuf, found: &'static str },

  #[error("unknown config key '{key}'")]
  UnknownKey { key: String },

  #[error("invalid value for '{key}': {message}")]
  InvalidValue { key: String, message: String },

  #[error("invalid variable name '{name}' (expected letters, digits and underscores)")]
  InvalidVarName { name: String },
}

/// Which pipeline to build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineSetting {
  Preset(Preset),
  Custom(Vec<Transition>),
}

impl Default for PipelineSetting {
  fn default() -> Self {
    PipelineSetting::Preset(Preset::default())
  }
}

/// Fully resolved generator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateConfig {
  pub input_dir: PathBuf,
  /// Where artifacts go; the input directory when unset.
  pub output_dir: Option<PathBuf>,
  pub extension: String,
  pub naming: NamingMode,
  pub pipeline: PipelineSetting,
  pub keep_intermediates: bool,
  pub format: Format,
  /// Where the description is written; the format's well-known file name in
  /// the working directory when unset.
  pub output: Option<PathBuf>,
  pub toolchain: Toolchain,
  /// Calling convention forced onto every translate step.
  pub convention: Option<CallConvention>,
  pub pass_module: Option<bool>,
  pub layout_dirs: BTreeMap<ArtifactKind, PathBuf>,
  pub layout_extensions: BTreeMap<ArtifactKind, String>,
}

impl Default for GenerateConfig {
  fn default() -> Self {
    Self {
      input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
      output_dir: None,
      extension: DEFAULT_SOURCE_EXTENSION.to_string(),
      naming: NamingMode::default(),
      pipeline: PipelineSetting::default(),
      keep_intermediates: false,
      format: Format::default(),
      output: None,
      toolchain: Toolchain::default(),
      convention: None,
      pass_module: None,
      layout_dirs: BTreeMap::new(),
      layout_extensions: BTreeMap::new(),
    }
  }
}

impl GenerateConfig {
  pub fn output_dir(&self) -> &Path {
    self.output_dir.as_deref().unwrap_or(self.input_dir.as_path())
  }

  pub fn output_path(&self) -> PathBuf {
    self
      .output
      .clone()
      .unwrap_or_else(|| PathBuf::from(self.format.file_name()))
  }

  pub fn pipeline(&self) -> Pipeline {
    let pipeline = match &self.pipeline {
      PipelineSetting::Preset(preset) => Pipeline::preset(*preset),
      PipelineSetting::Custom(transitions) => Pipeline::new(transitions.clone()),
    };

    pipeline.with_translate_options(self.convention, self.pass_module)
  }

  pub fn layout(&self) -> Layout {
    let mut layout = Layout::new(self.output_dir());
    for (kind, dir) in &self.layout_dirs {
      layout = layout.with_dir(*kind, dir);
    }
    for (kind, ext) in &self.layout_extensions {
      layout = layout.with_extension(*kind, ext);
    }
    layout
  }

  pub fn plan(&self) -> BuildPlan {
    BuildPlan {
      pipeline: self.pipeline(),
      layout: self.layout(),
      toolchain: self.toolchain.clone(),
      keep_intermediates: self.keep_intermediates,
    }
  }

  /// Checks that cannot be expressed in the types.
  pub fn validate(&self) -> Result<(), ConfigError> {
    for (name, _) in &self.toolchain.vars {
      if !is_var_name(name) {
        return Err(ConfigError::InvalidVarName { name: name.clone() });
      }
    }
    Ok(())
  }

  pub fn apply(&mut self, overrides: &ConfigOverrides) {
    if let Some(dir) = &overrides.input_dir {
      self.input_dir = dir.clone();
    }
    if let Some(dir) = &overrides.output_dir {
      self.output_dir = Some(dir.clone());
    }
    if let Some(ext) = &overrides.extension {
      self.extension = ext.clone();
    }
    if let Some(preset) = overrides.preset {
      self.pipeline = PipelineSetting::Preset(preset);
    }
    if overrides.keep_intermediates {
      self.keep_intermediates = true;
    }
    if overrides.case_insensitive {
      self.naming = NamingMode::CaseInsensitive;
    }
    if let Some(format) = overrides.format {
      self.format = format;
    }
    if let Some(output) = &overrides.output {
      self.output = Some(output.clone());
    }
  }
}

/// Command-line settings layered over the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
  pub input_dir: Option<PathBuf>,
  pub output_dir: Option<PathBuf>,
  pub extension: Option<String>,
  pub preset: Option<Preset>,
  pub keep_intermediates: bool,
  pub case_insensitive: bool,
  pub format: Option<Format>,
  pub output: Option<PathBuf>,
}

/// Resolve the settings for one run.
///
/// An explicit `config_file` must exist. Without one, `aotmake.lua` in `cwd`
/// is used when present, and the defaults otherwise.
pub fn resolve(
  cwd: &Path,
  config_file: Option<&Path>,
  overrides: &ConfigOverrides,
) -> Result<GenerateConfig, ConfigError> {
  let mut config = match config_file {
    Some(path) => load_config(path)?,
    None => {
      let default = cwd.join(DEFAULT_CONFIG_FILE);
      if default.is_file() {
        load_config(&default)?
      } else {
        debug!("no config file, using defaults");
        GenerateConfig::default()
      }
    }
  };

  config.apply(overrides);
  config.validate()?;
  Ok(config)
}

fn is_var_name(name: &str) -> bool {
  let mut chars = name.chars();
  matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

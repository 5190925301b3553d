//! End-to-end generation: discover, build, validate, render, write.

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::catalog::{Catalog, CatalogError, discover};
use crate::config::{ConfigError, GenerateConfig};
use crate::emit::{EmitError, Format, render, write_atomic};
use crate::graph::{BuildGraph, GraphError, build_graph};

#[derive(Debug, Error)]
pub enum GenerateError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Catalog(#[from] CatalogError),

  #[error(transparent)]
  Graph(#[from] GraphError),

  #[error(transparent)]
  Emit(#[from] EmitError),
}

/// The result of one generation pass.
#[derive(Debug)]
pub struct Generated {
  pub catalog: Catalog,
  pub graph: BuildGraph,
  pub format: Format,
  pub text: String,
}

/// Run every fallible step and return the rendered description.
///
/// Nothing is written: every configuration error surfaces here, before the
/// caller touches the filesystem.
pub fn generate(config: &GenerateConfig) -> Result<Generated, GenerateError> {
  config.validate()?;

  let catalog = discover(&config.input_dir, &config.extension, config.naming)?;
  let graph = build_graph(&catalog, &config.plan())?;
  let text = render(&graph, config.format)?;

  info!(
    modules = catalog.len(),
    rules = graph.rules.len(),
    format = config.format.as_str(),
    "generated build description"
  );

  Ok(Generated {
    catalog,
    graph,
    format: config.format,
    text,
  })
}

/// [`generate`], then atomically replace the configured output file.
pub fn generate_to_file(config: &GenerateConfig) -> Result<(Generated, PathBuf), GenerateError> {
  let generated = generate(config)?;
  let path = config.output_path();
  write_atomic(&path, &generated.text)?;
  Ok((generated, path))
}

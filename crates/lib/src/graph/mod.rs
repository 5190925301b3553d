//! Build graph construction.
//!
//! Turns a [`Catalog`](crate::catalog::Catalog) and a [`BuildPlan`] into a
//! [`BuildGraph`]: one rule per (module, stage), the prerequisites of `all`
//! and the file list of `clean`. The graph is validated as a DAG over
//! artifact paths before it is returned, so emitters never see duplicate
//! outputs or cycles.

mod builder;
mod dag;
mod types;

use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::PipelineError;

pub use builder::build_graph;
pub use dag::ArtifactDag;
pub use types::{BuildGraph, BuildPlan, Rule, StageRecipe, StepRecipe};

/// Errors that can occur while building the graph.
#[derive(Debug, Error)]
pub enum GraphError {
  #[error(transparent)]
  Pipeline(#[from] PipelineError),

  #[error("{} is produced by both '{first}' and '{second}'", path.display())]
  DuplicateOutput {
    path: PathBuf,
    first: String,
    second: String,
  },

  #[error("rule for '{module}' would overwrite input {}", path.display())]
  OverwritesInput { path: PathBuf, module: String },

  #[error("rule for '{module}' reads {} which nothing provides", path.display())]
  DanglingInput { path: PathBuf, module: String },

  #[error("cycle detected in build graph")]
  CycleDetected,
}

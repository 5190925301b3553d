use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::catalog::ModuleName;
use crate::command::CommandSpec;
use crate::pipeline::{ArtifactKind, AuxDep, Layout, Pipeline};
use crate::placeholder::Segment;
use crate::toolchain::Toolchain;

/// Everything besides the catalog that shapes the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPlan {
  pub pipeline: Pipeline,
  pub layout: Layout,
  pub toolchain: Toolchain,
  /// Keep compiler temporaries on disk and list them in `clean`. Never
  /// changes a rule's inputs or outputs.
  pub keep_intermediates: bool,
}

/// A step of a stage, with its command lowered to segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecipe {
  pub to: ArtifactKind,
  pub command: CommandSpec,
  pub segments: Vec<Segment>,
}

/// The module-independent part of a stage, shared by all its rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageRecipe {
  pub from: ArtifactKind,
  pub to: ArtifactKind,
  pub steps: Vec<StepRecipe>,
  pub deps: Vec<AuxDep>,
}

impl StageRecipe {
  /// A name unique within the pipeline, since stages only move forward.
  pub fn name(&self) -> &'static str {
    self.to.as_str()
  }
}

/// One rule: the artifact a module gets out of one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
  pub module: ModuleName,
  /// Index into [`BuildGraph::stages`].
  pub stage: usize,
  /// The previous artifact of the module (its source for the first stage).
  pub input: PathBuf,
  pub output: PathBuf,
  /// Outputs of the inner steps of a collapsed stage.
  pub byproducts: Vec<PathBuf>,
  /// Auxiliary inputs: translator, includes, declared extras.
  pub deps: Vec<PathBuf>,
  /// Files the compiler retains next to `output` when intermediates are kept.
  pub temps: Vec<PathBuf>,
}

impl Rule {
  /// The primary input followed by the auxiliary inputs.
  pub fn inputs(&self) -> impl Iterator<Item = &Path> {
    std::iter::once(self.input.as_path()).chain(self.deps.iter().map(PathBuf::as_path))
  }

  /// Outputs of each step in order; the last one is [`Rule::output`].
  pub fn step_outputs(&self) -> impl Iterator<Item = &Path> {
    self
      .byproducts
      .iter()
      .map(PathBuf::as_path)
      .chain(std::iter::once(self.output.as_path()))
  }

  /// Every path this rule may write, including temporaries.
  pub fn written(&self) -> impl Iterator<Item = &Path> {
    self.step_outputs().chain(self.temps.iter().map(PathBuf::as_path))
  }
}

/// The complete, validated build graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildGraph {
  /// Variable bindings, in emission order.
  pub variables: Vec<(String, String)>,
  pub stages: Vec<StageRecipe>,
  /// Rules grouped by module in catalog order, stages in pipeline order.
  pub rules: Vec<Rule>,
  /// Prerequisites of `all`: each module's final artifact.
  pub all: Vec<PathBuf>,
  /// Files removed by `clean`.
  pub clean: Vec<PathBuf>,
}

impl BuildGraph {
  pub fn stage(&self, rule: &Rule) -> &StageRecipe {
    &self.stages[rule.stage]
  }

  pub fn rules_for<'a>(&'a self, module: &'a str) -> impl Iterator<Item = &'a Rule> {
    self.rules.iter().filter(move |rule| rule.module.as_str() == module)
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }
}

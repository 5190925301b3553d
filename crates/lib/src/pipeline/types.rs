use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::command::CommandSpec;

/// The kind of artifact a pipeline stage produces.
///
/// Kinds are totally ordered in pipeline order; a valid pipeline only ever
/// moves forward through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
  Source,
  /// C code emitted by the translator.
  Generated,
  Preprocessed,
  Assembly,
  Object,
  /// The loadable native module.
  Shared,
}

impl ArtifactKind {
  pub const ALL: [ArtifactKind; 6] = [
    ArtifactKind::Source,
    ArtifactKind::Generated,
    ArtifactKind::Preprocessed,
    ArtifactKind::Assembly,
    ArtifactKind::Object,
    ArtifactKind::Shared,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      ArtifactKind::Source => "source",
      ArtifactKind::Generated => "generated",
      ArtifactKind::Preprocessed => "preprocessed",
      ArtifactKind::Assembly => "assembly",
      ArtifactKind::Object => "object",
      ArtifactKind::Shared => "shared",
    }
  }

  pub fn default_extension(self) -> &'static str {
    match self {
      ArtifactKind::Source => ".lua",
      ArtifactKind::Generated => ".c",
      ArtifactKind::Preprocessed => ".i",
      ArtifactKind::Assembly => ".S",
      ArtifactKind::Object => ".o",
      ArtifactKind::Shared => ".so",
    }
  }
}

impl fmt::Display for ArtifactKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ArtifactKind {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    ArtifactKind::ALL
      .into_iter()
      .find(|kind| kind.as_str() == s)
      .ok_or_else(|| format!("unknown artifact kind '{s}'"))
  }
}

/// A fixed, non-module-specific input of a transition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuxDep {
  /// The translator binary.
  Translator,
  /// The shared header/footer included by generated code.
  Includes,
  Path(PathBuf),
}

/// One logical stage: produce `to` from the previous artifact with `command`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
  pub to: ArtifactKind,
  /// `None` is representable so that configuration can be validated with a
  /// precise error instead of failing to parse.
  pub command: Option<CommandSpec>,
}

impl Step {
  pub fn new(to: ArtifactKind, command: CommandSpec) -> Self {
    Self {
      to,
      command: Some(command),
    }
  }
}

/// One rule per module: one or more steps run as a single command.
///
/// A transition with several steps is a collapsed rule; the outputs of its
/// inner steps are byproducts of the rule, not separate rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
  pub steps: Vec<Step>,
  /// Extra inputs beyond those implied by the step commands.
  pub deps: Vec<AuxDep>,
  /// Extensions of extra files the commands leave next to the output when
  /// intermediates are kept. Compile steps add their own on top of these.
  pub temps: Vec<String>,
}

impl Transition {
  pub fn single(to: ArtifactKind, command: CommandSpec) -> Self {
    Self {
      steps: vec![Step::new(to, command)],
      deps: Vec::new(),
      temps: Vec::new(),
    }
  }

  pub fn collapsed(steps: Vec<Step>) -> Self {
    Self {
      steps,
      deps: Vec::new(),
      temps: Vec::new(),
    }
  }

  pub fn with_deps(mut self, deps: Vec<AuxDep>) -> Self {
    self.deps = deps;
    self
  }

  /// The kind this transition produces, if it has any steps.
  pub fn target(&self) -> Option<ArtifactKind> {
    self.steps.last().map(|step| step.to)
  }
}

//! Stage pipeline modeling.
//!
//! A [`Pipeline`] is the ordered list of transitions every module passes
//! through, starting from its source file. The pipeline is configuration: it
//! is validated once, before any rule is generated.
//!
//! Four presets mirror the ways the toolchain is commonly driven:
//!
//! | preset      | rules per module                                   |
//! |-------------|----------------------------------------------------|
//! | `assembly`  | `.lua → .c`, `.c → .S`, `.S → .so`                  |
//! | `object`    | `.lua → .c`, `.c → .o`, `.o → .so`                  |
//! | `direct`    | `.lua → .c`, `.c → .so`                             |
//! | `collapsed` | `.lua → .so` (translate and compile in one command) |

mod layout;
mod types;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::command::{CallConvention, CommandSpec, CompileMode};
use crate::placeholder::{PlaceholderError, referenced_vars};

pub use layout::Layout;
pub use types::{ArtifactKind, AuxDep, Step, Transition};

/// Errors in the pipeline configuration.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("pipeline has no transitions")]
  Empty,

  #[error("transition {index} has no steps")]
  EmptyTransition { index: usize },

  #[error("stage {from} -> {to} does not move forward in the pipeline")]
  NotIncreasing { from: ArtifactKind, to: ArtifactKind },

  #[error("no command configured for stage {from} -> {to}")]
  MissingCommand { from: ArtifactKind, to: ArtifactKind },

  #[error("invalid command template for stage {from} -> {to}: {source}")]
  Template {
    from: ArtifactKind,
    to: ArtifactKind,
    source: PlaceholderError,
  },

  #[error("command for stage {from} -> {to} references undefined variable '{name}'")]
  UndefinedVar {
    name: String,
    from: ArtifactKind,
    to: ArtifactKind,
  },

  #[error("invalid temporary file extension '{ext}' on stage producing {to}")]
  InvalidTemp { ext: String, to: ArtifactKind },
}

/// Built-in pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
  #[default]
  Assembly,
  Object,
  Direct,
  Collapsed,
}

impl Preset {
  pub const ALL: [Preset; 4] = [Preset::Assembly, Preset::Object, Preset::Direct, Preset::Collapsed];

  pub fn as_str(self) -> &'static str {
    match self {
      Preset::Assembly => "assembly",
      Preset::Object => "object",
      Preset::Direct => "direct",
      Preset::Collapsed => "collapsed",
    }
  }
}

impl fmt::Display for Preset {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Preset {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Preset::ALL
      .into_iter()
      .find(|p| p.as_str() == s)
      .ok_or_else(|| format!("unknown pipeline preset '{s}' (expected assembly, object, direct or collapsed)"))
  }
}

/// A transition together with the kind it consumes.
#[derive(Debug, Clone, Copy)]
pub struct Stage<'a> {
  pub from: ArtifactKind,
  pub transition: &'a Transition,
}

impl Stage<'_> {
  pub fn to(&self) -> ArtifactKind {
    self.transition.target().unwrap_or(self.from)
  }

  /// Each step paired with the kind it consumes.
  pub fn steps(&self) -> impl Iterator<Item = (ArtifactKind, &Step)> {
    let mut from = self.from;
    self.transition.steps.iter().map(move |step| {
      let input = from;
      from = step.to;
      (input, step)
    })
  }

  /// Auxiliary inputs of this stage: those implied by its commands first
  /// (translator, then includes), then the declared ones, without duplicates.
  pub fn aux_deps(&self) -> Vec<AuxDep> {
    let mut deps = Vec::new();

    for (input, step) in self.steps() {
      let Some(command) = &step.command else { continue };
      if command.runs_translator() {
        deps.push(AuxDep::Translator);
      }
      if command.compiles() && input == ArtifactKind::Generated {
        deps.push(AuxDep::Includes);
      }
    }
    deps.extend(self.transition.deps.iter().cloned());

    let mut unique = Vec::with_capacity(deps.len());
    for dep in deps {
      if !unique.contains(&dep) {
        unique.push(dep);
      }
    }
    unique
  }
}

/// The ordered transitions from source to final artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pipeline {
  pub transitions: Vec<Transition>,
}

impl Pipeline {
  pub fn new(transitions: Vec<Transition>) -> Self {
    Self { transitions }
  }

  pub fn preset(preset: Preset) -> Self {
    let translate = || CommandSpec::translate(CallConvention::OutputFlag);

    let transitions = match preset {
      Preset::Assembly => vec![
        Transition::single(ArtifactKind::Generated, translate()),
        Transition::single(ArtifactKind::Assembly, CommandSpec::compile(CompileMode::Assemble)),
        Transition::single(ArtifactKind::Shared, CommandSpec::Link),
      ],
      Preset::Object => vec![
        Transition::single(ArtifactKind::Generated, translate()),
        Transition::single(ArtifactKind::Object, CommandSpec::compile(CompileMode::Object)),
        Transition::single(ArtifactKind::Shared, CommandSpec::Link),
      ],
      Preset::Direct => vec![
        Transition::single(ArtifactKind::Generated, translate()),
        Transition::single(ArtifactKind::Shared, CommandSpec::compile(CompileMode::Shared)),
      ],
      Preset::Collapsed => vec![
        Transition::collapsed(vec![
          Step::new(ArtifactKind::Generated, translate()),
          Step::new(ArtifactKind::Shared, CommandSpec::compile(CompileMode::Shared)),
        ]),
      ],
    };

    Self { transitions }
  }

  /// Override translate options on every translate step. A `None` keeps
  /// whatever the step already says.
  pub fn with_translate_options(mut self, convention: Option<CallConvention>, pass_module: Option<bool>) -> Self {
    for step in self.transitions.iter_mut().flat_map(|t| t.steps.iter_mut()) {
      if let Some(CommandSpec::Translate {
        convention: step_convention,
        pass_module: step_pass_module,
      }) = &mut step.command
      {
        if let Some(convention) = convention {
          *step_convention = convention;
        }
        if let Some(pass_module) = pass_module {
          *step_pass_module = pass_module;
        }
      }
    }
    self
  }

  /// Transitions paired with the kind each consumes, starting from source.
  pub fn stages(&self) -> impl Iterator<Item = Stage<'_>> {
    let mut from = ArtifactKind::Source;
    self.transitions.iter().map(move |transition| {
      let stage = Stage { from, transition };
      from = stage.to();
      stage
    })
  }

  /// Check that the pipeline is well formed.
  ///
  /// `defined_vars` are the variable names the build description binds; custom
  /// templates may only reference those.
  ///
  /// # Errors
  ///
  /// Returns the first problem found, in pipeline order.
  pub fn validate(&self, defined_vars: &[&str]) -> Result<(), PipelineError> {
    if self.transitions.is_empty() {
      return Err(PipelineError::Empty);
    }

    for (index, stage) in self.stages().enumerate() {
      if stage.transition.steps.is_empty() {
        return Err(PipelineError::EmptyTransition { index });
      }

      for (from, step) in stage.steps() {
        let to = step.to;
        if to <= from {
          return Err(PipelineError::NotIncreasing { from, to });
        }

        let command = step
          .command
          .as_ref()
          .ok_or(PipelineError::MissingCommand { from, to })?;
        let segments = command
          .segments()
          .map_err(|source| PipelineError::Template { from, to, source })?;

        if let Some(name) = referenced_vars(&segments).find(|name| !defined_vars.contains(name)) {
          return Err(PipelineError::UndefinedVar {
            name: name.to_string(),
            from,
            to,
          });
        }
      }

      for ext in &stage.transition.temps {
        if ext.len() < 2 || !ext.starts_with('.') || ext.contains(['/', '\\']) {
          return Err(PipelineError::InvalidTemp {
            ext: ext.clone(),
            to: stage.to(),
          });
        }
      }
    }

    Ok(())
  }
}

impl Default for Pipeline {
  fn default() -> Self {
    Pipeline::preset(Preset::default())
  }
}

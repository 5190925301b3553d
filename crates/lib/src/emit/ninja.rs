use super::escape::{escape_literals, ninja_path, ninja_value, path_text, shell_quote};
use super::{EmitError, Emitter, Format, HEADER};
use crate::consts::{ALL_TARGET, CLEAN_TARGET, FORCE_TARGET};
use crate::graph::{BuildGraph, Rule, StageRecipe};
use crate::placeholder::{Placeholder, PlaceholderError, Resolver, Segment, substitute_segments};

/// Emits a ninja build file.
///
/// Each stage becomes one ninja `rule`; collapsed stages chain their steps
/// with `&&` and pass inner outputs through per-build `midN` bindings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NinjaEmitter;

/// Binds one step of a stage to ninja variables.
struct StepResolver {
  index: usize,
  last: usize,
}

impl Resolver for StepResolver {
  fn resolve_input(&self) -> Result<String, PlaceholderError> {
    Ok(match self.index {
      0 => "$in".to_string(),
      n => format!("$mid{}", n - 1),
    })
  }

  fn resolve_output(&self) -> Result<String, PlaceholderError> {
    Ok(if self.index == self.last {
      "$out".to_string()
    } else {
      format!("$mid{}", self.index)
    })
  }

  fn resolve_module(&self) -> Result<String, PlaceholderError> {
    Ok("$module".to_string())
  }

  fn resolve_var(&self, name: &str) -> Result<String, PlaceholderError> {
    Ok(format!("${{{name}}}"))
  }
}

impl Emitter for NinjaEmitter {
  fn format(&self) -> Format {
    Format::Ninja
  }

  fn render(&self, graph: &BuildGraph) -> Result<String, EmitError> {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');

    if !graph.variables.is_empty() {
      out.push('\n');
      for (name, value) in &graph.variables {
        if value.contains(['\n', '\r']) {
          return Err(EmitError::UnencodableVar { name: name.clone() });
        }
        out.push_str(&format!("{name} = {}\n", ninja_value(value)));
      }
    }

    for stage in &graph.stages {
      out.push('\n');
      render_stage(stage, &mut out)?;
    }

    for rule in &graph.rules {
      out.push('\n');
      render_build(graph, rule, &mut out)?;
    }

    let mut all = String::new();
    for path in &graph.all {
      all.push(' ');
      all.push_str(&ninja_path(path_text(path)?));
    }
    out.push_str(&format!("\nbuild {ALL_TARGET}: phony{all}\n"));

    let mut files = String::new();
    for path in &graph.clean {
      files.push(' ');
      files.push_str(&ninja_value(&shell_quote(path_text(path)?)));
    }
    out.push_str(&format!(
      "\nrule {CLEAN_TARGET}\n  command = rm -f --{files}\n  description = CLEAN\n\n\
       build {CLEAN_TARGET}: {CLEAN_TARGET} | {FORCE_TARGET}\nbuild {FORCE_TARGET}: phony\n"
    ));

    out.push_str(&format!("\ndefault {ALL_TARGET}\n"));
    Ok(out)
  }
}

fn render_stage(stage: &StageRecipe, out: &mut String) -> Result<(), EmitError> {
  let last = stage.steps.len().saturating_sub(1);

  let mut commands = Vec::with_capacity(stage.steps.len());
  for (index, step) in stage.steps.iter().enumerate() {
    let command = substitute_segments(
      &escape_literals(&step.segments, ninja_value),
      &StepResolver { index, last },
    )
    .map_err(|source| EmitError::Placeholder {
      module: stage.name().to_string(),
      source,
    })?;
    commands.push(command);
  }

  out.push_str(&format!(
    "rule {}\n  command = {}\n  description = {} $out\n",
    stage.name(),
    commands.join(" && "),
    stage.name().to_uppercase()
  ));
  Ok(())
}

fn render_build(graph: &BuildGraph, rule: &Rule, out: &mut String) -> Result<(), EmitError> {
  let stage = graph.stage(rule);

  let mut line = format!("build {}", ninja_path(path_text(&rule.output)?));
  if !rule.byproducts.is_empty() {
    line.push_str(" |");
    for path in &rule.byproducts {
      line.push(' ');
      line.push_str(&ninja_path(path_text(path)?));
    }
  }
  line.push_str(&format!(": {} {}", stage.name(), ninja_path(path_text(&rule.input)?)));
  if !rule.deps.is_empty() {
    line.push_str(" |");
    for path in &rule.deps {
      line.push(' ');
      line.push_str(&ninja_path(path_text(path)?));
    }
  }
  out.push_str(&line);
  out.push('\n');

  if references_module(stage) {
    out.push_str(&format!("  module = {}\n", ninja_value(&shell_quote(rule.module.as_str()))));
  }
  for (index, path) in rule.byproducts.iter().enumerate() {
    out.push_str(&format!("  mid{index} = {}\n", ninja_value(&shell_quote(path_text(path)?))));
  }

  Ok(())
}

fn references_module(stage: &StageRecipe) -> bool {
  stage
    .steps
    .iter()
    .flat_map(|step| step.segments.iter())
    .any(|segment| matches!(segment, Segment::Placeholder(Placeholder::Module)))
}

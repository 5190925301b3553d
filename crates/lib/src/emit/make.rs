use std::path::Path;

use super::escape::{escape_literals, make_recipe, make_target, path_text, shell_quote};
use super::{EmitError, Emitter, Format, HEADER};
use crate::consts::{ALL_TARGET, CLEAN_TARGET};
use crate::graph::{BuildGraph, Rule};
use crate::placeholder::{PlaceholderError, Resolver, substitute_segments};

/// Emits a POSIX-style Makefile.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakefileEmitter;

/// Binds one step of a rule to concrete, shell-quoted paths.
struct RecipeResolver<'a> {
  input: &'a str,
  output: &'a str,
  module: &'a str,
}

impl Resolver for RecipeResolver<'_> {
  fn resolve_input(&self) -> Result<String, PlaceholderError> {
    Ok(make_recipe(&shell_quote(self.input)))
  }

  fn resolve_output(&self) -> Result<String, PlaceholderError> {
    Ok(make_recipe(&shell_quote(self.output)))
  }

  fn resolve_module(&self) -> Result<String, PlaceholderError> {
    Ok(make_recipe(&shell_quote(self.module)))
  }

  fn resolve_var(&self, name: &str) -> Result<String, PlaceholderError> {
    Ok(format!("$({name})"))
  }
}

impl Emitter for MakefileEmitter {
  fn format(&self) -> Format {
    Format::Make
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
        out.push_str(&format!("{name} = {value}\n"));
      }
    }

    out.push_str(&format!("\n.PHONY: {ALL_TARGET} {CLEAN_TARGET}\n\n"));
    out.push_str(&format!("{ALL_TARGET}:{}\n\n", target_list(graph.all.iter().map(|p| p.as_path()))?));

    out.push_str(&format!("{CLEAN_TARGET}:\n"));
    if !graph.clean.is_empty() {
      let mut files = String::new();
      for path in &graph.clean {
        files.push(' ');
        files.push_str(&make_recipe(&shell_quote(path_text(path)?)));
      }
      out.push_str(&format!("\trm -f --{files}\n"));
    }

    for rule in &graph.rules {
      out.push('\n');
      render_rule(graph, rule, &mut out)?;
    }

    Ok(out)
  }
}

/// Paths as a prerequisite list, each preceded by a space.
fn target_list<'a>(paths: impl Iterator<Item = &'a Path>) -> Result<String, EmitError> {
  let mut list = String::new();
  for path in paths {
    list.push(' ');
    list.push_str(&make_target(path_text(path)?));
  }
  Ok(list)
}

fn render_rule(graph: &BuildGraph, rule: &Rule, out: &mut String) -> Result<(), EmitError> {
  let stage = graph.stage(rule);

  out.push_str(&format!(
    "{}:{}\n",
    make_target(path_text(&rule.output)?),
    target_list(rule.inputs())?
  ));

  let mut input = rule.input.as_path();
  for (step, output) in stage.steps.iter().zip(rule.step_outputs()) {
    let resolver = RecipeResolver {
      input: path_text(input)?,
      output: path_text(output)?,
      module: rule.module.as_str(),
    };
    let command = substitute_segments(&escape_literals(&step.segments, make_recipe), &resolver).map_err(|source| {
      EmitError::Placeholder {
        module: rule.module.to_string(),
        source,
      }
    })?;
    out.push_str(&format!("\t{command}\n"));
    input = output;
  }

  Ok(())
}

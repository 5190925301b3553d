use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, info};

use super::GraphError;
use super::dag::ArtifactDag;
use super::types::{BuildGraph, BuildPlan, Rule, StageRecipe, StepRecipe};
use crate::catalog::{Catalog, Module};
use crate::pipeline::{PipelineError, Stage};

/// Build the graph for every module in `catalog`.
///
/// Rules are emitted module by module in catalog order, and stage by stage in
/// pipeline order within a module. The same catalog and plan always produce
/// the same graph.
///
/// # Errors
///
/// Returns an error if the pipeline is invalid (including a stage without a
/// command), or if the resulting rules do not form a DAG with one producer per
/// path.
pub fn build_graph(catalog: &Catalog, plan: &BuildPlan) -> Result<BuildGraph, GraphError> {
  plan.pipeline.validate(&plan.toolchain.variable_names())?;

  let stages: Vec<Stage<'_>> = plan.pipeline.stages().collect();
  let recipes = stages.iter().map(stage_recipe).collect::<Result<Vec<_>, _>>()?;

  let mut rules = Vec::with_capacity(catalog.len() * stages.len());
  let mut all = Vec::with_capacity(catalog.len());

  for module in catalog.iter() {
    let mut input = module.source.clone();
    for (index, stage) in stages.iter().enumerate() {
      let rule = module_rule(module, index, stage, input, plan);
      debug!(
        module = %module.name,
        stage = stage.to().as_str(),
        output = %rule.output.display(),
        "rule"
      );
      input = rule.output.clone();
      rules.push(rule);
    }
    all.push(input);
  }

  let clean = clean_list(&rules, plan.keep_intermediates);

  let dag = ArtifactDag::from_rules(catalog.iter().map(|m| m.source.as_path()), &rules)?;
  debug!(artifacts = dag.artifact_count(), "build graph validated");

  info!(
    modules = catalog.len(),
    rules = rules.len(),
    keep_intermediates = plan.keep_intermediates,
    "build graph ready"
  );

  Ok(BuildGraph {
    variables: plan.toolchain.variables(plan.keep_intermediates),
    stages: recipes,
    rules,
    all,
    clean,
  })
}

fn stage_recipe(stage: &Stage<'_>) -> Result<StageRecipe, PipelineError> {
  let steps = stage
    .steps()
    .map(|(from, step)| {
      let to = step.to;
      let command = step.command.clone().ok_or(PipelineError::MissingCommand { from, to })?;
      let segments = command
        .segments()
        .map_err(|source| PipelineError::Template { from, to, source })?;
      Ok(StepRecipe { to, command, segments })
    })
    .collect::<Result<Vec<_>, PipelineError>>()?;

  Ok(StageRecipe {
    from: stage.from,
    to: stage.to(),
    steps,
    deps: stage.aux_deps(),
  })
}

fn module_rule(module: &Module, index: usize, stage: &Stage<'_>, input: PathBuf, plan: &BuildPlan) -> Rule {
  let mut outputs: Vec<PathBuf> = Vec::with_capacity(stage.transition.steps.len());
  let mut temps: Vec<PathBuf> = Vec::new();

  let mut step_input = input.clone();
  for step in &stage.transition.steps {
    let step_output = plan.layout.artifact_path(step.to, &module.name);
    if let Some(command) = &step.command {
      temps.extend(command.retained_temps(&step_input, &step_output));
    }
    step_input = step_output.clone();
    outputs.push(step_output);
  }
  // Validation guarantees at least one step
  let output = outputs.pop().unwrap_or_else(|| input.clone());

  temps.extend(
    stage
      .transition
      .temps
      .iter()
      .map(|ext| output.with_file_name(format!("{}{}", module.name, ext))),
  );
  dedup(&mut temps);

  let mut deps: Vec<PathBuf> = stage
    .aux_deps()
    .iter()
    .flat_map(|dep| plan.toolchain.resolve(dep))
    .collect();
  dedup(&mut deps);

  Rule {
    module: module.name.clone(),
    stage: index,
    input,
    output,
    byproducts: outputs,
    deps,
    temps,
  }
}

/// Drop repeated paths, keeping the first occurrence.
fn dedup(paths: &mut Vec<PathBuf>) {
  let mut seen = HashSet::new();
  paths.retain(|path| seen.insert(path.clone()));
}

/// Everything generated, module by module: inner outputs, the rule output,
/// then retained temporaries when they are kept. Sources are never listed.
fn clean_list(rules: &[Rule], keep_intermediates: bool) -> Vec<PathBuf> {
  let mut clean = Vec::new();
  for rule in rules {
    clean.extend(rule.step_outputs().map(PathBuf::from));
    if keep_intermediates {
      clean.extend(rule.temps.iter().cloned());
    }
  }
  clean
}

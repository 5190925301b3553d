//! Implementation of the `aotmake graph` command.
//!
//! Prints the rules the generator would emit, one line per rule, without
//! writing anything.

use anyhow::{Context, Result};

use aotmake_lib::catalog::discover;
use aotmake_lib::graph::build_graph;

use super::ConfigArgs;
use crate::output::{OutputFormat, print_json, print_rule, print_rule_detail, print_stat, symbols};

pub fn cmd_graph(args: &ConfigArgs, format: OutputFormat, verbose: bool) -> Result<()> {
  let config = args.resolve()?;
  let catalog = discover(&config.input_dir, &config.extension, config.naming)
    .with_context(|| format!("Failed to scan {}", config.input_dir.display()))?;
  let graph = build_graph(&catalog, &config.plan()).context("Failed to build graph")?;

  if format.is_json() {
    return print_json(&graph);
  }

  for rule in &graph.rules {
    print_rule(&rule.input, &rule.output, graph.stage(rule).name());
    if verbose {
      for path in &rule.byproducts {
        print_rule_detail(symbols::BYPRODUCT, path);
      }
      for path in &rule.deps {
        print_rule_detail(symbols::DEP, path);
      }
    }
  }

  if !graph.rules.is_empty() {
    println!();
  }
  print_stat("Modules", catalog.len());
  print_stat("Rules", graph.rules.len());
  print_stat("All", graph.all.len());
  print_stat("Clean", graph.clean.len());

  Ok(())
}

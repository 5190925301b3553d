//! Artifact DAG for structural validation.
//!
//! Nodes are artifacts (paths), edges run from each input of a rule to every
//! path the rule writes. Building the DAG rejects duplicate outputs, rules
//! that write over an external input, dangling inputs and cycles.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use super::GraphError;
use super::types::Rule;

/// Where an artifact comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArtifactNode {
  /// A module source file.
  Source,
  /// A fixed input supplied from outside (translator, includes).
  External,
  /// Written by the rule at this index.
  Produced { rule: usize },
}

pub struct ArtifactDag {
  graph: DiGraph<ArtifactNode, ()>,
}

impl ArtifactDag {
  /// Build and validate the DAG for `rules`.
  ///
  /// # Errors
  ///
  /// - `DuplicateOutput` if two rules (or one rule twice) write the same path
  /// - `OverwritesInput` if a rule writes a source or external input
  /// - `DanglingInput` if an input is neither a source, external nor produced
  /// - `CycleDetected` if the rules depend on each other circularly
  pub fn from_rules<'a>(sources: impl IntoIterator<Item = &'a Path>, rules: &[Rule]) -> Result<Self, GraphError> {
    let mut graph = DiGraph::new();
    let mut nodes: HashMap<PathBuf, NodeIndex> = HashMap::new();

    // First pass: everything supplied from outside the graph
    for source in sources {
      let idx = graph.add_node(ArtifactNode::Source);
      nodes.insert(source.to_path_buf(), idx);
    }
    for dep in rules.iter().flat_map(|rule| rule.deps.iter()) {
      if !nodes.contains_key(dep) {
        let idx = graph.add_node(ArtifactNode::External);
        nodes.insert(dep.clone(), idx);
      }
    }

    // Second pass: every written path gets exactly one producer
    for (index, rule) in rules.iter().enumerate() {
      for path in rule.written() {
        if let Some(&existing) = nodes.get(path) {
          return Err(match graph[existing] {
            ArtifactNode::Produced { rule: first, .. } => GraphError::DuplicateOutput {
              path: path.to_path_buf(),
              first: rules[first].module.to_string(),
              second: rule.module.to_string(),
            },
            _ => GraphError::OverwritesInput {
              path: path.to_path_buf(),
              module: rule.module.to_string(),
            },
          });
        }

        let idx = graph.add_node(ArtifactNode::Produced { rule: index });
        nodes.insert(path.to_path_buf(), idx);
      }
    }

    // Third pass: edges from inputs to written paths
    for rule in rules {
      for input in rule.inputs() {
        let input_idx = *nodes.get(input).ok_or_else(|| GraphError::DanglingInput {
          path: input.to_path_buf(),
          module: rule.module.to_string(),
        })?;

        for path in rule.written() {
          graph.add_edge(input_idx, nodes[path], ());
        }
      }
    }

    let dag = Self { graph };
    dag.verify_acyclic()?;
    Ok(dag)
  }

  fn verify_acyclic(&self) -> Result<(), GraphError> {
    toposort(&self.graph, None).map_err(|_| GraphError::CycleDetected)?;
    Ok(())
  }

  pub fn artifact_count(&self) -> usize {
    self.graph.node_count()
  }
}

use std::fs;

use aotmake_lib::config::{self, ConfigOverrides};
use aotmake_lib::generate::{GenerateError, generate, generate_to_file};
use aotmake_lib::graph::GraphError;
use aotmake_lib::pipeline::PipelineError;

use super::common::Project;

const ANCHORED: &str = r#"
return {
  input_dir = __dir .. "/src",
  output_dir = __dir .. "/build",
  output = __dir .. "/Makefile",
  pipeline = "direct",
}
"#;

#[test]
fn writes_the_rendered_makefile() {
  let project = Project::new(ANCHORED, &["add", "sort"]);
  let config = config::resolve(project.root(), None, &ConfigOverrides::default()).unwrap();

  let (generated, path) = generate_to_file(&config).unwrap();

  assert_eq!(path, project.canonical("Makefile"));
  assert_eq!(fs::read_to_string(&path).unwrap(), generated.text);
  assert_eq!(generated.catalog.len(), 2);

  let build = project.canonical("build");
  let all: Vec<_> = generated.graph.all.iter().collect();
  assert_eq!(all, vec![&build.join("add.so"), &build.join("sort.so")]);
  assert!(generated.text.starts_with("# Generated by aotmake."));
  assert!(!build.exists(), "artifact directories are left to the build tool");
}

#[test]
fn every_rule_belongs_to_a_catalog_module() {
  let project = Project::new(ANCHORED, &["add", "sort", "fib"]);
  let config = config::resolve(project.root(), None, &ConfigOverrides::default()).unwrap();

  let generated = generate(&config).unwrap();

  for module in generated.catalog.iter() {
    assert_eq!(generated.graph.rules_for(module.name.as_str()).count(), 2);
  }
  assert_eq!(generated.graph.rules.len(), 6);
}

#[test]
fn custom_pipeline_with_declared_deps() {
  let project = Project::new(
    r#"
return {
  input_dir = __dir .. "/src",
  output_dir = __dir .. "/out",
  pipeline = {
    { to = "generated", command = "translate", deps = { "translator", __dir .. "/lua.h" } },
    { to = "shared", command = "compile-shared", deps = { "includes" } },
  },
}
"#,
    &["add"],
  );
  let config = config::resolve(project.root(), None, &ConfigOverrides::default()).unwrap();

  let generated = generate(&config).unwrap();

  let first = &generated.graph.rules[0];
  assert_eq!(first.input, project.canonical("src/add.lua"));
  assert!(first.deps.contains(&project.canonical("lua.h")));
  assert!(first.deps.iter().any(|dep| dep.ends_with("luaot")));

  let second = &generated.graph.rules[1];
  assert_eq!(second.input, first.output);
  assert!(second.deps.iter().any(|dep| dep.ends_with("luaot-generated-header.c")));
}

#[test]
fn missing_command_fails_before_writing() {
  let project = Project::new(
    r#"
return {
  input_dir = __dir .. "/src",
  output = __dir .. "/Makefile",
  pipeline = { { to = "generated" } },
}
"#,
    &["add"],
  );
  let config = config::resolve(project.root(), None, &ConfigOverrides::default()).unwrap();

  let err = generate_to_file(&config).unwrap_err();

  assert!(
    matches!(err, GenerateError::Graph(GraphError::Pipeline(PipelineError::MissingCommand { .. }))),
    "unexpected error: {err}"
  );
  assert!(!project.root().join("Makefile").exists());
}

#[test]
fn empty_source_directory_still_generates() {
  let project = Project::new(ANCHORED, &[]);
  let config = config::resolve(project.root(), None, &ConfigOverrides::default()).unwrap();

  let (generated, path) = generate_to_file(&config).unwrap();

  assert!(generated.graph.is_empty());
  let text = fs::read_to_string(path).unwrap();
  assert!(text.contains("\nall:"));
  assert!(text.contains("\nclean:"));
}

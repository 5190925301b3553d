//! Graph command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn graph_prints_rules() {
  let env = TestEnv::empty().with_sources(&["add.lua"]);

  env
    .aotmake_cmd()
    .args(["graph", "--pipeline", "direct"])
    .assert()
    .success()
    .stdout(predicate::str::contains("./examples/add.lua → ./examples/add.c [generated]"))
    .stdout(predicate::str::contains("./examples/add.c → ./examples/add.so [shared]"))
    .stdout(predicate::str::contains("Rules: 2"));

  assert!(!env.path().join("Makefile").exists());
}

#[test]
fn graph_verbose_shows_dependencies() {
  let env = TestEnv::empty().with_sources(&["add.lua"]);

  env
    .aotmake_cmd()
    .args(["graph", "--verbose", "--pipeline", "collapsed"])
    .assert()
    .success()
    .stdout(predicate::str::contains("+ ./examples/add.c"))
    .stdout(predicate::str::contains("• ../src/luaot-generated-header.c"));
}

#[test]
fn graph_json() {
  let env = TestEnv::empty().with_sources(&["add.lua", "sort.lua"]);

  let output = env
    .aotmake_cmd()
    .args(["graph", "--pipeline", "direct", "-o", "json"])
    .output()
    .unwrap();

  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["rules"].as_array().unwrap().len(), 4);
  assert_eq!(json["all"], serde_json::json!(["./examples/add.so", "./examples/sort.so"]));
  assert_eq!(json["stages"][1]["to"], "shared");
}

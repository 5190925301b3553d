//! Modules command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn modules_lists_sorted_names() {
  let env = TestEnv::empty().with_sources(&["sort.lua", "add.lua", "notes.txt"]);

  env
    .aotmake_cmd()
    .arg("modules")
    .assert()
    .success()
    .stdout(predicate::str::contains("add → ./examples/add.lua\nsort → ./examples/sort.lua\n"));
}

#[test]
fn modules_json() {
  let env = TestEnv::empty().with_sources(&["add.lua"]);

  let output = env.aotmake_cmd().args(["modules", "-o", "json"]).output().unwrap();

  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json[0]["name"], "add");
  assert_eq!(json[0]["source"], "./examples/add.lua");
}

#[test]
fn modules_empty_directory() {
  let env = TestEnv::empty();

  env
    .aotmake_cmd()
    .arg("modules")
    .assert()
    .success()
    .stdout(predicate::str::contains("No modules found"));
}

#[test]
fn modules_rejects_invalid_names() {
  let env = TestEnv::empty().with_sources(&["my-module.lua"]);

  env
    .aotmake_cmd()
    .arg("modules")
    .assert()
    .failure()
    .stderr(predicate::str::contains("not a valid C identifier"));
}

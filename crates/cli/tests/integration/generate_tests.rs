//! Generate command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn generate_default_pipeline_writes_makefile() {
  let env = TestEnv::empty().with_sources(&["sort.lua", "add.lua"]);

  env
    .aotmake_cmd()
    .arg("generate")
    .assert()
    .success()
    .stdout(predicate::str::contains("Wrote Makefile"))
    .stdout(predicate::str::contains("Modules: 2"))
    .stdout(predicate::str::contains("Rules: 6"));

  let makefile = env.read_file("Makefile");
  assert!(makefile.contains("all: ./examples/add.so ./examples/sort.so\n"));
  assert!(makefile.contains("./examples/add.c: ./examples/add.lua ../src/luaot\n\t$(LUAOT) ./examples/add.lua -o ./examples/add.c\n"));
  assert!(makefile.contains("./examples/add.so: ./examples/add.S\n\t$(CC) -shared ./examples/add.S -o ./examples/add.so\n"));
}

#[test]
fn generate_direct_pipeline() {
  let env = TestEnv::from_fixture("direct.lua").with_sources(&["add.lua", "sort.lua"]);

  env
    .aotmake_cmd()
    .arg("generate")
    .assert()
    .success()
    .stdout(predicate::str::contains("Rules: 4"));

  let makefile = env.read_file("Makefile");
  assert!(makefile.contains("all: ./examples/add.so ./examples/sort.so\n"));
  assert!(makefile.contains("\trm -f -- ./examples/add.c ./examples/add.so ./examples/sort.c ./examples/sort.so\n"));
  assert!(!makefile.contains(".S"));
}

#[test]
fn kept_intermediates_match_compiler_file_names() {
  let env = TestEnv::empty().with_sources(&["add.lua"]);

  for (pipeline, clean) in [
    (
      "direct",
      "\trm -f -- ./examples/add.c ./examples/add.so ./examples/add.so-add.i ./examples/add.so-add.s ./examples/add.so-add.o\n",
    ),
    (
      "object",
      "\trm -f -- ./examples/add.c ./examples/add.o ./examples/add.i ./examples/add.s ./examples/add.so\n",
    ),
  ] {
    env
      .aotmake_cmd()
      .args(["generate", "--stdout", "--keep-intermediates", "--pipeline", pipeline])
      .assert()
      .success()
      .stdout(predicate::str::contains("-save-temps=obj\n"))
      .stdout(predicate::str::contains(clean));
  }
}

#[test]
fn generate_empty_directory_succeeds() {
  let env = TestEnv::empty();

  env
    .aotmake_cmd()
    .arg("generate")
    .assert()
    .success()
    .stderr(predicate::str::contains("No '.lua' sources"));

  assert!(env.read_file("Makefile").ends_with("all:\n\nclean:\n"));
}

#[test]
fn generate_case_collision_writes_nothing() {
  let env = TestEnv::empty();
  if !env.is_case_sensitive() {
    return;
  }
  let env = env.with_sources(&["Foo.lua", "foo.lua"]);

  env
    .aotmake_cmd()
    .arg("generate")
    .arg("--case-insensitive")
    .assert()
    .failure()
    .stderr(predicate::str::contains("module name collision"));

  assert!(!env.path().join("Makefile").exists());
}

#[test]
fn generate_failure_keeps_previous_makefile() {
  let env = TestEnv::from_fixture("missing_command.lua").with_sources(&["add.lua"]);
  env.write_file("Makefile", "previous\n");

  env
    .aotmake_cmd()
    .arg("generate")
    .assert()
    .failure()
    .stderr(predicate::str::contains("no command configured for stage generated -> shared"));

  assert_eq!(env.read_file("Makefile"), "previous\n");
}

#[test]
fn generate_stdout_writes_no_file() {
  let env = TestEnv::empty().with_sources(&["add.lua"]);

  env
    .aotmake_cmd()
    .args(["generate", "--stdout"])
    .assert()
    .success()
    .stdout(predicate::str::starts_with("# Generated by aotmake"))
    .stdout(predicate::str::contains(".PHONY: all clean"));

  assert!(!env.path().join("Makefile").exists());
}

#[test]
fn generate_stdout_conflicts_with_output() {
  let env = TestEnv::empty();

  env
    .aotmake_cmd()
    .args(["generate", "--stdout", "--output", "out.mk"])
    .assert()
    .failure();
}

#[test]
fn generate_ninja_to_custom_output() {
  let env = TestEnv::empty().with_sources(&["add.lua"]);

  env
    .aotmake_cmd()
    .args(["generate", "--format", "ninja", "--output", "gen/build.ninja"])
    .assert()
    .failure();

  std::fs::create_dir(env.path().join("gen")).unwrap();
  env
    .aotmake_cmd()
    .args(["generate", "--format", "ninja", "--output", "gen/build.ninja"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Format: ninja"));

  let ninja = env.read_file("gen/build.ninja");
  assert!(ninja.contains("rule assembly\n"));
  assert!(ninja.ends_with("default all\n"));
}

#[test]
fn generate_collapsed_ninja_from_config() {
  let env = TestEnv::from_fixture("ninja_collapsed.lua").with_sources(&["add.lua"]);

  env.aotmake_cmd().arg("generate").assert().success();

  let ninja = env.read_file("build.ninja");
  assert!(ninja.contains("  command = ${LUAOT} $in -o $mid0 && ${CC} ${CFLAGS} -shared $mid0 -o $out\n"));
  assert!(ninja.contains("-save-temps=obj\n"));
  assert!(ninja.contains("./examples/add.so-add.i ./examples/add.so-add.s ./examples/add.so-add.o\n"));
}

#[test]
fn generate_custom_pipeline_from_config() {
  let env = TestEnv::from_fixture("custom_pipeline.lua").with_sources(&["add.lua"]);

  env.aotmake_cmd().arg("generate").assert().success();

  let makefile = env.read_file("Makefile");
  assert!(makefile.contains("STRIP = strip --strip-unneeded\n"));
  assert!(makefile.contains("build/add.c: ./examples/add.lua /opt/lua-aot/src/luaot\n"));
  assert!(makefile.contains("\t$(LUAOT) add ./examples/add.lua > build/add.c\n"));
  assert!(makefile.contains("\t$(CC) -shared build/add.o -o build/add.so && $(STRIP) build/add.so\n"));
}

#[test]
fn generate_explicit_config_overrides_default_file() {
  let env = TestEnv::from_fixture("unknown_key.lua").with_sources(&["add.lua"]);
  env.write_file("configs/direct.lua", "return { pipeline = 'direct' }\n");

  env
    .aotmake_cmd()
    .args(["generate", "--config", "configs/direct.lua"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Rules: 2"));
}

#[test]
fn generate_rejects_unknown_config_key() {
  let env = TestEnv::from_fixture("unknown_key.lua");

  env
    .aotmake_cmd()
    .arg("generate")
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown config key 'inptu_dir'"));
}

#[test]
fn generate_missing_input_dir_fails() {
  let env = TestEnv::empty();

  env
    .aotmake_cmd()
    .args(["generate", "--input-dir", "nope"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("input directory does not exist"));

  assert!(!env.path().join("Makefile").exists());
}

#[test]
fn generate_is_idempotent() {
  let env = TestEnv::empty().with_sources(&["b.lua", "a.lua"]);
  env.write_file("Makefile", "stale\n");

  env.aotmake_cmd().arg("generate").assert().success();
  let first = env.read_file("Makefile");
  env.aotmake_cmd().arg("generate").assert().success();

  assert_ne!(first, "stale\n");
  assert_eq!(first, env.read_file("Makefile"));
}

#[test]
fn generate_after_removing_a_source() {
  let env = TestEnv::empty().with_sources(&["add.lua", "sort.lua"]);
  env.aotmake_cmd().arg("generate").assert().success();

  std::fs::remove_file(env.path().join("examples/sort.lua")).unwrap();
  env.aotmake_cmd().arg("generate").assert().success();

  let makefile = env.read_file("Makefile");
  assert!(!makefile.contains("sort"));
  assert!(makefile.contains("all: ./examples/add.so\n"));
}

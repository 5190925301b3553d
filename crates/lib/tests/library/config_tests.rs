use std::path::PathBuf;

use aotmake_lib::config::{self, ConfigError, ConfigOverrides, PipelineSetting};
use aotmake_lib::emit::Format;
use aotmake_lib::pipeline::Preset;

use super::common::Project;

#[test]
fn config_file_in_working_directory_is_picked_up() {
  let project = Project::new(r#"return { pipeline = "collapsed", keep_intermediates = true }"#, &[]);

  let config = config::resolve(project.root(), None, &ConfigOverrides::default()).unwrap();

  assert_eq!(config.pipeline, PipelineSetting::Preset(Preset::Collapsed));
  assert!(config.keep_intermediates);
}

#[test]
fn overrides_win_over_the_file() {
  let project = Project::new(r#"return { format = "make", pipeline = "object" }"#, &[]);
  let overrides = ConfigOverrides {
    format: Some(Format::Ninja),
    preset: Some(Preset::Direct),
    ..Default::default()
  };

  let config = config::resolve(project.root(), None, &overrides).unwrap();

  assert_eq!(config.format, Format::Ninja);
  assert_eq!(config.pipeline, PipelineSetting::Preset(Preset::Direct));
  assert_eq!(config.output_path(), PathBuf::from("build.ninja"));
}

#[test]
fn dir_is_bound_to_the_config_directory() {
  let project = Project::new(r#"return { input_dir = __dir .. "/src" }"#, &[]);

  let config = config::load_config(&project.config_path()).unwrap();

  assert_eq!(config.input_dir, project.canonical("src"));
}

#[test]
fn nested_unknown_key_is_reported_with_its_path() {
  let project = Project::new(r#"return { toolchain = { ccc = "clang" } }"#, &[]);

  let err = config::resolve(project.root(), None, &ConfigOverrides::default()).unwrap_err();

  assert!(
    matches!(&err, ConfigError::UnknownKey { key } if key == "toolchain.ccc"),
    "unexpected error: {err}"
  );
}

#[test]
fn explicit_missing_config_is_an_error() {
  let project = Project::new("return {}", &[]);
  let missing = project.root().join("nope.lua");

  let err = config::resolve(project.root(), Some(&missing), &ConfigOverrides::default()).unwrap_err();

  assert!(matches!(err, ConfigError::NotFound { .. }));
}

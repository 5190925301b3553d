//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated test environment.
///
/// Each test gets its own working directory; sources go under `examples/`,
/// the default input directory.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Create an environment with no config file.
  pub fn empty() -> Self {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("examples")).unwrap();
    Self { temp }
  }

  /// Create from a fixture file, copied to `aotmake.lua` in the working directory.
  pub fn from_fixture(name: &str) -> Self {
    let env = Self::empty();
    env.write_file("aotmake.lua", &fixture_content(name));
    env
  }

  /// Add empty Lua modules under `examples/`.
  pub fn with_sources(self, names: &[&str]) -> Self {
    for name in names {
      self.write_file(&format!("examples/{name}"), "return {}\n");
    }
    self
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn path(&self) -> &Path {
    self.temp.path()
  }

  /// Read a file relative to the temp directory.
  pub fn read_file(&self, relative_path: &str) -> String {
    std::fs::read_to_string(self.temp.path().join(relative_path))
      .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative_path, e))
  }

  /// Whether the directory distinguishes `Foo` from `foo`.
  pub fn is_case_sensitive(&self) -> bool {
    let probe = self.temp.path().join("CaseProbe");
    std::fs::write(&probe, "").unwrap();
    let sensitive = !self.temp.path().join("caseprobe").exists();
    std::fs::remove_file(&probe).unwrap();
    sensitive
  }

  /// Get a Command for the aotmake binary running in this environment.
  pub fn aotmake_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("aotmake");
    cmd.current_dir(dunce::canonicalize(self.temp.path()).unwrap());
    cmd.env_remove("RUST_LOG");
    cmd
  }
}

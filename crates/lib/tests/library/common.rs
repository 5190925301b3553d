use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A throwaway project: an `aotmake.lua` plus `src/` holding Lua modules.
pub struct Project {
  pub temp: TempDir,
}

impl Project {
  pub fn new(config: &str, modules: &[&str]) -> Self {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("aotmake.lua"), config).unwrap();
    fs::create_dir(temp.path().join("src")).unwrap();
    for name in modules {
      fs::write(temp.path().join("src").join(format!("{name}.lua")), "return {}\n").unwrap();
    }
    Self { temp }
  }

  pub fn root(&self) -> &Path {
    self.temp.path()
  }

  pub fn config_path(&self) -> PathBuf {
    self.root().join("aotmake.lua")
  }

  /// Canonical form of a project-relative path, matching what `__dir` yields.
  pub fn canonical(&self, relative: &str) -> PathBuf {
    dunce::canonicalize(self.root()).unwrap().join(relative)
  }
}

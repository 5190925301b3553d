//! Test utilities for aotmake-lib.
//!
//! Helpers for laying out throwaway source directories and building the
//! catalogs and plans most graph tests start from.

use std::path::PathBuf;

use tempfile::TempDir;

use crate::catalog::{Catalog, Module, ModuleName, NamingMode, discover};
use crate::graph::{BuildGraph, BuildPlan, build_graph};
use crate::pipeline::{Layout, Pipeline, Preset};
use crate::toolchain::Toolchain;

/// Create a temporary directory containing empty files with the given names.
pub fn source_dir(files: &[&str]) -> TempDir {
  let dir = TempDir::new().unwrap();
  for name in files {
    std::fs::write(dir.path().join(name), "return {}\n").unwrap();
  }
  dir
}

/// Discover `.lua` modules in a fresh directory containing `files`.
pub fn catalog_of(files: &[&str]) -> (TempDir, Catalog) {
  let dir = source_dir(files);
  let catalog = discover(dir.path(), ".lua", NamingMode::CaseSensitive).unwrap();
  (dir, catalog)
}

/// A plan writing artifacts next to the sources with the default toolchain.
pub fn plan_for(dir: &TempDir, preset: Preset) -> BuildPlan {
  BuildPlan {
    pipeline: Pipeline::preset(preset),
    layout: Layout::new(dir.path()),
    toolchain: Toolchain::default(),
    keep_intermediates: false,
  }
}

/// A catalog of `examples/<name>.lua` modules that never touches the disk.
pub fn fixed_catalog(names: &[&str]) -> Catalog {
  Catalog::from_modules(
    names
      .iter()
      .map(|name| Module {
        name: ModuleName(name.to_string()),
        source: PathBuf::from(format!("examples/{name}.lua")),
      })
      .collect(),
  )
}

/// The graph for [`fixed_catalog`] with artifacts in `examples/`.
pub fn fixed_graph(names: &[&str], preset: Preset, keep_intermediates: bool) -> BuildGraph {
  let plan = BuildPlan {
    pipeline: Pipeline::preset(preset),
    layout: Layout::new("examples"),
    toolchain: Toolchain::default(),
    keep_intermediates,
  };
  build_graph(&fixed_catalog(names), &plan).unwrap()
}

//! Artifact path derivation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::ArtifactKind;
use crate::catalog::ModuleName;

/// Where each kind of artifact lives and what it is called.
///
/// `path(kind, module) = dir(kind) / module + extension(kind)`. Every kind
/// defaults to `output_dir` and [`ArtifactKind::default_extension`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
  pub output_dir: PathBuf,
  pub dirs: BTreeMap<ArtifactKind, PathBuf>,
  pub extensions: BTreeMap<ArtifactKind, String>,
}

impl Layout {
  pub fn new(output_dir: impl Into<PathBuf>) -> Self {
    Self {
      output_dir: output_dir.into(),
      dirs: BTreeMap::new(),
      extensions: BTreeMap::new(),
    }
  }

  pub fn with_dir(mut self, kind: ArtifactKind, dir: impl Into<PathBuf>) -> Self {
    self.dirs.insert(kind, dir.into());
    self
  }

  pub fn with_extension(mut self, kind: ArtifactKind, extension: &str) -> Self {
    self.extensions.insert(kind, normalize_extension(extension));
    self
  }

  pub fn dir(&self, kind: ArtifactKind) -> &Path {
    self.dirs.get(&kind).map(PathBuf::as_path).unwrap_or(self.output_dir.as_path())
  }

  pub fn extension(&self, kind: ArtifactKind) -> &str {
    self
      .extensions
      .get(&kind)
      .map(String::as_str)
      .unwrap_or_else(|| kind.default_extension())
  }

  pub fn artifact_path(&self, kind: ArtifactKind, module: &ModuleName) -> PathBuf {
    self.dir(kind).join(format!("{}{}", module, self.extension(kind)))
  }
}

/// Accept `c` as well as `.c`.
pub(crate) fn normalize_extension(extension: &str) -> String {
  if extension.is_empty() || extension.starts_with('.') {
    extension.to_string()
  } else {
    format!(".{extension}")
  }
}

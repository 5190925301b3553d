//! Build description emitters.
//!
//! An [`Emitter`] serializes a [`BuildGraph`] to text and nothing else: it
//! never touches the filesystem. Persisting the text is the caller's job, see
//! [`write_atomic`].

mod escape;
mod make;
mod ninja;

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::consts::{MAKEFILE_NAME, NINJA_FILE_NAME};
use crate::graph::BuildGraph;
use crate::placeholder::PlaceholderError;

pub use make::MakefileEmitter;
pub use ninja::NinjaEmitter;

/// First line of every emitted description.
pub(crate) const HEADER: &str = "# Generated by aotmake. Do not edit; rerun `aotmake generate` instead.";

/// Errors that can occur while rendering or writing a build description.
#[derive(Debug, Error)]
pub enum EmitError {
  #[error("failed to render command for '{module}': {source}")]
  Placeholder { module: String, source: PlaceholderError },

  #[error("path cannot be written to a build description: {}", path.display())]
  UnencodablePath { path: PathBuf },

  #[error("value of variable '{name}' cannot be written to a build description")]
  UnencodableVar { name: String },

  #[error("failed to write {}: {source}", path.display())]
  Write { path: PathBuf, source: io::Error },

  #[error("failed to replace {}: {source}", path.display())]
  Persist { path: PathBuf, source: io::Error },
}

/// Serializes a build graph into one concrete syntax.
pub trait Emitter {
  fn format(&self) -> Format;

  /// Render `graph`. The same graph always renders to the same text.
  fn render(&self, graph: &BuildGraph) -> Result<String, EmitError>;
}

/// Supported build description syntaxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
  #[default]
  Make,
  Ninja,
}

impl Format {
  pub const ALL: [Format; 2] = [Format::Make, Format::Ninja];

  pub fn as_str(self) -> &'static str {
    match self {
      Format::Make => "make",
      Format::Ninja => "ninja",
    }
  }

  /// The well-known file name the build tool looks for.
  pub fn file_name(self) -> &'static str {
    match self {
      Format::Make => MAKEFILE_NAME,
      Format::Ninja => NINJA_FILE_NAME,
    }
  }

  pub fn emitter(self) -> Box<dyn Emitter> {
    match self {
      Format::Make => Box::new(MakefileEmitter),
      Format::Ninja => Box::new(NinjaEmitter),
    }
  }
}

impl fmt::Display for Format {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Format {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Format::ALL
      .into_iter()
      .find(|format| format.as_str() == s)
      .ok_or_else(|| format!("unknown output format '{s}' (expected make or ninja)"))
  }
}

/// Render `graph` in `format`.
pub fn render(graph: &BuildGraph, format: Format) -> Result<String, EmitError> {
  format.emitter().render(graph)
}

/// Replace `path` with `contents` without ever exposing a partial file.
///
/// The text is written to a temporary file in the same directory and renamed
/// over `path`, so readers see either the old description or the new one.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), EmitError> {
  let dir = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };

  let write_err = |source: io::Error| EmitError::Write {
    path: path.to_path_buf(),
    source,
  };

  let mut temp = NamedTempFile::new_in(dir).map_err(write_err)?;
  temp.write_all(contents.as_bytes()).map_err(write_err)?;
  temp.as_file().sync_all().map_err(write_err)?;

  temp.persist(path).map_err(|e| EmitError::Persist {
    path: path.to_path_buf(),
    source: e.error,
  })?;

  debug!(path = %path.display(), bytes = contents.len(), "build description written");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn format_names() {
    assert_eq!("ninja".parse::<Format>().unwrap(), Format::Ninja);
    assert!("cmake".parse::<Format>().is_err());
    assert_eq!(Format::Make.file_name(), "Makefile");
    assert_eq!(Format::Ninja.file_name(), "build.ninja");
    assert_eq!(Format::Ninja.emitter().format(), Format::Ninja);
  }

  #[test]
  fn write_atomic_replaces_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Makefile");
    std::fs::write(&path, "stale contents that are longer than the new ones\n").unwrap();

    write_atomic(&path, "all:\n").unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "all:\n");
    let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(leftovers.len(), 1);
  }

  #[test]
  fn write_atomic_into_missing_dir_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("Makefile");

    let err = write_atomic(&path, "all:\n").unwrap_err();

    assert!(matches!(err, EmitError::Write { .. }));
    assert!(!path.exists());
  }
}

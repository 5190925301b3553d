//! Source discovery.
//!
//! Scans one directory (non-recursively) for files carrying the configured
//! source extension and derives a module name from each file name. Modules are
//! returned in lexicographic file name order so that regenerating the build
//! description from an unchanged directory yields identical output.

mod types;

use std::collections::HashMap;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, trace};
use walkdir::WalkDir;

pub use types::{Catalog, Module, ModuleName, NamingMode};

/// Errors that can occur while discovering source modules.
#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("input directory does not exist: {}", path.display())]
  MissingDir { path: PathBuf },

  #[error("input path is not a directory: {}", path.display())]
  NotADirectory { path: PathBuf },

  #[error("failed to read input directory {}: {source}", path.display())]
  ReadDir { path: PathBuf, source: io::Error },

  #[error("failed to scan input directory {}: {source}", path.display())]
  Scan { path: PathBuf, source: walkdir::Error },

  #[error("source extension must not be empty")]
  EmptyExtension,

  #[error("module name '{name}' derived from {} is not a valid C identifier", path.display())]
  InvalidName { name: String, path: PathBuf },

  #[error(
    "module name collision ({mode}): {} and {} both map to '{name}'",
    first.display(),
    second.display()
  )]
  NameCollision {
    name: String,
    mode: &'static str,
    first: PathBuf,
    second: PathBuf,
  },
}

/// Discover the source modules in `dir`.
///
/// `extension` may be given with or without its leading dot. Files with other
/// extensions, hidden files and subdirectories are skipped.
///
/// # Errors
///
/// Returns an error if the directory is missing or unreadable, if a module name
/// is not a valid C identifier, or if two files map to the same module name
/// under `naming`.
pub fn discover(dir: &Path, extension: &str, naming: NamingMode) -> Result<Catalog, CatalogError> {
  let extension = extension.trim_start_matches('.');
  if extension.is_empty() {
    return Err(CatalogError::EmptyExtension);
  }

  match dir.metadata() {
    Ok(meta) if meta.is_dir() => {}
    Ok(_) => return Err(CatalogError::NotADirectory { path: dir.to_path_buf() }),
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      return Err(CatalogError::MissingDir { path: dir.to_path_buf() });
    }
    Err(e) => {
      return Err(CatalogError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
      });
    }
  }

  let mut modules: Vec<Module> = Vec::new();
  let mut seen: HashMap<String, usize> = HashMap::new();

  for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
    let entry = entry.map_err(|e| CatalogError::Scan {
      path: dir.to_path_buf(),
      source: e,
    })?;

    let path = entry.path();
    let file_name = entry.file_name();

    if file_name.to_string_lossy().starts_with('.') {
      trace!(path = %path.display(), "skipping hidden entry");
      continue;
    }
    if path.extension() != Some(OsStr::new(extension)) {
      continue;
    }
    // Follows symlinks; dangling links are skipped like any other non-file.
    if !path.is_file() {
      trace!(path = %path.display(), "skipping non-file entry");
      continue;
    }

    let stem = path.file_stem().unwrap_or_default();
    let name = match stem.to_str() {
      Some(s) => ModuleName(s.to_string()),
      None => {
        return Err(CatalogError::InvalidName {
          name: stem.to_string_lossy().into_owned(),
          path: path.to_path_buf(),
        });
      }
    };

    if !name.is_c_identifier() {
      return Err(CatalogError::InvalidName {
        name: name.0,
        path: path.to_path_buf(),
      });
    }

    let key = naming.key(&name);
    if let Some(&index) = seen.get(&key) {
      return Err(CatalogError::NameCollision {
        name: key,
        mode: naming.as_str(),
        first: modules[index].source.clone(),
        second: path.to_path_buf(),
      });
    }

    debug!(module = %name, source = %path.display(), "discovered module");
    seen.insert(key, modules.len());
    modules.push(Module {
      name,
      source: path.to_path_buf(),
    });
  }

  debug!(dir = %dir.display(), count = modules.len(), "discovery complete");
  Ok(Catalog::from_modules(modules))
}

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

/// Canonical module name: the source file name without its extension.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ModuleName(pub String);

impl ModuleName {
  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Whether the name can be used as the suffix of a C symbol (`luaopen_<name>`).
  pub fn is_c_identifier(&self) -> bool {
    let mut chars = self.0.chars();
    match chars.next() {
      Some(first) if first.is_ascii_alphabetic() || first == '_' => {
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
      }
      _ => false,
    }
  }
}

impl fmt::Display for ModuleName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// A discovered source module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
  pub name: ModuleName,
  pub source: PathBuf,
}

/// How module names are compared when checking for collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamingMode {
  #[default]
  CaseSensitive,
  /// `Foo.lua` and `foo.lua` name the same module.
  CaseInsensitive,
}

impl NamingMode {
  pub fn as_str(self) -> &'static str {
    match self {
      NamingMode::CaseSensitive => "case-sensitive",
      NamingMode::CaseInsensitive => "case-insensitive",
    }
  }

  /// The key two names must not share.
  pub fn key(self, name: &ModuleName) -> String {
    match self {
      NamingMode::CaseSensitive => name.0.clone(),
      NamingMode::CaseInsensitive => name.0.to_lowercase(),
    }
  }
}

impl FromStr for NamingMode {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "case-sensitive" => Ok(NamingMode::CaseSensitive),
      "case-insensitive" => Ok(NamingMode::CaseInsensitive),
      other => Err(format!(
        "unknown naming mode '{other}' (expected case-sensitive or case-insensitive)"
      )),
    }
  }
}

/// Modules discovered in one pass, in lexicographic file name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
  modules: Vec<Module>,
}

impl Catalog {
  pub(crate) fn from_modules(modules: Vec<Module>) -> Self {
    Self { modules }
  }

  pub fn modules(&self) -> &[Module] {
    &self.modules
  }

  pub fn iter(&self) -> impl Iterator<Item = &Module> {
    self.modules.iter()
  }

  pub fn len(&self) -> usize {
    self.modules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.modules.is_empty()
  }
}

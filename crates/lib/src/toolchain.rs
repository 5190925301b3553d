//! Native toolchain and translator identity.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::consts::{
  CC_VAR, CFLAGS_VAR, DEFAULT_CC, DEFAULT_CFLAGS, DEFAULT_INCLUDES, DEFAULT_LUASRC, DEFAULT_RETAIN_FLAG,
  DEFAULT_TRANSLATOR, TRANSLATOR_VAR,
};
use crate::pipeline::AuxDep;

/// The external tools a build description drives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toolchain {
  pub cc: String,
  pub cflags: String,
  pub translator: PathBuf,
  /// Shared header/footer files included by every generated module.
  pub includes: Vec<PathBuf>,
  /// Appended to CFLAGS when intermediates are kept.
  pub retain_flag: String,
  /// Extra variables, bound after the built-in ones in this order.
  pub vars: Vec<(String, String)>,
}

impl Toolchain {
  /// The default toolchain with the translator and includes found in `luasrc`.
  pub fn with_luasrc(luasrc: &Path) -> Self {
    Self {
      cc: DEFAULT_CC.to_string(),
      cflags: format!("{} -I{}", DEFAULT_CFLAGS, luasrc.display()),
      translator: luasrc.join(DEFAULT_TRANSLATOR),
      includes: DEFAULT_INCLUDES.iter().map(|name| luasrc.join(name)).collect(),
      retain_flag: DEFAULT_RETAIN_FLAG.to_string(),
      vars: Vec::new(),
    }
  }

  /// Variable bindings for the build description, in emission order.
  pub fn variables(&self, keep_intermediates: bool) -> Vec<(String, String)> {
    let cflags = if keep_intermediates && !self.retain_flag.is_empty() {
      format!("{} {}", self.cflags, self.retain_flag)
    } else {
      self.cflags.clone()
    };

    let mut vars = vec![
      (CC_VAR.to_string(), self.cc.clone()),
      (CFLAGS_VAR.to_string(), cflags),
      (TRANSLATOR_VAR.to_string(), self.translator.display().to_string()),
    ];
    vars.extend(self.vars.iter().cloned());
    vars
  }

  /// Names of every variable [`Toolchain::variables`] binds.
  pub fn variable_names(&self) -> Vec<&str> {
    let mut names = vec![CC_VAR, CFLAGS_VAR, TRANSLATOR_VAR];
    names.extend(self.vars.iter().map(|(name, _)| name.as_str()));
    names
  }

  /// Concrete paths of an auxiliary dependency.
  pub fn resolve(&self, dep: &AuxDep) -> Vec<PathBuf> {
    match dep {
      AuxDep::Translator => vec![self.translator.clone()],
      AuxDep::Includes => self.includes.clone(),
      AuxDep::Path(path) => vec![path.clone()],
    }
  }
}

impl Default for Toolchain {
  fn default() -> Self {
    Toolchain::with_luasrc(Path::new(DEFAULT_LUASRC))
  }
}

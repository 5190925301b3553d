//! Typed command model for pipeline steps.
//!
//! Each step names *what* it runs (translator, compiler, linker, or a custom
//! template) instead of carrying a preformatted string. All variants lower to
//! the same placeholder segments, so emitters validate and render them through
//! a single [`Resolver`](crate::placeholder::Resolver).

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::consts::{CC_VAR, CFLAGS_VAR, TRANSLATOR_VAR};
use crate::placeholder::{self, Placeholder, PlaceholderError, Segment};

/// How the translator receives its output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallConvention {
  /// `translator <src> -o <out>`
  #[default]
  OutputFlag,
  /// `translator <module> <src> > <out>`
  Redirect,
}

impl CallConvention {
  pub fn as_str(self) -> &'static str {
    match self {
      CallConvention::OutputFlag => "output-flag",
      CallConvention::Redirect => "redirect",
    }
  }
}

impl FromStr for CallConvention {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "output-flag" => Ok(CallConvention::OutputFlag),
      "redirect" => Ok(CallConvention::Redirect),
      other => Err(format!(
        "unknown calling convention '{other}' (expected output-flag or redirect)"
      )),
    }
  }
}

/// What a compiler invocation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompileMode {
  /// `-S`
  Assemble,
  /// `-c`
  Object,
  /// `-shared`
  Shared,
}

impl CompileMode {
  pub fn flag(self) -> &'static str {
    match self {
      CompileMode::Assemble => "-S",
      CompileMode::Object => "-c",
      CompileMode::Shared => "-shared",
    }
  }

  /// Files gcc keeps beside `output` under `-save-temps=obj`.
  ///
  /// Stopping at an object or assembly names them after the output
  /// (`add.o` leaves `add.i`, `add.s`). Compiling and linking in one command
  /// prefixes them with the output file name (`add.so` from `add.c` leaves
  /// `add.so-add.i`, `add.so-add.s`, `add.so-add.o`). The input itself is
  /// never a temporary.
  pub fn retained_temps(self, input: &Path, output: &Path) -> Vec<PathBuf> {
    let dir = output.parent().unwrap_or(Path::new(""));

    let (base, extensions): (OsString, &[&str]) = match self {
      CompileMode::Assemble => (output.file_stem().unwrap_or_default().to_os_string(), &[".i"][..]),
      CompileMode::Object => (output.file_stem().unwrap_or_default().to_os_string(), &[".i", ".s"][..]),
      CompileMode::Shared => {
        let mut base = output.file_name().unwrap_or_default().to_os_string();
        base.push("-");
        base.push(input.file_stem().unwrap_or_default());
        (base, &[".i", ".s", ".o"][..])
      }
    };

    extensions
      .iter()
      .map(|ext| {
        let mut name = base.clone();
        name.push(ext);
        dir.join(name)
      })
      .filter(|path| path != input)
      .collect()
  }
}

/// The command run by one pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CommandSpec {
  /// Run the AOT translator. `pass_module` adds the module name as the first
  /// argument; the `redirect` convention always passes it.
  Translate {
    convention: CallConvention,
    pass_module: bool,
  },

  /// `$(CC) $(CFLAGS) <mode> <in> -o <out>`
  Compile { mode: CompileMode },

  /// `$(CC) -shared <in> -o <out>`, no compile flags.
  Link,

  /// A user template, see [`crate::placeholder`].
  Custom { template: String },
}

impl CommandSpec {
  pub fn translate(convention: CallConvention) -> Self {
    CommandSpec::Translate {
      convention,
      pass_module: false,
    }
  }

  pub fn compile(mode: CompileMode) -> Self {
    CommandSpec::Compile { mode }
  }

  pub fn custom(template: &str) -> Self {
    CommandSpec::Custom {
      template: template.to_string(),
    }
  }

  /// Whether the translator binary is an input of this step.
  pub fn runs_translator(&self) -> bool {
    matches!(self, CommandSpec::Translate { .. })
  }

  /// Whether this step runs the C compiler over its input (and therefore reads
  /// the shared includes when that input is generated code).
  pub fn compiles(&self) -> bool {
    matches!(self, CommandSpec::Compile { .. })
  }

  /// Compiler intermediates this step leaves behind when CFLAGS carries the
  /// retain flag. Custom templates declare theirs on the transition.
  pub fn retained_temps(&self, input: &Path, output: &Path) -> Vec<PathBuf> {
    match self {
      CommandSpec::Compile { mode } => mode.retained_temps(input, output),
      _ => Vec::new(),
    }
  }

  /// Lower the command to placeholder segments.
  ///
  /// # Errors
  ///
  /// Only custom templates can fail, when they do not parse.
  pub fn segments(&self) -> Result<Vec<Segment>, PlaceholderError> {
    let input = Segment::Placeholder(Placeholder::Input);
    let output = Segment::Placeholder(Placeholder::Output);

    let segments = match self {
      CommandSpec::Translate {
        convention,
        pass_module,
      } => {
        let mut segments = vec![Segment::var(TRANSLATOR_VAR), Segment::literal(" ")];
        if *pass_module || *convention == CallConvention::Redirect {
          segments.push(Segment::Placeholder(Placeholder::Module));
          segments.push(Segment::literal(" "));
        }
        segments.push(input);
        segments.push(match convention {
          CallConvention::OutputFlag => Segment::literal(" -o "),
          CallConvention::Redirect => Segment::literal(" > "),
        });
        segments.push(output);
        segments
      }
      CommandSpec::Compile { mode } => vec![
        Segment::var(CC_VAR),
        Segment::literal(" "),
        Segment::var(CFLAGS_VAR),
        Segment::Literal(format!(" {} ", mode.flag())),
        input,
        Segment::literal(" -o "),
        output,
      ],
      CommandSpec::Link => vec![
        Segment::var(CC_VAR),
        Segment::literal(" -shared "),
        input,
        Segment::literal(" -o "),
        output,
      ],
      CommandSpec::Custom { template } => placeholder::parse(template)?,
    };

    Ok(segments)
  }
}

impl fmt::Display for CommandSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CommandSpec::Translate {
        convention,
        pass_module,
      } => {
        write!(f, "translate ({})", convention.as_str())?;
        if *pass_module {
          f.write_str(" with module name")?;
        }
        Ok(())
      }
      CommandSpec::Compile { mode } => write!(f, "compile {}", mode.flag()),
      CommandSpec::Link => f.write_str("link"),
      CommandSpec::Custom { template } => write!(f, "custom `{template}`"),
    }
  }
}

//! Placeholder parsing and substitution for command templates.
//!
//! Every rule command is stored as a list of segments so that each emitter can
//! bind the same template to its own syntax: a Makefile substitutes concrete
//! paths, a ninja file substitutes `$in`/`$out`.
//!
//! # Placeholder Formats
//!
//! - `$${in}` - the primary input of the step
//! - `$${out}` - the output of the step
//! - `$${module}` - the module name (e.g. `sort` for `sort.lua`)
//! - `$${var:NAME}` - a reference to a build-description variable
//!
//! # Shell Variables
//!
//! Single `$` characters pass through unchanged, so shell variables like
//! `$HOME` work naturally without any escaping.
//!
//! # Escaping
//!
//! Use `$$$` before `{` to produce a literal `$${` sequence.
//!
//! # Example
//!
//! ```
//! use aotmake_lib::placeholder::{parse, Segment, Placeholder};
//!
//! let segments = parse("$${var:CC} -shared $${in}").unwrap();
//! assert_eq!(segments, vec![
//!     Segment::Placeholder(Placeholder::Var("CC".to_string())),
//!     Segment::Literal(" -shared ".to_string()),
//!     Segment::Placeholder(Placeholder::Input),
//! ]);
//! ```

use serde::Serialize;
use thiserror::Error;

/// A parsed placeholder reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placeholder {
  /// `$${in}`
  Input,

  /// `$${out}`
  Output,

  /// `$${module}`
  Module,

  /// `$${var:NAME}`
  Var(String),
}

/// A segment of parsed text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
  /// Literal text (no placeholders)
  Literal(String),

  /// A placeholder to be resolved
  Placeholder(Placeholder),
}

impl Segment {
  pub fn literal(text: &str) -> Self {
    Segment::Literal(text.to_string())
  }

  pub fn var(name: &str) -> Self {
    Segment::Placeholder(Placeholder::Var(name.to_string()))
  }
}

/// Errors that can occur during placeholder parsing or resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceholderError {
  #[error("unclosed placeholder at position {0}")]
  Unclosed(usize),

  #[error("unknown placeholder type: {0}")]
  UnknownType(String),

  #[error("malformed placeholder: {0}")]
  Malformed(String),

  #[error("undefined variable: {0}")]
  UndefinedVar(String),
}

/// Binds placeholders to concrete text for one rendering target.
pub trait Resolver {
  fn resolve_input(&self) -> Result<String, PlaceholderError>;

  fn resolve_output(&self) -> Result<String, PlaceholderError>;

  fn resolve_module(&self) -> Result<String, PlaceholderError>;

  fn resolve_var(&self, name: &str) -> Result<String, PlaceholderError>;
}

/// Parse a string containing placeholders into segments.
///
/// # Errors
///
/// Returns an error if a placeholder is malformed (unclosed, unknown type, empty
/// variable name).
pub fn parse(input: &str) -> Result<Vec<Segment>, PlaceholderError> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut chars = input.char_indices().peekable();

  while let Some((pos, ch)) = chars.next() {
    if ch != '$' {
      literal.push(ch);
      continue;
    }

    match chars.peek() {
      Some((_, '$')) => {
        chars.next();

        match chars.peek() {
          Some((_, '$')) => {
            chars.next();

            match chars.peek() {
              Some((_, '{')) => {
                // $$${ -> literal $${
                literal.push_str("$${");
                chars.next();
              }
              _ => literal.push_str("$$$"),
            }
          }
          Some((_, '{')) => {
            chars.next();

            if !literal.is_empty() {
              segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }

            let mut content = String::new();
            let mut found_close = false;

            for (_, c) in chars.by_ref() {
              if c == '}' {
                found_close = true;
                break;
              }
              content.push(c);
            }

            if !found_close {
              return Err(PlaceholderError::Unclosed(pos));
            }

            segments.push(Segment::Placeholder(parse_placeholder_content(&content)?));
          }
          _ => literal.push_str("$$"),
        }
      }
      _ => literal.push('$'),
    }
  }

  if !literal.is_empty() {
    segments.push(Segment::Literal(literal));
  }

  Ok(segments)
}

/// Parse the content inside a placeholder (everything between `$${` and `}`).
fn parse_placeholder_content(content: &str) -> Result<Placeholder, PlaceholderError> {
  match content {
    "in" => return Ok(Placeholder::Input),
    "out" => return Ok(Placeholder::Output),
    "module" => return Ok(Placeholder::Module),
    _ => {}
  }

  let (kind, rest) = content
    .split_once(':')
    .ok_or_else(|| PlaceholderError::UnknownType(content.to_string()))?;

  match kind {
    "var" => {
      if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(PlaceholderError::Malformed(format!("invalid variable name in '{content}'")));
      }
      Ok(Placeholder::Var(rest.to_string()))
    }
    _ => Err(PlaceholderError::UnknownType(kind.to_string())),
  }
}

/// Variable names referenced by a template, in order of appearance.
pub fn referenced_vars(segments: &[Segment]) -> impl Iterator<Item = &str> {
  segments.iter().filter_map(|segment| match segment {
    Segment::Placeholder(Placeholder::Var(name)) => Some(name.as_str()),
    _ => None,
  })
}

/// Substitute placeholders in pre-parsed segments.
///
/// # Errors
///
/// Returns the first error the resolver reports.
pub fn substitute_segments(segments: &[Segment], resolver: &impl Resolver) -> Result<String, PlaceholderError> {
  let mut result = String::new();

  for segment in segments {
    match segment {
      Segment::Literal(s) => result.push_str(s),
      Segment::Placeholder(p) => {
        let value = match p {
          Placeholder::Input => resolver.resolve_input()?,
          Placeholder::Output => resolver.resolve_output()?,
          Placeholder::Module => resolver.resolve_module()?,
          Placeholder::Var(name) => resolver.resolve_var(name)?,
        };
        result.push_str(&value);
      }
    }
  }

  Ok(result)
}

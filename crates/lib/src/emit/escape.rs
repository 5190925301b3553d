//! Quoting rules for paths and recipe text.

use std::path::Path;

use super::EmitError;
use crate::placeholder::Segment;

/// The path as UTF-8 text that fits on one line.
pub(super) fn path_text(path: &Path) -> Result<&str, EmitError> {
  match path.to_str() {
    Some(text) if !text.contains(['\n', '\r']) => Ok(text),
    _ => Err(EmitError::UnencodablePath {
      path: path.to_path_buf(),
    }),
  }
}

/// Apply `escape` to the literal parts of a command template.
pub(super) fn escape_literals(segments: &[Segment], escape: fn(&str) -> String) -> Vec<Segment> {
  segments
    .iter()
    .map(|segment| match segment {
      Segment::Literal(text) => Segment::Literal(escape(text)),
      other => other.clone(),
    })
    .collect()
}

/// Quote `text` for a POSIX shell, leaving plain words alone.
pub(super) fn shell_quote(text: &str) -> String {
  let plain = !text.is_empty()
    && text
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | '+' | '=' | ',' | '@' | '%'));
  if plain {
    text.to_string()
  } else {
    format!("'{}'", text.replace('\'', r"'\''"))
  }
}

/// A path in a Makefile target or prerequisite list.
pub(super) fn make_target(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '$' => out.push_str("$$"),
      ' ' | '#' | ':' | '%' => {
        out.push('\\');
        out.push(c);
      }
      _ => out.push(c),
    }
  }
  out
}

/// Text inside a Makefile recipe, where only `$` is special to make.
pub(super) fn make_recipe(text: &str) -> String {
  text.replace('$', "$$")
}

/// A path in a ninja `build` line.
pub(super) fn ninja_path(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '$' | ' ' | ':' => {
        out.push('$');
        out.push(c);
      }
      _ => out.push(c),
    }
  }
  out
}

/// A ninja variable value or command.
pub(super) fn ninja_value(text: &str) -> String {
  text.replace('$', "$$")
}

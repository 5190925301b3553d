//! Lua configuration files.
//!
//! A configuration file is a Lua chunk returning a table:
//!
//! ```lua
//! return {
//!   input_dir = "./examples",
//!   pipeline = "direct",
//!   keep_intermediates = true,
//!   toolchain = { luasrc = "../src", cc = "clang" },
//!   layout = { dirs = { generated = "build/c" } },
//! }
//! ```
//!
//! The chunk runs with `__dir` bound to the directory of the file so paths can
//! be anchored to it explicitly. Relative paths are otherwise taken as given.

use std::fs;
use std::path::{Path, PathBuf};

use mlua::prelude::*;
use tracing::info;

use super::{ConfigError, GenerateConfig, PipelineSetting};
use crate::command::{CallConvention, CommandSpec, CompileMode};
use crate::consts::DEFAULT_LUASRC;
use crate::emit::Format;
use crate::pipeline::{ArtifactKind, AuxDep, Preset, Step, Transition};
use crate::toolchain::Toolchain;

/// Evaluate the configuration file at `path`.
///
/// # Errors
///
/// Fails if the file is missing, does not evaluate to a table, or contains an
/// unknown key or a value of the wrong shape.
pub fn load_config(path: &Path) -> Result<GenerateConfig, ConfigError> {
  if !path.is_file() {
    return Err(ConfigError::NotFound { path: path.to_path_buf() });
  }

  let lua = Lua::new();
  let value = eval_with_dir(&lua, path).map_err(|e| ConfigError::Lua {
    path: path.to_path_buf(),
    message: e.to_string(),
  })?;

  let table = match value {
    LuaValue::Table(table) => table,
    other => {
      return Err(ConfigError::NotATable {
        path: path.to_path_buf(),
        found: other.type_name(),
      });
    }
  };

  let config = read_config(&table)?;
  info!(path = %path.display(), "loaded config");
  Ok(config)
}

/// Run the file with `__dir` set to its canonical parent directory.
fn eval_with_dir(lua: &Lua, path: &Path) -> LuaResult<LuaValue> {
  let canonical_path = dunce::canonicalize(path)
    .map_err(|e| LuaError::external(format!("cannot resolve '{}': {}", path.display(), e)))?;

  let content = fs::read_to_string(&canonical_path)
    .map_err(|e| LuaError::external(format!("cannot read '{}': {}", canonical_path.display(), e)))?;

  let dir = canonical_path
    .parent()
    .unwrap_or(Path::new("."))
    .to_string_lossy()
    .into_owned();

  let env = lua.create_table()?;
  env.set("__dir", dir)?;

  // Globals stay reachable, writes stay local to the file
  let mt = lua.create_table()?;
  mt.set("__index", lua.globals())?;
  env.set_metatable(Some(mt))?;

  lua
    .load(&content)
    .set_name(format!("@{}", canonical_path.display()))
    .set_environment(env)
    .eval::<LuaValue>()
}

fn read_config(table: &LuaTable) -> Result<GenerateConfig, ConfigError> {
  let mut config = GenerateConfig::default();

  for (key, value) in entries("", table)? {
    match key.as_str() {
      "input_dir" => config.input_dir = path(&key, value)?,
      "output_dir" => config.output_dir = Some(path(&key, value)?),
      "extension" => config.extension = string(&key, value)?,
      "naming" => config.naming = parse(&key, value)?,
      "pipeline" => config.pipeline = read_pipeline(&key, value)?,
      "keep_intermediates" => config.keep_intermediates = boolean(&key, value)?,
      "format" => config.format = parse::<Format>(&key, value)?,
      "output" => config.output = Some(path(&key, value)?),
      "toolchain" => {
        let (toolchain, convention, pass_module) = read_toolchain(&key, value)?;
        config.toolchain = toolchain;
        config.convention = convention;
        config.pass_module = pass_module;
      }
      "layout" => {
        for (field, value) in entries(&key, &table_of(&key, value)?)? {
          let qualified = qualify(&key, &field);
          match field.as_str() {
            "dirs" => {
              for (kind, dir) in kind_map(&qualified, value)? {
                config.layout_dirs.insert(kind, path(&qualify(&qualified, kind.as_str()), dir)?);
              }
            }
            "extensions" => {
              for (kind, ext) in kind_map(&qualified, value)? {
                config
                  .layout_extensions
                  .insert(kind, string(&qualify(&qualified, kind.as_str()), ext)?);
              }
            }
            _ => return Err(ConfigError::UnknownKey { key: qualified }),
          }
        }
      }
      _ => return Err(ConfigError::UnknownKey { key }),
    }
  }

  Ok(config)
}

fn read_toolchain(
  key: &str,
  value: LuaValue,
) -> Result<(Toolchain, Option<CallConvention>, Option<bool>), ConfigError> {
  let table = table_of(key, value)?;

  // Collected first: `luasrc` decides the defaults the other keys override.
  let mut luasrc = None;
  let mut cc = None;
  let mut cflags = None;
  let mut translator = None;
  let mut includes = None;
  let mut retain_flag = None;
  let mut vars = Vec::new();
  let mut convention = None;
  let mut pass_module = None;

  for (field, value) in entries(key, &table)? {
    let qualified = qualify(key, &field);
    match field.as_str() {
      "luasrc" => luasrc = Some(path(&qualified, value)?),
      "cc" => cc = Some(string(&qualified, value)?),
      "cflags" => cflags = Some(string(&qualified, value)?),
      "translator" => translator = Some(path(&qualified, value)?),
      "includes" => {
        includes = Some(
          list(&qualified, value)?
            .into_iter()
            .map(|item| path(&qualified, item))
            .collect::<Result<Vec<_>, _>>()?,
        )
      }
      "retain_flag" => retain_flag = Some(string(&qualified, value)?),
      "convention" => convention = Some(parse::<CallConvention>(&qualified, value)?),
      "pass_module" => pass_module = Some(boolean(&qualified, value)?),
      "vars" => {
        for (name, value) in entries(&qualified, &table_of(&qualified, value)?)? {
          let text = string(&qualify(&qualified, &name), value)?;
          vars.push((name, text));
        }
      }
      _ => return Err(ConfigError::UnknownKey { key: qualified }),
    }
  }

  let mut toolchain = Toolchain::with_luasrc(luasrc.as_deref().unwrap_or(Path::new(DEFAULT_LUASRC)));
  if let Some(cc) = cc {
    toolchain.cc = cc;
  }
  if let Some(cflags) = cflags {
    toolchain.cflags = cflags;
  }
  if let Some(translator) = translator {
    toolchain.translator = translator;
  }
  if let Some(includes) = includes {
    toolchain.includes = includes;
  }
  if let Some(retain_flag) = retain_flag {
    toolchain.retain_flag = retain_flag;
  }
  toolchain.vars = vars;

  Ok((toolchain, convention, pass_module))
}

fn read_pipeline(key: &str, value: LuaValue) -> Result<PipelineSetting, ConfigError> {
  match value {
    LuaValue::String(_) => Ok(PipelineSetting::Preset(parse::<Preset>(key, value)?)),
    LuaValue::Table(_) => {
      let transitions = list(key, value)?
        .into_iter()
        .enumerate()
        .map(|(index, item)| read_transition(&format!("{key}[{}]", index + 1), item))
        .collect::<Result<Vec<_>, _>>()?;
      Ok(PipelineSetting::Custom(transitions))
    }
    other => Err(invalid(
      key,
      format!("expected a preset name or a list of transitions, got {}", other.type_name()),
    )),
  }
}

/// A transition is either a single step written inline (`to`, `command`) or a
/// collapsed rule listing its `steps`.
fn read_transition(key: &str, value: LuaValue) -> Result<Transition, ConfigError> {
  let table = table_of(key, value)?;

  let mut inline = Vec::new();
  let mut steps = None;
  let mut deps = Vec::new();
  let mut temps = Vec::new();

  for (field, value) in entries(key, &table)? {
    let qualified = qualify(key, &field);
    match field.as_str() {
      "to" | "command" | "convention" | "pass_module" => inline.push((field, value)),
      "steps" => {
        let items = list(&qualified, value)?;
        let mut parsed = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
          let step_key = format!("{qualified}[{}]", index + 1);
          let fields = entries(&step_key, &table_of(&step_key, item)?)?;
          parsed.push(read_step(&step_key, fields)?);
        }
        steps = Some(parsed);
      }
      "deps" => {
        for item in list(&qualified, value)? {
          deps.push(match string(&qualified, item)?.as_str() {
            "translator" => AuxDep::Translator,
            "includes" => AuxDep::Includes,
            other => AuxDep::Path(PathBuf::from(other)),
          });
        }
      }
      "temps" => {
        for item in list(&qualified, value)? {
          temps.push(string(&qualified, item)?);
        }
      }
      _ => return Err(ConfigError::UnknownKey { key: qualified }),
    }
  }

  let steps = match steps {
    Some(_) if !inline.is_empty() => {
      return Err(invalid(key, "use either `steps` or `to`/`command`, not both".to_string()));
    }
    Some(steps) => steps,
    None => vec![read_step(key, inline)?],
  };

  Ok(Transition { steps, deps, temps })
}

fn read_step(key: &str, fields: Vec<(String, LuaValue)>) -> Result<Step, ConfigError> {
  let mut to = None;
  let mut command = None;
  let mut convention = None;
  let mut pass_module = None;

  for (field, value) in fields {
    let qualified = qualify(key, &field);
    match field.as_str() {
      "to" => to = Some(parse::<ArtifactKind>(&qualified, value)?),
      "command" => command = Some((qualified, value)),
      "convention" => convention = Some(parse::<CallConvention>(&qualified, value)?),
      "pass_module" => pass_module = Some(boolean(&qualified, value)?),
      _ => return Err(ConfigError::UnknownKey { key: qualified }),
    }
  }

  let to = to.ok_or_else(|| invalid(key, "missing `to`".to_string()))?;

  // A missing command stays representable and is reported by pipeline validation
  let command = match command {
    None => None,
    Some((qualified, LuaValue::Table(table))) => {
      let mut template = None;
      for (field, value) in entries(&qualified, &table)? {
        match field.as_str() {
          "template" => template = Some(string(&qualify(&qualified, &field), value)?),
          _ => return Err(ConfigError::UnknownKey { key: qualify(&qualified, &field) }),
        }
      }
      let template = template.ok_or_else(|| invalid(&qualified, "missing `template`".to_string()))?;
      Some(CommandSpec::Custom { template })
    }
    Some((qualified, value)) => Some(match string(&qualified, value)?.as_str() {
      "translate" => CommandSpec::Translate {
        convention: convention.unwrap_or_default(),
        pass_module: pass_module.unwrap_or(false),
      },
      "assemble" => CommandSpec::compile(CompileMode::Assemble),
      "compile-object" => CommandSpec::compile(CompileMode::Object),
      "compile-shared" => CommandSpec::compile(CompileMode::Shared),
      "link" => CommandSpec::Link,
      other => {
        return Err(invalid(
          &qualified,
          format!("unknown command '{other}' (expected translate, assemble, compile-object, compile-shared, link or {{ template = ... }})"),
        ));
      }
    }),
  };

  if (convention.is_some() || pass_module.is_some()) && !matches!(command, Some(CommandSpec::Translate { .. })) {
    return Err(invalid(key, "`convention` and `pass_module` only apply to translate".to_string()));
  }

  Ok(Step { to, command })
}

/// String-keyed entries of a table, sorted by key.
fn entries(key: &str, table: &LuaTable) -> Result<Vec<(String, LuaValue)>, ConfigError> {
  let mut out = Vec::new();
  for pair in table.pairs::<LuaValue, LuaValue>() {
    let (k, v) = pair.map_err(|e| invalid(key, e.to_string()))?;
    let name = match k {
      LuaValue::String(s) => s.to_str().map_err(|e| invalid(key, e.to_string()))?.to_string(),
      other => {
        return Err(invalid(
          key,
          format!("expected string keys, got {}", other.type_name()),
        ));
      }
    };
    out.push((name, v));
  }
  out.sort_by(|a, b| a.0.cmp(&b.0));
  Ok(out)
}

/// Items of a sequence table, in order.
fn list(key: &str, value: LuaValue) -> Result<Vec<LuaValue>, ConfigError> {
  table_of(key, value)?
    .sequence_values::<LuaValue>()
    .collect::<LuaResult<Vec<_>>>()
    .map_err(|e| invalid(key, e.to_string()))
}

/// A table keyed by artifact kind name.
fn kind_map(key: &str, value: LuaValue) -> Result<Vec<(ArtifactKind, LuaValue)>, ConfigError> {
  let mut out = Vec::new();
  for (name, value) in entries(key, &table_of(key, value)?)? {
    let kind = name
      .parse::<ArtifactKind>()
      .map_err(|message| invalid(&qualify(key, &name), message))?;
    if kind == ArtifactKind::Source {
      return Err(invalid(
        &qualify(key, &name),
        "sources are not generated".to_string(),
      ));
    }
    out.push((kind, value));
  }
  Ok(out)
}

fn table_of(key: &str, value: LuaValue) -> Result<LuaTable, ConfigError> {
  match value {
    LuaValue::Table(table) => Ok(table),
    other => Err(invalid(key, format!("expected a table, got {}", other.type_name()))),
  }
}

fn string(key: &str, value: LuaValue) -> Result<String, ConfigError> {
  match value {
    LuaValue::String(s) => Ok(s.to_str().map_err(|e| invalid(key, e.to_string()))?.to_string()),
    other => Err(invalid(key, format!("expected a string, got {}", other.type_name()))),
  }
}

fn path(key: &str, value: LuaValue) -> Result<PathBuf, ConfigError> {
  string(key, value).map(PathBuf::from)
}

fn boolean(key: &str, value: LuaValue) -> Result<bool, ConfigError> {
  match value {
    LuaValue::Boolean(b) => Ok(b),
    other => Err(invalid(key, format!("expected a boolean, got {}", other.type_name()))),
  }
}

fn parse<T: std::str::FromStr<Err = String>>(key: &str, value: LuaValue) -> Result<T, ConfigError> {
  string(key, value)?.parse::<T>().map_err(|message| invalid(key, message))
}

fn qualify(prefix: &str, field: &str) -> String {
  if prefix.is_empty() {
    field.to_string()
  } else {
    format!("{prefix}.{field}")
  }
}

fn invalid(key: &str, message: String) -> ConfigError {
  ConfigError::InvalidValue {
    key: key.to_string(),
    message,
  }
}

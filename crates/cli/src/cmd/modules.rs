use anyhow::{Context, Result};

use aotmake_lib::catalog::discover;

use super::ConfigArgs;
use crate::output::{OutputFormat, print_info, print_json, print_module};

pub fn cmd_modules(args: &ConfigArgs, format: OutputFormat) -> Result<()> {
  let config = args.resolve()?;
  let catalog = discover(&config.input_dir, &config.extension, config.naming)
    .with_context(|| format!("Failed to scan {}", config.input_dir.display()))?;

  if format.is_json() {
    return print_json(&catalog.modules());
  }

  if catalog.is_empty() {
    print_info(&format!("No modules found in {}", config.input_dir.display()));
    return Ok(());
  }

  for module in catalog.iter() {
    print_module(module.name.as_str(), &module.source);
  }
  Ok(())
}

mod cmd;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::ConfigArgs;
use output::OutputFormat;

/// aotmake - build description generator for ahead-of-time compiled Lua modules
#[derive(Parser)]
#[command(name = "aotmake")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Generate the build description (Makefile by default)
  Generate {
    #[command(flatten)]
    config: ConfigArgs,

    /// Print the description instead of writing it
    #[arg(long, conflicts_with = "output")]
    stdout: bool,
  },

  /// List the source modules that would be built
  Modules {
    #[command(flatten)]
    config: ConfigArgs,

    #[arg(short, long, value_enum, default_value_t)]
    output_format: OutputFormat,
  },

  /// Show the rules of the build graph
  Graph {
    #[command(flatten)]
    config: ConfigArgs,

    #[arg(short, long, value_enum, default_value_t)]
    output_format: OutputFormat,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "info" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Generate { config, stdout } => cmd::cmd_generate(&config, stdout),
    Commands::Modules { config, output_format } => cmd::cmd_modules(&config, output_format),
    Commands::Graph { config, output_format } => cmd::cmd_graph(&config, output_format, cli.verbose),
  }
}

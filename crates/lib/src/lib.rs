//! aotmake-lib: build description generation for ahead-of-time compiled Lua
//!
//! The generator turns a directory of Lua modules into a Makefile (or ninja
//! file) that drives each module through the translator and the C toolchain:
//! - `catalog`: discovers source modules and their names
//! - `pipeline`: the ordered stages every module passes through
//! - `graph`: per-module rules, `all`/`clean`, and DAG validation
//! - `emit`: renders a graph as Make or ninja text
//! - `config`: defaults, Lua configuration files, command-line overrides

pub mod catalog;
pub mod command;
pub mod config;
pub mod consts;
pub mod emit;
pub mod generate;
pub mod graph;
pub mod pipeline;
pub mod placeholder;
pub mod toolchain;
pub mod util;

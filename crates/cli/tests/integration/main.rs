//! CLI integration tests for aotmake.

mod common;
mod generate_tests;
mod graph_tests;
mod modules_tests;

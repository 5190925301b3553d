//! End-to-end tests of the library API: configuration file to build description.

mod common;
mod config_tests;
mod generate_tests;

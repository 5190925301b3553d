//! Well-known names and defaults.

/// Configuration file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "aotmake.lua";

pub const DEFAULT_INPUT_DIR: &str = "./examples";
pub const DEFAULT_SOURCE_EXTENSION: &str = ".lua";

/// Directory holding the translator and the shared header/footer includes.
pub const DEFAULT_LUASRC: &str = "../src";
pub const DEFAULT_TRANSLATOR: &str = "luaot";
pub const DEFAULT_INCLUDES: [&str; 2] = ["luaot-generated-header.c", "luaot-generated-footer.c"];

pub const DEFAULT_CC: &str = "gcc -std=gnu99";
pub const DEFAULT_CFLAGS: &str = "-Wall -Wextra -std=c99 -pedantic -fPIC -O2 -Wno-unused-label -g";

/// Flag appended to CFLAGS when intermediate files are kept.
pub const DEFAULT_RETAIN_FLAG: &str = "-save-temps=obj";

/// Variable names bound in every emitted build description.
pub const CC_VAR: &str = "CC";
pub const CFLAGS_VAR: &str = "CFLAGS";
pub const TRANSLATOR_VAR: &str = "LUAOT";

pub const MAKEFILE_NAME: &str = "Makefile";
pub const NINJA_FILE_NAME: &str = "build.ninja";

pub const ALL_TARGET: &str = "all";
pub const CLEAN_TARGET: &str = "clean";
/// Input-less ninja phony that is always out of date.
pub const FORCE_TARGET: &str = "FORCE";

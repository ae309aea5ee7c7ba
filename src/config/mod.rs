//! Configuration loading for lazymod.
//!
//! lazymod reads a single kind of file, the module manifest (`lazymod.toml`, see
//! [`crate::manifest`]). This module holds the generic TOML plumbing and the
//! lookup rules for where that manifest lives:
//!
//! 1. `--manifest-path` on the command line
//! 2. the `LAZYMOD_MANIFEST` environment variable
//! 3. `lazymod.toml` in the current directory

pub mod parser;

pub use parser::{parse_config, parse_config_str};

use std::path::PathBuf;

use crate::constants::{MANIFEST_ENV_VAR, MANIFEST_FILE_NAME};

/// Resolve the manifest location from an explicit path, the environment, or the default.
pub fn manifest_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(MANIFEST_ENV_VAR).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(MANIFEST_FILE_NAME))
}

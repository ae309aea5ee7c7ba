//! Constants shared across lazymod.

/// Default file name of the module manifest.
pub const MANIFEST_FILE_NAME: &str = "lazymod.toml";

/// Environment variable overriding the manifest location.
pub const MANIFEST_ENV_VAR: &str = "LAZYMOD_MANIFEST";

/// Log level used when neither `--verbose` nor `--quiet` is given.
pub const DEFAULT_LOG_LEVEL: &str = "info";

//! Generic TOML parsing with file path context.
//!
//! Used for the module manifest and anything else lazymod reads from disk.
//! Errors carry the offending path so that a failure reads like:
//!
//! ```text
//! Failed to parse config file: /path/to/lazymod.toml
//! Caused by:
//!     invalid TOML value, expected string
//! ```

use anyhow::{Context, Result};
use std::path::Path;

/// Parse a TOML file into `T`.
///
/// ```rust,no_run
/// use lazymod::config::parse_config;
/// use serde::Deserialize;
/// use std::path::Path;
///
/// #[derive(Deserialize)]
/// struct Config {
///     name: String,
/// }
///
/// # fn example() -> anyhow::Result<()> {
/// let config: Config = parse_config(Path::new("config.toml"))?;
/// println!("Config: {}", config.name);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Fails if the file cannot be read or its content does not deserialize into `T`.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config_str(&content, &path.display().to_string())
}

/// Parse TOML text into `T`; `origin` names the source in error messages.
pub fn parse_config_str<T>(content: &str, origin: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    toml::from_str(content).with_context(|| format!("Failed to parse config file: {origin}"))
}

//! Command-line interface for lazymod.
//!
//! The binary assembles a [`Container`] from a module manifest (see
//! [`crate::manifest`]) and runs one command against it:
//!
//! - `resolve` - resolve one or more modules and print their values
//! - `tree` - show the dependency tree below a module
//! - `list` - list registered modules and their dependency lists
//! - `validate` - check the dependency graph without constructing anything
//!
//! ```bash
//! lazymod resolve c
//! lazymod --manifest-path ./app/lazymod.toml resolve db api --format json
//! lazymod -v tree api
//! lazymod validate
//! ```
//!
//! Logging goes to stderr through `tracing`; `--verbose` switches to `debug`,
//! `--quiet` turns it off, and `RUST_LOG` overrides both. Command errors are
//! always printed.

mod list;
mod resolve;
mod tree;
mod validate;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config;
use crate::constants::DEFAULT_LOG_LEVEL;
use crate::container::Container;
use crate::core::{ContainerError, DidYouMean};
use crate::manifest::Manifest;

pub use list::ListCommand;
pub use resolve::ResolveCommand;
pub use tree::TreeCommand;
pub use validate::ValidateCommand;

/// Output format shared by the commands that print structured data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON on stdout
    Json,
}

/// Runtime configuration derived from the global flags.
///
/// Kept separate from [`Cli`] so tests and embedders can run commands with
/// their own settings.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log level used when `RUST_LOG` is not set
    pub log_level: Option<String>,

    /// Manifest to load; `None` falls back to `LAZYMOD_MANIFEST`, then `./lazymod.toml`
    pub manifest_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The manifest path after applying the lookup order.
    pub fn resolved_manifest_path(&self) -> PathBuf {
        config::manifest_path(self.manifest_path.clone())
    }
}

#[derive(Parser)]
#[command(
    name = "lazymod",
    about = "Resolve lazily constructed modules from a dependency manifest",
    version,
    long_about = "lazymod builds modules declared in lazymod.toml on demand, constructing each dependency once and sharing it."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug output, including the resolution trace.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Turn logging off; errors are still shown.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the manifest file (lazymod.toml).
    #[arg(long, global = true, value_name = "PATH")]
    manifest_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve modules and print their values.
    Resolve(ResolveCommand),

    /// Show the dependency tree of a module.
    Tree(TreeCommand),

    /// List registered modules.
    List(ListCommand),

    /// Check that every dependency is registered and the graph is acyclic.
    Validate(ValidateCommand),
}

impl Cli {
    /// Execute the parsed command with configuration built from the flags.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "off"
        } else {
            DEFAULT_LOG_LEVEL
        };

        CliConfig {
            log_level: Some(log_level.to_string()),
            manifest_path: self.manifest_path.clone(),
        }
    }

    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        init_logging(config.log_level.as_deref());

        let manifest_path = config.resolved_manifest_path();
        match self.command {
            Commands::Resolve(cmd) => cmd.execute(&manifest_path).await,
            Commands::Tree(cmd) => cmd.execute(&manifest_path),
            Commands::List(cmd) => cmd.execute(&manifest_path),
            Commands::Validate(cmd) => cmd.execute(&manifest_path),
        }
    }
}

/// Install the stderr `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Calling this more than once is
/// harmless; only the first subscriber is installed.
pub fn init_logging(level: Option<&str>) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level.unwrap_or(DEFAULT_LOG_LEVEL))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .without_time()
        .try_init();
}

/// Load the manifest at `path` and register its modules into a new container.
pub(crate) fn load_container(path: &Path) -> Result<Container> {
    let manifest = Manifest::load(path)?;
    manifest.into_container()
}

/// Convert a container error, adding a "did you mean" hint for unknown names.
pub(crate) fn with_hint(container: &Container, error: ContainerError) -> anyhow::Error {
    let hint = error.missing_name().and_then(|name| container.suggest(name));
    match hint {
        Some(candidate) => anyhow::Error::from(error).context(DidYouMean(candidate)),
        None => error.into(),
    }
}

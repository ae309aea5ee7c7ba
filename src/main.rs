//! `lazymod` binary.
//!
//! Loads the module manifest, runs one command against the assembled
//! container and reports failures through
//! [`user_friendly_error`](lazymod::core::error::user_friendly_error):
//!
//! - `resolve` - construct modules and print their values
//! - `tree` - show the dependency tree of a module
//! - `list` - list registered modules
//! - `validate` - check the dependency graph without constructing anything
//!
//! Any error exits with status 1 after a single colored report on stderr.

use anyhow::Result;
use clap::Parser;
use lazymod::cli;
use lazymod::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}

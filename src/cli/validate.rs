//! `lazymod validate`: check a manifest without constructing any module.
//!
//! Validation fails, with exit code 1, if the manifest does not parse, a module
//! cannot be registered, a dependency is not registered, or the graph has a
//! cycle. In text mode the error itself is left to the binary's error display;
//! JSON mode also prints the failed results on stdout.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::{OutputFormat, load_container};

#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Outcome of a validation run, as printed in JSON mode.
#[derive(Debug, Default, Serialize)]
pub struct ValidationResults {
    pub valid: bool,
    pub modules: usize,
    pub errors: Vec<String>,
}

impl ValidateCommand {
    pub fn execute(self, manifest_path: &Path) -> Result<()> {
        let outcome = load_container(manifest_path).and_then(|container| {
            container.validate_graph()?;
            Ok(container.len())
        });

        match (self.format, outcome) {
            (OutputFormat::Json, Ok(modules)) => {
                let results = ValidationResults {
                    valid: true,
                    modules,
                    errors: Vec::new(),
                };
                println!("{}", serde_json::to_string_pretty(&results)?);
                Ok(())
            }
            (OutputFormat::Json, Err(e)) => {
                let results = ValidationResults {
                    valid: false,
                    modules: 0,
                    errors: vec![format!("{e:#}")],
                };
                println!("{}", serde_json::to_string_pretty(&results)?);
                Err(e)
            }
            (OutputFormat::Text, Ok(modules)) => {
                println!("{} Manifest is valid ({modules} modules)", "✓".green());
                Ok(())
            }
            // reported once, by the caller
            (OutputFormat::Text, Err(e)) => Err(e),
        }
    }
}

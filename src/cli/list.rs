//! `lazymod list`: registered modules and their dependency lists.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::{OutputFormat, load_container};

#[derive(Args, Debug)]
pub struct ListCommand {
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct ListEntry {
    name: String,
    dependencies: Vec<String>,
}

impl ListCommand {
    pub fn execute(self, manifest_path: &Path) -> Result<()> {
        let container = load_container(manifest_path)?;
        let entries: Vec<ListEntry> = container
            .names()
            .into_iter()
            .map(|name| {
                let dependencies = container.dependencies_of(&name).unwrap_or_default();
                ListEntry {
                    name,
                    dependencies,
                }
            })
            .collect();

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
            OutputFormat::Text => {
                if entries.is_empty() {
                    println!("{}", "No modules registered".yellow());
                }
                for entry in &entries {
                    if entry.dependencies.is_empty() {
                        println!("{}", entry.name.bold());
                    } else {
                        println!("{} -> {}", entry.name.bold(), entry.dependencies.join(", "));
                    }
                }
            }
        }
        Ok(())
    }
}

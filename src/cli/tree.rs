//! `lazymod tree`: show the dependency tree below a module.
//!
//! ```text
//! c
//! ├── a
//! └── b
//!     └── a (*)
//!
//! (*) = already shown above
//! ```
//!
//! Nothing is constructed; unregistered dependencies still appear as leaves so
//! the tree can be used to track down a missing module.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::{load_container, with_hint};
use crate::core::ContainerError;

#[derive(Args, Debug)]
pub struct TreeCommand {
    /// Module at the root of the tree
    #[arg(value_name = "NAME")]
    pub name: String,
}

impl TreeCommand {
    pub fn execute(self, manifest_path: &Path) -> Result<()> {
        let container = load_container(manifest_path)?;
        if !container.is_registered(&self.name) {
            return Err(with_hint(
                &container,
                ContainerError::NotRegistered {
                    name: self.name,
                },
            ));
        }

        let tree = container.dependency_graph().to_tree_string(&self.name);
        print!("{tree}");
        if tree.contains("(*)") {
            println!("\n{}", "(*) = already shown above".dimmed());
        }
        Ok(())
    }
}

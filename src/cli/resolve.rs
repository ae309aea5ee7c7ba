//! `lazymod resolve`: construct modules and print their values.
//!
//! All requested names are resolved concurrently against one container, so
//! modules they share are constructed once. The first failure aborts the
//! command.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use futures::future::try_join_all;
use serde_json::{Map, Value};

use super::{OutputFormat, load_container, with_hint};
use crate::core::ModuleValue;

#[derive(Args, Debug)]
pub struct ResolveCommand {
    /// Modules to resolve
    #[arg(required = true, value_name = "NAME")]
    pub names: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl ResolveCommand {
    pub async fn execute(self, manifest_path: &Path) -> Result<()> {
        let container = load_container(manifest_path)?;

        tracing::info!(target: "resolver", "Resolving {} module(s)", self.names.len());
        let values = try_join_all(self.names.iter().map(|name| container.resolve(name)))
            .await
            .map_err(|e| with_hint(&container, e))?;

        match self.format {
            OutputFormat::Text => {
                for (name, value) in self.names.iter().zip(&values) {
                    println!("{name} = {}", render_value(value));
                }
            }
            OutputFormat::Json => {
                let mut object = Map::new();
                for (name, value) in self.names.iter().zip(&values) {
                    object.insert(name.clone(), Value::String(render_value(value)));
                }
                println!("{}", serde_json::to_string_pretty(&Value::Object(object))?);
            }
        }
        Ok(())
    }
}

/// Printable form of a module value.
///
/// Manifest modules are always strings; anything else only shows its kind.
pub(crate) fn render_value(value: &ModuleValue) -> String {
    if let Some(s) = value.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = value.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else {
        "<opaque value>".to_string()
    }
}

//! Module manifest (`lazymod.toml`).
//!
//! A manifest declares modules in TOML so a container can be assembled without
//! writing Rust, which is what the `lazymod` binary operates on. Each module is
//! a table under `[modules]` and has exactly one of:
//!
//! - `value`: an already constructed value, registered like
//!   [`Container::register_and_export`](crate::container::Container::register_and_export).
//!   Strings are used as-is; other TOML values as their TOML text.
//! - `template`: a string factory, see [`Template`]. Its `{name}`
//!   placeholders are the module's dependencies unless `dependencies` lists
//!   them explicitly, in which case the explicit list wins.
//!
//! ```toml
//! [modules.a]
//! value = "a"
//!
//! [modules.b]
//! template = "{a}b"
//!
//! [modules.c]
//! template = "{a}{b}c"
//!
//! [modules.o2]
//! dependencies = ["o1"]
//! template = "{0} augmented"
//! ```
//!
//! Every module value produced from a manifest is a `String`.

pub mod template;

pub use template::Template;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::config::{parse_config, parse_config_str};
use crate::container::Container;
use crate::core::{Dependencies, Definition, Factory};

/// Parsed `lazymod.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Modules by name, in name order.
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleSpec>,
}

/// One `[modules.<name>]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleSpec {
    /// Explicit dependency list; overrides the template's placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,

    /// Pre-built value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<toml::Value>,

    /// String factory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let manifest: Self = parse_config(path)?;
        manifest.validate().with_context(|| format!("Invalid manifest: {}", path.display()))?;
        tracing::debug!(
            target: "manifest",
            "Loaded {} modules from {}",
            manifest.modules.len(),
            path.display()
        );
        Ok(manifest)
    }

    /// Parse and validate manifest text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let manifest: Self = parse_config_str(content, "<inline manifest>")?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check the rules serde cannot express.
    ///
    /// A module missing both `value` and `template` is not an error here; it is
    /// rejected at registration like any other definition without a factory.
    pub fn validate(&self) -> Result<()> {
        for (name, spec) in &self.modules {
            if spec.value.is_some() && spec.template.is_some() {
                bail!("Module '{name}' sets both `value` and `template`; choose one");
            }
            if spec.value.is_some() && spec.dependencies.is_some() {
                bail!("Module '{name}' has a `value` and cannot declare `dependencies`");
            }
        }
        Ok(())
    }

    /// Register every module into `container`, in name order.
    ///
    /// Stops at the first registration error.
    pub fn register_into(&self, container: &Container) -> Result<()> {
        for (name, spec) in &self.modules {
            spec.register(name, container)
                .with_context(|| format!("Failed to register module '{name}' from manifest"))?;
        }
        Ok(())
    }

    /// Build a fresh container holding every module of this manifest.
    pub fn into_container(&self) -> Result<Container> {
        let container = Container::new();
        self.register_into(&container)?;
        Ok(container)
    }
}

impl ModuleSpec {
    fn register(&self, name: &str, container: &Container) -> Result<()> {
        if let Some(value) = &self.value {
            let rendered = match value {
                toml::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            container.register_and_export(name, rendered)?;
            return Ok(());
        }

        let Some(source) = &self.template else {
            let definition = match &self.dependencies {
                Some(deps) => Definition::depends_on(deps.clone()),
                None => Definition::new(),
            };
            container.register(name, definition)?;
            return Ok(());
        };

        let template = Template::parse(source);
        let params = template.placeholder_names();
        let param_refs: Vec<&str> = params.iter().map(String::as_str).collect();
        let factory =
            Factory::new(move |deps: Dependencies| template.render(&deps)).with_params(&param_refs);

        let definition = match &self.dependencies {
            Some(deps) => Definition::depends_on(deps.clone()).with_factory(factory),
            None => Definition::from(factory),
        };
        container.register(name, definition)?;
        Ok(())
    }
}

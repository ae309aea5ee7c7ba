//! Module registry.
//!
//! The registry maps module names to their [`Registration`]. It is insert-only:
//! a name, once registered, can neither be replaced nor removed. All validation
//! happens before anything is stored, so a rejected registration leaves the
//! registry unchanged.
//!
//! Backed by a [`DashMap`] so that registrations and lookups from concurrently
//! running resolutions never block each other; the entry API makes the
//! uniqueness check and the insert a single atomic step.

pub mod extractor;

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use regex::Regex;

use crate::core::{ContainerError, Definition, Registration};

/// Registry of module registrations, keyed by name.
#[derive(Debug, Default)]
pub struct Registry {
    entries: DashMap<String, Arc<Registration>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a registration.
    ///
    /// # Errors
    ///
    /// - [`ContainerError::InvalidName`] if `name` fails [`validate_name`]
    /// - [`ContainerError::InvalidFactory`] if the definition carries no factory
    /// - [`ContainerError::DuplicateRegistration`] if `name` is already taken
    pub fn register(&self, name: &str, definition: Definition) -> Result<(), ContainerError> {
        validate_name(name)?;
        let Some(factory) = definition.factory else {
            return Err(ContainerError::InvalidFactory {
                name: name.to_string(),
            });
        };

        match self.entries.entry(name.to_string()) {
            Entry::Occupied(_) => Err(ContainerError::DuplicateRegistration {
                name: name.to_string(),
            }),
            Entry::Vacant(slot) => {
                let registration = Registration {
                    name: name.to_string(),
                    factory,
                    explicit_deps: definition.dependencies,
                };
                tracing::debug!(
                    target: "registry",
                    "Registered module '{}' with dependencies {:?}",
                    name,
                    extractor::extract(&registration)
                );
                slot.insert(Arc::new(registration));
                Ok(())
            }
        }
    }

    /// Look up a registration.
    pub fn get(&self, name: &str) -> Option<Arc<Registration>> {
        self.entries.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Snapshot of all registrations, sorted by name.
    pub fn registrations(&self) -> Vec<Arc<Registration>> {
        let mut all: Vec<_> = self.entries.iter().map(|e| Arc::clone(e.value())).collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// The registered name closest to `name`, for "did you mean" hints.
    pub fn closest_name(&self, name: &str) -> Option<String> {
        self.entries
            .iter()
            .map(|e| (strsim::levenshtein(name, e.key()), e.key().clone()))
            .filter(|(distance, _)| *distance <= 3)
            .min()
            .map(|(_, candidate)| candidate)
    }
}

/// Check that `name` is a usable module name.
///
/// Names must be non-empty and identifier-like: a letter or underscore followed
/// by letters, digits, `_`, `-` or `.`.
pub fn validate_name(name: &str) -> Result<(), ContainerError> {
    static NAME: OnceLock<Regex> = OnceLock::new();
    let re = NAME.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("module name pattern is valid")
    });

    if re.is_match(name) {
        Ok(())
    } else {
        Err(ContainerError::InvalidName {
            name: name.to_string(),
        })
    }
}

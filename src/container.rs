//! The container facade.
//!
//! [`Container`] ties a [`Registry`] to a [`Resolver`] and is the only type most
//! callers need: register modules, then resolve them.
//!
//! ```rust
//! use lazymod::{Container, factory};
//!
//! # async fn example() -> Result<(), lazymod::ContainerError> {
//! let container = Container::new();
//! container.register_and_export("a", "a".to_string())?;
//! container.register("b", factory!(|a: String| format!("{a}b")))?;
//! container.register("c", factory!(|a: String, b: String| format!("{a}{b}c")))?;
//!
//! assert_eq!(*container.resolve_as::<String>("c").await?, "aabc");
//! # Ok(())
//! # }
//! ```

use std::any::{Any, type_name};
use std::sync::Arc;

use crate::core::{ContainerError, Definition, Factory, ModuleValue};
use crate::registry::Registry;
use crate::registry::extractor::extract;
use crate::resolver::{DependencyGraph, Resolver};

/// A dependency-injection container of lazily constructed, memoized modules.
///
/// Cloning a container is cheap and yields a handle to the same registry and
/// cache.
#[derive(Clone)]
pub struct Container {
    registry: Arc<Registry>,
    resolver: Resolver,
}

impl Container {
    pub fn new() -> Self {
        let registry = Arc::new(Registry::new());
        let resolver = Resolver::new(Arc::clone(&registry));
        Self {
            registry,
            resolver,
        }
    }

    /// Register a module.
    ///
    /// `definition` is either a [`Factory`], whose parameter names are its
    /// dependencies, or an explicit dependency list paired with a factory:
    ///
    /// ```rust
    /// # use lazymod::{Container, Definition, factory};
    /// # fn example() -> Result<(), lazymod::ContainerError> {
    /// let container = Container::new();
    /// container.register("o1", factory!(|| "o1".to_string()))?;
    /// container.register("o2", (["o1"], factory!(|foo: String| format!("{foo} augmented"))))?;
    /// container.register("o3", Definition::depends_on(["o2"]).with_factory(factory!(|x: String| x.len())))?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// [`ContainerError::InvalidName`], [`ContainerError::InvalidFactory`] or
    /// [`ContainerError::DuplicateRegistration`]; the container is unchanged.
    pub fn register(&self, name: &str, definition: impl Into<Definition>) -> Result<(), ContainerError> {
        self.registry.register(name, definition.into())
    }

    /// Register an already constructed value and hand it back.
    ///
    /// The returned `Arc` is the very value later resolutions of `name` yield.
    pub fn register_and_export<T>(&self, name: &str, value: T) -> Result<Arc<T>, ContainerError>
    where
        T: Any + Send + Sync,
    {
        let value = Arc::new(value);
        let shared: ModuleValue = value.clone();
        self.registry.register(name, Factory::constant(shared).into())?;
        Ok(value)
    }

    /// Resolve a module's type-erased value.
    ///
    /// See [`Resolver::resolve`] for the resolution semantics and errors.
    pub async fn resolve(&self, name: &str) -> Result<ModuleValue, ContainerError> {
        self.resolver.resolve(name).await
    }

    /// Resolve a module and downcast it to `T`.
    pub async fn resolve_as<T>(&self, name: &str) -> Result<Arc<T>, ContainerError>
    where
        T: Any + Send + Sync,
    {
        let value = self.resolve(name).await?;
        value.downcast::<T>().map_err(|_| ContainerError::TypeMismatch {
            module: name.to_string(),
            expected: type_name::<T>().to_string(),
        })
    }

    /// The modules resolving `name` would construct, dependencies first.
    pub fn plan(&self, name: &str) -> Result<Vec<String>, ContainerError> {
        if !self.registry.contains(name) {
            return Err(ContainerError::NotRegistered {
                name: name.to_string(),
            });
        }
        self.resolver.plan(name)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Whether `name` has been constructed and cached.
    pub fn is_resolved(&self, name: &str) -> bool {
        self.resolver.cache().is_ready(name)
    }

    /// Registered module names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// The extracted dependency list of `name`, if registered.
    pub fn dependencies_of(&self, name: &str) -> Option<Vec<String>> {
        self.registry.get(name).map(|registration| extract(&registration).to_vec())
    }

    /// A registered name close to `name`, for "did you mean" hints.
    pub fn suggest(&self, name: &str) -> Option<String> {
        self.registry.closest_name(name)
    }

    /// Graph of every registered module and its declared dependencies.
    pub fn dependency_graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for registration in self.registry.registrations() {
            graph.add_module(&registration.name);
            for dependency in extract(&registration) {
                graph.add_dependency(&registration.name, dependency);
            }
        }
        graph
    }

    /// Check the whole container without constructing anything.
    ///
    /// Reports the first dependency that is not registered (modules in name
    /// order, dependencies in declared order), then any cycle.
    pub fn validate_graph(&self) -> Result<(), ContainerError> {
        for registration in self.registry.registrations() {
            if let Some(missing) =
                extract(&registration).iter().find(|dependency| !self.registry.contains(dependency))
            {
                return Err(ContainerError::DependencyNotFound {
                    module: registration.name.clone(),
                    dependency: missing.clone(),
                });
            }
        }
        self.dependency_graph().detect_cycles()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("modules", &self.registry.names())
            .field("cache", self.resolver.cache())
            .finish()
    }
}

//! Resolution engine.
//!
//! Resolving a module happens in two passes over the same edges:
//!
//! 1. **Cycle check** walks the registry depth-first from the requested
//!    module, following each module's extracted dependency list in order. The
//!    walk threads an explicit [`ResolutionStack`] holding the modules on the
//!    current path. Reaching a module that is already on the stack is a cycle;
//!    reaching one that was fully explored through another branch (a diamond)
//!    is not. Unregistered names are leaves here, since an earlier sibling's
//!    factory may still register them. Constructed modules are not descended
//!    into. No factory runs during this walk.
//! 2. **Construction** resolves the dependencies of a module one after the
//!    other, in declared order, each fully constructed before the next starts,
//!    and passes the values to the factory positionally. A dependency that is
//!    still unregistered when its turn comes fails with
//!    [`ContainerError::DependencyNotFound`], naming the module that asked for
//!    it; siblings constructed before it stay cached. The stack is carried
//!    along, so a cycle introduced by a module registered mid-resolution is
//!    still caught on its path. Results go through the [`ResolutionCache`],
//!    which hands concurrent requesters of the same module the same in-flight
//!    future, so each factory runs at most once per container.
//!
//! Because the registered graph below a resolution is checked acyclic before
//! any in-flight future exists, waiting on another resolution's in-flight
//! module can never wait on itself, even when independent top-level
//! resolutions interleave.
//!
//! # Failure semantics
//!
//! The first failure in declared order aborts the whole top-level resolution
//! and is returned unchanged; nothing is retried or substituted. The
//! resolution stack unwinds on every failure path, and failed modules are
//! never cached, so later resolutions are unaffected.

pub mod cache;
pub mod dependency_graph;

use std::collections::HashSet;
use std::sync::Arc;

use futures::FutureExt;

use crate::core::{ContainerError, Dependencies, ModuleValue};
use crate::registry::Registry;
use crate::registry::extractor::extract;

pub use cache::{ResolutionCache, SharedResolution};
pub use dependency_graph::DependencyGraph;

/// The modules on the current resolution path, outermost first.
///
/// One stack exists per top-level resolution. Construction clones it into
/// each module it starts, so dropping the clone pops the module again.
#[derive(Debug, Default, Clone)]
pub struct ResolutionStack {
    path: Vec<String>,
}

impl ResolutionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str) {
        self.path.push(name.to_string());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.path.pop()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.path.iter().any(|n| n == name)
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// The chain `name -> ... -> name` if `name` closes a cycle on this path.
    pub fn cycle_through(&self, name: &str) -> Option<String> {
        let start = self.path.iter().position(|n| n == name)?;
        let mut chain: Vec<&str> = self.path[start..].iter().map(String::as_str).collect();
        chain.push(name);
        Some(chain.join(" -> "))
    }
}

/// Resolves modules from a [`Registry`], memoizing every constructed value.
#[derive(Clone)]
pub struct Resolver {
    inner: Arc<ResolverInner>,
}

struct ResolverInner {
    registry: Arc<Registry>,
    cache: ResolutionCache,
}

impl Resolver {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            inner: Arc::new(ResolverInner {
                registry,
                cache: ResolutionCache::new(),
            }),
        }
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.inner.cache
    }

    /// Resolve `name`, constructing it and its dependencies as needed.
    ///
    /// # Errors
    ///
    /// - [`ContainerError::NotRegistered`] if `name` itself is unknown
    /// - [`ContainerError::CircularDependency`] if the graph below `name` has a cycle
    /// - [`ContainerError::DependencyNotFound`] if a transitive dependency is
    ///   unknown when its turn comes
    /// - [`ContainerError::FactoryFailed`], [`ContainerError::TypeMismatch`] or
    ///   [`ContainerError::MissingArgument`] if a factory fails
    ///
    /// Among dependency failures, the first in declared order wins.
    pub async fn resolve(&self, name: &str) -> Result<ModuleValue, ContainerError> {
        if !self.inner.registry.contains(name) {
            return Err(ContainerError::NotRegistered {
                name: name.to_string(),
            });
        }

        if let Some(value) = self.inner.cache.get_ready(name) {
            tracing::trace!(target: "resolver", "Module '{}' already resolved", name);
            return Ok(value);
        }

        let plan = self.plan(name)?;
        tracing::debug!(target: "resolver", "Resolving '{}' via {:?}", name, plan);

        self.inner.instantiate(name, &ResolutionStack::new()).await
    }

    /// The registered modules that resolving `name` would construct,
    /// dependencies first.
    ///
    /// Modules that are already constructed, and dependencies that are not
    /// registered yet, are left out. Fails on a cycle exactly like
    /// [`resolve`](Self::resolve) would, without running any factory.
    pub fn plan(&self, name: &str) -> Result<Vec<String>, ContainerError> {
        let mut stack = ResolutionStack::new();
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        self.visit(name, None, &mut stack, &mut visited, &mut order)?;
        Ok(order)
    }

    fn visit(
        &self,
        name: &str,
        requested_by: Option<&str>,
        stack: &mut ResolutionStack,
        visited: &mut HashSet<String>,
        order: &mut Vec<String>,
    ) -> Result<(), ContainerError> {
        if let Some(chain) = stack.cycle_through(name) {
            return Err(ContainerError::CircularDependency { chain });
        }
        if visited.contains(name) {
            return Ok(());
        }

        let Some(registration) = self.inner.registry.get(name) else {
            if requested_by.is_none() {
                return Err(ContainerError::NotRegistered {
                    name: name.to_string(),
                });
            }
            // reported during construction, once it is this dependency's turn
            tracing::trace!(target: "resolver", "'{}' is not registered yet", name);
            return Ok(());
        };

        if self.inner.cache.is_ready(name) {
            visited.insert(name.to_string());
            return Ok(());
        }

        stack.push(name);
        for dependency in extract(&registration) {
            if let Err(err) = self.visit(dependency, Some(name), stack, visited, order) {
                stack.pop();
                return Err(err);
            }
        }
        stack.pop();

        visited.insert(name.to_string());
        order.push(name.to_string());
        Ok(())
    }
}

impl ResolverInner {
    /// Join or start the construction of `name` below the path in `stack`.
    fn instantiate(self: &Arc<Self>, name: &str, stack: &ResolutionStack) -> SharedResolution {
        self.cache.join_or_start(name, || {
            let this = Arc::clone(self);
            let name = name.to_string();
            let mut stack = stack.clone();
            async move {
                stack.push(&name);
                let result = this.construct(&name, &stack).await;
                this.cache.complete(&name, &result);
                result
            }
            .boxed()
            .shared()
        })
    }

    async fn construct(
        self: &Arc<Self>,
        name: &str,
        stack: &ResolutionStack,
    ) -> Result<ModuleValue, ContainerError> {
        let registration = self.registry.get(name).ok_or_else(|| ContainerError::NotRegistered {
            name: name.to_string(),
        })?;
        let names = extract(&registration).to_vec();

        let mut values = Vec::with_capacity(names.len());
        for dependency in &names {
            if let Some(chain) = stack.cycle_through(dependency) {
                return Err(ContainerError::CircularDependency { chain });
            }
            if !self.registry.contains(dependency) {
                return Err(ContainerError::DependencyNotFound {
                    module: name.to_string(),
                    dependency: dependency.clone(),
                });
            }
            values.push(self.instantiate(dependency, stack).await?);
        }

        tracing::debug!(target: "resolver", "Invoking factory of '{}'", name);
        registration.factory.invoke(Dependencies::new(name, names, values)).await.map_err(|err| {
            tracing::warn!(target: "resolver", "Factory of '{}' failed: {:#}", name, err);
            match err.downcast::<ContainerError>() {
                Ok(container_error) => container_error,
                Err(err) => ContainerError::FactoryFailed {
                    module: name.to_string(),
                    reason: format!("{err:#}"),
                },
            }
        })
    }
}

//! Module values, factories and registration entries.
//!
//! A module's value is type-erased into a [`ModuleValue`] so that one container
//! can hold modules of any type. Factories receive the resolved values of their
//! dependencies as [`Dependencies`], in the order the dependency list declares
//! them, and downcast each one back to its concrete type.

use std::any::{Any, type_name};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::core::ContainerError;

/// A constructed module, shared between every module that depends on it.
pub type ModuleValue = Arc<dyn Any + Send + Sync>;

/// The future returned by invoking a factory.
pub type FactoryFuture = BoxFuture<'static, anyhow::Result<ModuleValue>>;

type FactoryFn = dyn Fn(Dependencies) -> FactoryFuture + Send + Sync;

/// A callable that builds a module value from its resolved dependencies.
///
/// Besides the callable itself a factory carries its declared parameter names.
/// These are recorded at compile time by the [`factory!`](crate::factory) macro
/// and serve as the module's dependency list when no explicit list is given.
#[derive(Clone)]
pub struct Factory {
    params: Vec<String>,
    call: Arc<FactoryFn>,
}

impl Factory {
    /// Create a factory from a synchronous closure.
    ///
    /// The factory declares no parameters; pair it with an explicit dependency
    /// list (see [`Definition::depends_on`]) if it needs any.
    pub fn new<F, T, E>(f: F) -> Self
    where
        F: Fn(Dependencies) -> Result<T, E> + Send + Sync + 'static,
        T: Any + Send + Sync,
        E: Into<anyhow::Error>,
    {
        Self {
            params: Vec::new(),
            call: Arc::new(move |deps: Dependencies| -> FactoryFuture {
                let result: anyhow::Result<ModuleValue> =
                    f(deps).map(|value| Arc::new(value) as ModuleValue).map_err(Into::into);
                futures::future::ready(result).boxed()
            }),
        }
    }

    /// Create a factory from a closure returning a future.
    pub fn new_async<F, Fut, T, E>(f: F) -> Self
    where
        F: Fn(Dependencies) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Any + Send + Sync,
        E: Into<anyhow::Error>,
    {
        Self {
            params: Vec::new(),
            call: Arc::new(move |deps: Dependencies| -> FactoryFuture {
                f(deps)
                    .map(|result: Result<T, E>| -> anyhow::Result<ModuleValue> {
                        result.map(|value| Arc::new(value) as ModuleValue).map_err(Into::into)
                    })
                    .boxed()
            }),
        }
    }

    /// A zero-parameter factory returning an existing shared value.
    pub fn constant(value: ModuleValue) -> Self {
        Self {
            params: Vec::new(),
            call: Arc::new(move |_: Dependencies| -> FactoryFuture {
                futures::future::ready(Ok(Arc::clone(&value))).boxed()
            }),
        }
    }

    /// Record the factory's declared parameter names.
    #[must_use]
    pub fn with_params(mut self, params: &[&str]) -> Self {
        self.params = params.iter().map(|p| (*p).to_string()).collect();
        self
    }

    /// The declared parameter names, in declaration order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub(crate) fn invoke(&self, deps: Dependencies) -> FactoryFuture {
        (self.call)(deps)
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory").field("params", &self.params).finish_non_exhaustive()
    }
}

/// The resolved dependency values handed to a factory.
#[derive(Clone)]
pub struct Dependencies {
    module: String,
    names: Vec<String>,
    values: Vec<ModuleValue>,
}

impl Dependencies {
    pub(crate) fn new(module: impl Into<String>, names: Vec<String>, values: Vec<ModuleValue>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self {
            module: module.into(),
            names,
            values,
        }
    }

    /// Name of the module being constructed.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Dependency names, in the order the values were resolved.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The type-erased value at `index`.
    pub fn raw(&self, index: usize) -> Result<&ModuleValue, ContainerError> {
        self.values.get(index).ok_or_else(|| ContainerError::MissingArgument {
            module: self.module.clone(),
            index,
        })
    }

    /// The value at `index`, downcast to `T`.
    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>, ContainerError> {
        let value = Arc::clone(self.raw(index)?);
        value.downcast::<T>().map_err(|_| ContainerError::TypeMismatch {
            module: self.names[index].clone(),
            expected: type_name::<T>().to_string(),
        })
    }

    /// The value of the dependency called `name`, downcast to `T`.
    pub fn by_name<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, ContainerError> {
        let index = self.names.iter().position(|n| n == name).ok_or_else(|| {
            ContainerError::DependencyNotFound {
                module: self.module.clone(),
                dependency: name.to_string(),
            }
        })?;
        self.get(index)
    }

    /// Consume the dependencies as positional arguments.
    pub fn positional(self) -> Positional {
        Positional {
            deps: self,
            next: 0,
        }
    }
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependencies")
            .field("module", &self.module)
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

/// Cursor handing out dependency values one parameter at a time.
#[derive(Debug)]
pub struct Positional {
    deps: Dependencies,
    next: usize,
}

impl Positional {
    /// The next argument, downcast to `T`.
    #[allow(clippy::should_implement_trait)]
    pub fn next<T: Any + Send + Sync>(&mut self) -> Result<Arc<T>, ContainerError> {
        let value = self.deps.get(self.next)?;
        self.next += 1;
        Ok(value)
    }
}

/// What a caller hands to [`Container::register`](crate::container::Container::register).
///
/// Mirrors the two registration forms: a bare factory, whose parameter names
/// are its dependencies, or an explicit dependency list followed by a factory.
/// A definition without a factory is rejected at registration.
#[derive(Debug, Clone, Default)]
pub struct Definition {
    pub(crate) dependencies: Option<Vec<String>>,
    pub(crate) factory: Option<Factory>,
}

impl Definition {
    /// An empty definition, with neither dependencies nor factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// A definition with an explicit dependency list and no factory yet.
    pub fn depends_on<I, S>(dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dependencies: Some(dependencies.into_iter().map(Into::into).collect()),
            factory: None,
        }
    }

    /// Attach the factory.
    #[must_use]
    pub fn with_factory(mut self, factory: Factory) -> Self {
        self.factory = Some(factory);
        self
    }
}

impl From<Factory> for Definition {
    fn from(factory: Factory) -> Self {
        Self {
            dependencies: None,
            factory: Some(factory),
        }
    }
}

impl<const N: usize> From<([&str; N], Factory)> for Definition {
    fn from((dependencies, factory): ([&str; N], Factory)) -> Self {
        Self::depends_on(dependencies).with_factory(factory)
    }
}

impl From<(Vec<String>, Factory)> for Definition {
    fn from((dependencies, factory): (Vec<String>, Factory)) -> Self {
        Self::depends_on(dependencies).with_factory(factory)
    }
}

/// A validated registry entry.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Unique module name
    pub name: String,
    /// Builds the module's value
    pub factory: Factory,
    /// Overrides the factory's parameter names when present, even if empty
    pub explicit_deps: Option<Vec<String>>,
}

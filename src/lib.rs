//! lazymod - a small asynchronous dependency-injection container.
//!
//! Modules are registered under a name together with a factory. A module's
//! dependencies are the parameter names of its factory, or an explicit list
//! given at registration. Nothing is constructed at registration time: the
//! first [`Container::resolve`] of a module resolves its dependencies one after
//! the other, hands their values to the factory positionally, and caches the
//! result. Every module is constructed at most once per container, also when
//! several resolutions ask for it concurrently.
//!
//! # Quick start
//!
//! ```rust
//! use lazymod::{Container, factory};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), lazymod::ContainerError> {
//! let container = Container::new();
//!
//! container.register_and_export("a", "a".to_string())?;
//! container.register("b", factory!(|a: String| format!("{a}b")))?;
//! container.register("c", factory!(|a: String, b: String| format!("{a}{b}c")))?;
//!
//! // `a` is built once even though both `b` and `c` need it
//! assert_eq!(*container.resolve_as::<String>("c").await?, "aabc");
//! # Ok(())
//! # }
//! ```
//!
//! # Errors
//!
//! Every container operation fails with a [`ContainerError`]. Registration
//! errors leave the container unchanged; resolution errors are never cached.
//! Dependencies are resolved in declared order and the first failure wins;
//! cycles in the registered graph are rejected before any factory runs.
//!
//! # Modules
//!
//! - [`container`] - the [`Container`] facade
//! - [`core`] - errors, factories and module values
//! - [`registry`] - name validation, registration and dependency extraction
//! - [`resolver`] - the resolution engine and its cache
//! - [`manifest`] - declaring modules in `lazymod.toml`
//! - [`cli`] - the `lazymod` command-line tool

pub mod cli;
pub mod config;
pub mod constants;
pub mod container;
pub mod core;
pub mod manifest;
pub mod registry;
pub mod resolver;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use container::Container;
pub use core::{ContainerError, Definition, Dependencies, Factory, ModuleValue};

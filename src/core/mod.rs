//! Core types shared by the registry, the resolver and the CLI.
//!
//! # Modules
//!
//! - `error` - [`ContainerError`], the error type of every container operation,
//!   and [`ErrorContext`]/[`user_friendly_error`] for CLI display
//! - `module` - type-erased module values ([`ModuleValue`]), factories
//!   ([`Factory`]), the arguments they receive ([`Dependencies`]) and
//!   registration entries ([`Definition`], [`Registration`])

pub mod error;
pub mod module;

pub use error::{ContainerError, DidYouMean, ErrorContext, user_friendly_error};
pub use module::{
    Dependencies, Definition, Factory, FactoryFuture, ModuleValue, Positional, Registration,
};

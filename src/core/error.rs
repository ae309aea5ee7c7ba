//! Error handling for lazymod
//!
//! This module provides the error type shared by the registry and the resolver,
//! plus the user-facing error reporting used by the CLI. The error system follows
//! two principles:
//! 1. **Strongly-typed errors** so callers can match on the failure mode
//! 2. **Stable, greppable messages** so collaborators can match on error text
//!
//! # Error Categories
//!
//! - **Registration** (raised synchronously by [`Container::register`]):
//!   [`ContainerError::InvalidName`], [`ContainerError::InvalidFactory`],
//!   [`ContainerError::DuplicateRegistration`]
//! - **Resolution** (raised by the asynchronous [`Container::resolve`]):
//!   [`ContainerError::NotRegistered`], [`ContainerError::DependencyNotFound`],
//!   [`ContainerError::CircularDependency`]
//! - **Construction**: [`ContainerError::FactoryFailed`],
//!   [`ContainerError::TypeMismatch`], [`ContainerError::MissingArgument`]
//!
//! Every message matches, case-insensitively, the fixed patterns collaborators rely on:
//!
//! | variant | pattern |
//! |---|---|
//! | `InvalidName` | `must have a name` |
//! | `InvalidFactory` | `must give a function` |
//! | `DuplicateRegistration` | `already registered` |
//! | `NotRegistered` | `no module … registered` |
//! | `DependencyNotFound` | `dependency not found` |
//! | `CircularDependency` | `circular dependency` |
//!
//! # Examples
//!
//! ```rust,no_run
//! use lazymod::core::{ContainerError, user_friendly_error};
//!
//! let error = ContainerError::NotRegistered { name: "db".to_string() };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestions
//! ```
//!
//! [`Container::register`]: crate::container::Container::register
//! [`Container::resolve`]: crate::container::Container::resolve

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for container operations.
///
/// The type is `Clone` because a single failed in-flight resolution is observed
/// by every caller waiting on it, and each of them receives its own copy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContainerError {
    /// The registration name is missing, empty, or not identifier-like.
    #[error("Module must have a name that is a valid identifier, got {name:?}")]
    InvalidName {
        /// The rejected name
        name: String,
    },

    /// A registration was attempted without a factory.
    #[error("Must give a function to register module '{name}'")]
    InvalidFactory {
        /// Name of the module being registered
        name: String,
    },

    /// The name is already taken; registrations are insert-only.
    #[error("Module '{name}' is already registered")]
    DuplicateRegistration {
        /// The duplicated name
        name: String,
    },

    /// The requested top-level module does not exist.
    #[error("No module '{name}' registered")]
    NotRegistered {
        /// The requested name
        name: String,
    },

    /// A module declares a dependency that is not registered.
    #[error("Dependency not found: '{dependency}' required by '{module}'")]
    DependencyNotFound {
        /// The module whose factory declares the dependency
        module: String,
        /// The missing dependency name
        dependency: String,
    },

    /// The dependency path revisits a module that is still being resolved.
    #[error("Circular dependency detected: {chain}")]
    CircularDependency {
        /// The cycle, e.g. `a -> c -> b -> a`
        chain: String,
    },

    /// A factory returned an error.
    #[error("Factory for module '{module}' failed: {reason}")]
    FactoryFailed {
        /// The module whose factory failed
        module: String,
        /// Rendered error chain returned by the factory
        reason: String,
    },

    /// A resolved value was requested as a type it does not have.
    #[error("Module '{module}' is not of type {expected}")]
    TypeMismatch {
        /// The module whose value was downcast
        module: String,
        /// Name of the requested type
        expected: String,
    },

    /// A factory consumed more positional arguments than were resolved for it.
    #[error("Factory for module '{module}' has no argument at position {index}")]
    MissingArgument {
        /// The module being constructed
        module: String,
        /// Zero-based argument position
        index: usize,
    },
}

impl ContainerError {
    /// Whether the error was raised by a registration call.
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidName { .. } | Self::InvalidFactory { .. } | Self::DuplicateRegistration { .. }
        )
    }

    /// The name a "did you mean" suggestion should be computed for, if any.
    pub fn missing_name(&self) -> Option<&str> {
        match self {
            Self::NotRegistered { name } => Some(name),
            Self::DependencyNotFound { dependency, .. } => Some(dependency),
            _ => None,
        }
    }
}

/// A registered name close to the one that was not found.
///
/// Attach it as `anyhow` context on a [`ContainerError`];
/// [`user_friendly_error`] turns it into the suggestion and drops it from the
/// message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DidYouMean(pub String);

impl fmt::Display for DidYouMean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Did you mean '{}'?", self.0)
    }
}

/// Error wrapper that adds a suggestion and details for CLI display.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: anyhow::Error,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without suggestion or details.
    #[must_use]
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self {
            error: error.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {:#}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

/// Convert any error into an [`ErrorContext`] with actionable suggestions.
///
/// Container errors anywhere in the `anyhow` chain are recognized; other errors
/// are passed through with no suggestion.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let hint = error.downcast_ref::<DidYouMean>().cloned();
    let error = match hint {
        Some(_) => match error.downcast::<ContainerError>() {
            Ok(container_error) => anyhow::Error::from(container_error),
            Err(error) => error,
        },
        None => error,
    };

    let ctx = explain(error);
    match hint {
        Some(hint) => ctx.with_suggestion(hint.to_string()),
        None => ctx,
    }
}

fn explain(error: anyhow::Error) -> ErrorContext {
    let Some(container_error) =
        error.chain().find_map(|cause| cause.downcast_ref::<ContainerError>()).cloned()
    else {
        return ErrorContext::new(error);
    };

    let ctx = ErrorContext::new(error);
    match container_error {
        ContainerError::InvalidName { .. } => ctx
            .with_suggestion("Use a non-empty name made of letters, digits, '_', '-' or '.'")
            .with_details("Module names must start with a letter or underscore"),
        ContainerError::InvalidFactory { name } => ctx
            .with_suggestion(format!("Give module '{name}' a factory, or a `value`/`template` in the manifest"))
            .with_details("Every registration needs something to construct the module from"),
        ContainerError::DuplicateRegistration { name } => ctx
            .with_suggestion(format!("Rename one of the modules called '{name}'"))
            .with_details("Registrations are insert-only and cannot be replaced"),
        ContainerError::NotRegistered { name } => ctx
            .with_suggestion(format!("Register a module named '{name}' before resolving it"))
            .with_details("Run 'lazymod list' to see the registered modules"),
        ContainerError::DependencyNotFound { module, dependency } => ctx
            .with_suggestion(format!(
                "Register '{dependency}' or remove it from the dependencies of '{module}'"
            ))
            .with_details("Every declared dependency must be registered by the time it is resolved"),
        ContainerError::CircularDependency { chain } => ctx
            .with_suggestion("Review your dependency graph and remove circular references")
            .with_details(format!(
                "Circular dependency chain detected: {chain}. Modules cannot depend on themselves directly or indirectly"
            )),
        ContainerError::FactoryFailed { module, .. } => ctx
            .with_suggestion(format!("Check the factory of '{module}'; run with --verbose for the resolution trace")),
        ContainerError::TypeMismatch { module, expected } => ctx.with_details(format!(
            "The value of '{module}' was requested as {expected} but was built with a different type"
        )),
        ContainerError::MissingArgument { module, .. } => ctx.with_suggestion(format!(
            "Make the dependency list of '{module}' match the parameters of its factory"
        )),
    }
}

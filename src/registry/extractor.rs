//! Dependency extraction.
//!
//! A module's dependency list is either the explicit list given at registration
//! or, failing that, the declared parameter names of its factory. Parameter
//! names are recorded at compile time by [`factory!`](crate::factory), which
//! turns each closure parameter into a dependency of the same name, so
//! extraction never runs the factory.
//!
//! The extracted order is also the order in which resolved values are passed
//! to the factory.

use crate::core::Registration;

/// The ordered dependency names of a registration.
///
/// An explicit list always wins, including an empty one.
pub fn extract(registration: &Registration) -> &[String] {
    match &registration.explicit_deps {
        Some(explicit) => explicit,
        None => registration.factory.params(),
    }
}

/// Build a [`Factory`](crate::core::Factory) whose dependencies are its
/// parameter names.
///
/// Each parameter is written `name: Type` and is bound to an `Arc<Type>` holding
/// the resolved value of the dependency at the same position. The body's value
/// becomes the module's value. Prefix the closure with `async` for an
/// asynchronous body.
///
/// ```rust
/// use lazymod::{Container, factory};
///
/// # async fn example() -> Result<(), lazymod::ContainerError> {
/// let container = Container::new();
/// container.register("o1", factory!(|| "o1".to_string()))?;
/// container.register("o2", factory!(|o1: String| format!("{o1} augmented")))?;
///
/// let o2 = container.resolve_as::<String>("o2").await?;
/// assert_eq!(*o2, "o1 augmented");
/// # Ok(())
/// # }
/// ```
///
/// Combined with an explicit list the parameter names no longer matter, only
/// their positions:
///
/// ```rust
/// use lazymod::{Container, factory};
///
/// # fn example() -> Result<(), lazymod::ContainerError> {
/// let container = Container::new();
/// container.register("o2", (["o1"], factory!(|foo: String| format!("{foo} augmented"))))?;
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! factory {
    (async || $body:expr) => {
        $crate::factory!(async | | $body)
    };
    (|| $body:expr) => {
        $crate::factory!(| | $body)
    };
    (async |$($param:ident : $ty:ty),* $(,)?| $body:expr) => {
        $crate::core::Factory::new_async(move |deps: $crate::core::Dependencies| {
            #[allow(unused_mut, unused_variables)]
            let mut args = deps.positional();
            let parsed = (|| -> ::std::result::Result<_, $crate::core::ContainerError> {
                ::std::result::Result::Ok(($(args.next::<$ty>()?,)*))
            })();
            async move {
                let ($($param,)*) = parsed?;
                ::std::result::Result::Ok::<_, $crate::core::ContainerError>($body)
            }
        })
        .with_params(&[$(stringify!($param)),*])
    };
    (|$($param:ident : $ty:ty),* $(,)?| $body:expr) => {
        $crate::core::Factory::new(move |deps: $crate::core::Dependencies| {
            #[allow(unused_mut, unused_variables)]
            let mut args = deps.positional();
            $(let $param: ::std::sync::Arc<$ty> = args.next::<$ty>()?;)*
            ::std::result::Result::Ok::<_, $crate::core::ContainerError>($body)
        })
        .with_params(&[$(stringify!($param)),*])
    };
}

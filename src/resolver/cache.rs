//! Resolution cache with in-flight memoization.
//!
//! Every module name moves through a small state machine inside the cache:
//!
//! - **Absent**: never resolved, or its last resolution failed
//! - [`Pending`](ModuleState::Pending): a resolution is running; holds the
//!   shared future every other requester awaits
//! - [`Ready`](ModuleState::Ready): the constructed value, kept for the
//!   lifetime of the container
//!
//! The first requester of an absent module inserts `Pending` and drives the
//! construction; later requesters clone the shared future instead of running
//! the factory again. On success the entry becomes `Ready`; on failure it is
//! removed so the error is reported to every waiter but never cached.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::core::{ContainerError, ModuleValue};

/// A resolution that any number of callers can await.
pub type SharedResolution = Shared<BoxFuture<'static, Result<ModuleValue, ContainerError>>>;

#[derive(Clone)]
enum ModuleState {
    /// Construction in progress.
    Pending(SharedResolution),
    /// Constructed value.
    Ready(ModuleValue),
}

/// Container-scoped map from module name to its resolution state.
#[derive(Default)]
pub struct ResolutionCache {
    states: DashMap<String, ModuleState>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The constructed value of `name`, if it has been resolved.
    pub fn get_ready(&self, name: &str) -> Option<ModuleValue> {
        self.states.get(name).and_then(|entry| match entry.value() {
            ModuleState::Ready(value) => Some(value.clone()),
            ModuleState::Pending(_) => None,
        })
    }

    pub fn is_ready(&self, name: &str) -> bool {
        self.get_ready(name).is_some()
    }

    pub fn is_pending(&self, name: &str) -> bool {
        self.states.get(name).is_some_and(|entry| matches!(entry.value(), ModuleState::Pending(_)))
    }

    /// Number of resolved modules.
    pub fn ready_count(&self) -> usize {
        self.states.iter().filter(|entry| matches!(entry.value(), ModuleState::Ready(_))).count()
    }

    /// Join the resolution of `name`, starting it with `start` if nobody has.
    ///
    /// The check and the insert of the `Pending` state happen under one entry
    /// lock, so concurrent callers can never both start the same module.
    /// `start` must only build the future, not poll it.
    pub(crate) fn join_or_start<F>(&self, name: &str, start: F) -> SharedResolution
    where
        F: FnOnce() -> SharedResolution,
    {
        match self.states.entry(name.to_string()) {
            Entry::Occupied(entry) => match entry.get() {
                ModuleState::Ready(value) => {
                    tracing::trace!(target: "resolver", "Cache hit for '{}'", name);
                    futures::future::ready(Ok(value.clone())).boxed().shared()
                }
                ModuleState::Pending(shared) => {
                    tracing::trace!(target: "resolver", "Waiting for in-flight resolution of '{}'", name);
                    shared.clone()
                }
            },
            Entry::Vacant(slot) => {
                let shared = start();
                slot.insert(ModuleState::Pending(shared.clone()));
                shared
            }
        }
    }

    /// Record the outcome of a resolution started by [`join_or_start`](Self::join_or_start).
    pub(crate) fn complete(&self, name: &str, result: &Result<ModuleValue, ContainerError>) {
        match result {
            Ok(value) => {
                self.states.insert(name.to_string(), ModuleState::Ready(value.clone()));
            }
            Err(_) => {
                self.states.remove_if(name, |_, state| matches!(state, ModuleState::Pending(_)));
            }
        }
    }
}

impl std::fmt::Debug for ResolutionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ready: Vec<String> = self
            .states
            .iter()
            .filter(|entry| matches!(entry.value(), ModuleState::Ready(_)))
            .map(|entry| entry.key().clone())
            .collect();
        ready.sort();
        f.debug_struct("ResolutionCache").field("ready", &ready).finish_non_exhaustive()
    }
}

//! # Bus Listener (Hook)
//!
//! The lowest-level entry point for event processing in Gleaner.
//!
//! Hooks are what an event bus delivers published events to. Collector
//! adapters register one hook per bus event kind they care about, and remove
//! them again when the collector ends.

use crate::{error::BoxError, message::Message};
use std::{future::Future, pin::Pin};

/// A boxed, sendable future, used where hooks and filters are type-erased.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A listener for events delivered by a bus.
///
/// # Static vs Dynamic Dispatch
///
/// This trait uses native `async fn` for zero-cost static dispatch.
/// For dynamic dispatch (e.g., inside a bus registry), use [`DynHook`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Hook<{E}>`",
    label = "missing `Hook` implementation",
    note = "Hooks must implement `on_event` for the specific event type `{E}`."
)]
pub trait Hook<E: Message>: Send + Sync + 'static {
    /// Called when an event is delivered.
    fn on_event(&self, event: &E) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Dynamic object-safe version of [`Hook`].
pub trait DynHook<E: Message>: Send + Sync + 'static {
    /// Called when an event is delivered (dynamic dispatch version).
    fn on_event_dyn<'a>(&'a self, event: &'a E) -> BoxFuture<'a, Result<(), BoxError>>;
}

// Blanket implementation: Any type implementing Hook implements DynHook automatically.
impl<E: Message + Sync, T: Hook<E>> DynHook<E> for T {
    fn on_event_dyn<'a>(&'a self, event: &'a E) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(self.on_event(event))
    }
}

// Closures taking the event by reference and returning an owned future.
impl<E, F, Fut> Hook<E> for F
where
    E: Message,
    F: Fn(&E) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send,
{
    fn on_event(&self, event: &E) -> impl Future<Output = Result<(), BoxError>> + Send {
        (self)(event)
    }
}

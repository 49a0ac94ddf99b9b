//! # Scopes (bus adapters)
//!
//! A [`Scope`] binds a collector to a publish/subscribe bus. It names the bus
//! events the collector listens to ([`Route`]), decides which raw events
//! belong to it, and reports when the scope itself is gone (its container or
//! owning group was deleted).
//!
//! [`ScopeExtractor`] turns a scope into the [`Extractor`] driving its
//! collector.

use crate::{
    extract::{Collectible, Extractor},
    message::Message,
};
use std::{fmt::Debug, hash::Hash};

/// Events that can travel over a named-event bus.
pub trait BusEvent: Message + Clone {
    /// The event name used for subscription.
    type Kind: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    /// The name this occurrence is published under.
    fn kind(&self) -> Self::Kind;
}

/// What a collector does with one kind of bus event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<K> {
    /// Feed the event to ingestion.
    Collect(K),
    /// Feed the event to disposal.
    Dispose(K),
    /// Split the event with [`Scope::unbundle`] and dispose each part.
    DisposeEach(K),
    /// Clear the buffer when [`Scope::clears`] says so.
    Empty(K),
    /// Stop when [`Scope::invalidated`] reports a reason.
    Invalidate(K),
}

impl<K: Copy> Route<K> {
    /// The bus event kind this route subscribes to.
    pub fn kind(&self) -> K {
        match *self {
            Route::Collect(kind)
            | Route::Dispose(kind)
            | Route::DisposeEach(kind)
            | Route::Empty(kind)
            | Route::Invalidate(kind) => kind,
        }
    }
}

/// A collector's view of a bus.
pub trait Scope: Send + Sync + 'static {
    /// The bus event type.
    type Event: BusEvent;
    /// The item type accumulated.
    type Item: Collectible;
    /// Reasons this scope can end a collector with.
    type Reason: Clone + Debug + Send + Sync + 'static;

    /// The bus subscriptions this scope needs.
    fn routes(&self) -> Vec<Route<<Self::Event as BusEvent>::Kind>>;

    /// Candidate for collection, or `None` if the event is out of scope.
    fn collectible(&self, event: &Self::Event) -> Option<Self::Item>;

    /// Candidate for disposal, or `None` if the event is out of scope.
    fn disposed(&self, _event: &Self::Event) -> Option<Self::Item> {
        None
    }

    /// Reason to stop if `event` deletes part of this scope.
    fn invalidated(&self, _event: &Self::Event) -> Option<Self::Reason> {
        None
    }

    /// Whether `event` invalidates every collected item at once.
    fn clears(&self, _event: &Self::Event) -> bool {
        false
    }

    /// Splits a bulk event into the single events it stands for.
    fn unbundle(&self, _event: &Self::Event) -> Vec<Self::Event> {
        Vec::new()
    }
}

/// Adapts a [`Scope`] into an [`Extractor`].
#[derive(Debug, Clone)]
pub struct ScopeExtractor<S>(pub S);

impl<S> ScopeExtractor<S> {
    /// The wrapped scope.
    pub fn scope(&self) -> &S {
        &self.0
    }
}

impl<S: Scope> Extractor for ScopeExtractor<S> {
    type Raw = S::Event;
    type Item = S::Item;
    type Reason = S::Reason;

    fn extract_collectible(&self, raw: &Self::Raw) -> Option<Self::Item> {
        self.0.collectible(raw)
    }

    fn extract_disposed(&self, raw: &Self::Raw) -> Option<Self::Item> {
        self.0.disposed(raw)
    }
}

//! # Extraction (relevance hooks)
//!
//! An [`Extractor`] interprets raw source events for one collector. It decides
//! whether a raw event concerns the collector at all; it does not decide
//! whether the resulting candidate is wanted, which is the [`Filter`]'s job.
//!
//! [`Filter`]: crate::Filter

use crate::message::Message;
use std::{convert::Infallible, fmt::Debug, marker::PhantomData};

/// Items a collector can accumulate.
///
/// Disposal locates buffered items with `PartialEq`, so the equality of an
/// item type decides which buffered entry a disposed candidate removes.
pub trait Collectible: Message + Clone + PartialEq + Debug {}

impl<T: Message + Clone + PartialEq + Debug> Collectible for T {}

/// Turns raw source events into candidate items.
///
/// Both methods are total: `None` means "not relevant to this collector",
/// which is distinct from "relevant but rejected by the filter".
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `Extractor`",
    label = "missing `Extractor` implementation",
    note = "Extractors map raw events to `Option<Item>` for collection and disposal."
)]
pub trait Extractor: Send + Sync + 'static {
    /// The raw event type fed to the collector.
    type Raw: Message;
    /// The item type accumulated by the collector.
    type Item: Collectible;
    /// Source-specific termination reasons, on top of the built-in ones.
    type Reason: Clone + Debug + Send + Sync + 'static;

    /// Candidate for collection, or `None` if the event is out of scope.
    fn extract_collectible(&self, raw: &Self::Raw) -> Option<Self::Item>;

    /// Candidate for disposal, or `None` if the event is out of scope.
    fn extract_disposed(&self, raw: &Self::Raw) -> Option<Self::Item>;
}

/// An extractor whose raw events are the items themselves.
///
/// Useful for collectors fed directly by their owner rather than by a bus.
pub struct Identity<T, R = Infallible>(PhantomData<fn() -> (T, R)>);

impl<T, R> Identity<T, R> {
    /// Create a new identity extractor.
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T, R> Default for Identity<T, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, R> Extractor for Identity<T, R>
where
    T: Collectible,
    R: Clone + Debug + Send + Sync + 'static,
{
    type Raw = T;
    type Item = T;
    type Reason = R;

    fn extract_collectible(&self, raw: &T) -> Option<T> {
        Some(raw.clone())
    }

    fn extract_disposed(&self, raw: &T) -> Option<T> {
        Some(raw.clone())
    }
}

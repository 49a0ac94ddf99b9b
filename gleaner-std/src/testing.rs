//! Testing utilities for Gleaner.
//!
//! - [`RecordingHook`]: a bus hook that records every event delivered to it
//! - [`RecordingObserver`]: records every notification a collector emits

use crate::{
    collector::{Collector, CollectorEvent, EventKind},
    subscription::Subscription,
};
use gleaner_core::{BoxError, EndReason, Extractor, Hook, Message};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Recording Hook
// ============================================================================

/// A bus hook that records all events it receives.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingHook::<GatewayEvent>::new();
/// bus.subscribe(GatewayEventKind::MessageCreate, recorder.clone());
///
/// bus.publish(&event).await;
/// assert_eq!(recorder.count(), 1);
/// ```
pub struct RecordingHook<E> {
    events: Arc<Mutex<Vec<E>>>,
    failure: Option<&'static str>,
}

impl<E: Clone> RecordingHook<E> {
    /// A recording hook that always succeeds.
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            failure: None,
        }
    }

    /// A recording hook that records, then fails with `message`.
    pub fn failing(message: &'static str) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            failure: Some(message),
        }
    }

    /// Get a clone of the recorded events.
    pub fn events(&self) -> Vec<E> {
        lock(&self.events).clone()
    }

    /// Get the number of recorded events.
    pub fn count(&self) -> usize {
        lock(&self.events).len()
    }

    /// Clear all recorded events.
    pub fn clear(&self) {
        lock(&self.events).clear();
    }
}

impl<E: Clone> Default for RecordingHook<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for RecordingHook<E> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
            failure: self.failure,
        }
    }
}

impl<E: Message + Clone> Hook<E> for RecordingHook<E> {
    async fn on_event(&self, event: &E) -> Result<(), BoxError> {
        lock(&self.events).push(event.clone());
        match self.failure {
            Some(message) => Err(message.into()),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Recording Observer
// ============================================================================

/// Records every notification a collector emits, in emission order.
///
/// The observer listens to all four notification kinds until it is dropped
/// or the collector ends.
pub struct RecordingObserver<T, R> {
    events: Arc<Mutex<Vec<CollectorEvent<T, R>>>>,
    _subscriptions: Vec<Subscription>,
}

impl<T, R> RecordingObserver<T, R>
where
    T: Clone + Send + 'static,
    R: Clone + Send + 'static,
{
    /// Start recording the notifications of `collector`.
    pub fn attach<X>(collector: &Collector<X>) -> Self
    where
        X: Extractor<Item = T, Reason = R>,
    {
        let events = Arc::new(Mutex::new(Vec::new()));
        let subscriptions = [
            EventKind::Collect,
            EventKind::Ignore,
            EventKind::Dispose,
            EventKind::End,
        ]
        .into_iter()
        .map(|kind| {
            let events = events.clone();
            collector.on(kind, move |event| lock(&events).push(event.clone()))
        })
        .collect();

        Self {
            events,
            _subscriptions: subscriptions,
        }
    }

    /// Every recorded notification.
    pub fn events(&self) -> Vec<CollectorEvent<T, R>> {
        lock(&self.events).clone()
    }

    /// Number of recorded notifications of `kind`.
    pub fn count(&self, kind: EventKind) -> usize {
        lock(&self.events)
            .iter()
            .filter(|event| event.kind() == kind)
            .count()
    }

    /// Items reported as collected.
    pub fn collected(&self) -> Vec<T> {
        self.items(|event| match event {
            CollectorEvent::Collected(item) => Some(item),
            _ => None,
        })
    }

    /// Items reported as ignored.
    pub fn ignored(&self) -> Vec<T> {
        self.items(|event| match event {
            CollectorEvent::Ignored(item) => Some(item),
            _ => None,
        })
    }

    /// Items reported as disposed.
    pub fn disposed(&self) -> Vec<T> {
        self.items(|event| match event {
            CollectorEvent::Disposed(item) => Some(item),
            _ => None,
        })
    }

    /// Every recorded `End`, as final snapshot and reason.
    pub fn ends(&self) -> Vec<(Vec<T>, EndReason<R>)> {
        lock(&self.events)
            .iter()
            .filter_map(|event| match event {
                CollectorEvent::End { collected, reason } => {
                    Some((collected.clone(), reason.clone()))
                }
                _ => None,
            })
            .collect()
    }

    fn items(&self, pick: impl Fn(&CollectorEvent<T, R>) -> Option<&T>) -> Vec<T> {
        lock(&self.events)
            .iter()
            .filter_map(pick)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::CollectorOptions;
    use gleaner_core::Identity;

    #[tokio::test]
    async fn test_recording_hook_records_then_fails() {
        let hook = RecordingHook::failing("nope");
        assert!(hook.on_event(&1u8).await.is_err());
        assert_eq!(hook.events(), vec![1u8]);

        hook.clear();
        assert_eq!(hook.count(), 0);
    }

    #[tokio::test]
    async fn test_observer_sorts_notifications() {
        let collector = Collector::new(
            Identity::<i32>::new(),
            CollectorOptions::new().dispose(true).filter(|n| *n > 0),
        )
        .unwrap();
        let observer = RecordingObserver::attach(&collector);

        collector.ingest(&1).await.unwrap();
        collector.ingest(&-1).await.unwrap();
        collector.dispose(&1).await.unwrap();
        collector.stop_user();

        assert_eq!(observer.collected(), vec![1]);
        assert_eq!(observer.ignored(), vec![-1]);
        assert_eq!(observer.disposed(), vec![1]);
        assert_eq!(observer.ends(), vec![(vec![], EndReason::User)]);
    }
}

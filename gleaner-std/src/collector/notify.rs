//! Collector notifications.
//!
//! Every collector owns a [`Notifier`] and emits four kinds of
//! notification through it. The `next` and drain protocols are ordinary
//! listeners on the same notifier.

use crate::subscription::{Detach, ListenerId, Subscription};
use gleaner_core::EndReason;
use std::sync::{
    Arc, Mutex, PoisonError, Weak,
    atomic::AtomicU64,
};

/// The four notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// An item was accepted.
    Collect,
    /// A candidate was rejected by the filter.
    Ignore,
    /// A previously accepted item was removed.
    Dispose,
    /// The collector ended. Fires at most once.
    End,
}

/// A notification emitted by a collector.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectorEvent<T, R> {
    /// An item was accepted.
    Collected(T),
    /// A candidate was rejected by the filter.
    Ignored(T),
    /// A previously accepted item was removed.
    Disposed(T),
    /// The collector ended with this final snapshot.
    End {
        /// The items held at the moment the collector ended.
        collected: Vec<T>,
        /// Why it ended.
        reason: EndReason<R>,
    },
}

impl<T, R> CollectorEvent<T, R> {
    /// The kind of this notification.
    pub fn kind(&self) -> EventKind {
        match self {
            CollectorEvent::Collected(_) => EventKind::Collect,
            CollectorEvent::Ignored(_) => EventKind::Ignore,
            CollectorEvent::Disposed(_) => EventKind::Dispose,
            CollectorEvent::End { .. } => EventKind::End,
        }
    }
}

pub(crate) type Callback<T, R> = Arc<dyn Fn(&CollectorEvent<T, R>) + Send + Sync>;

struct Entry<T, R> {
    id: ListenerId,
    kind: EventKind,
    callback: Callback<T, R>,
}

struct Listeners<T, R> {
    next_id: AtomicU64,
    entries: Mutex<Vec<Entry<T, R>>>,
}

impl<T, R> Detach for Listeners<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    fn detach(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        entries.len() != before
    }
}

/// Fan-out of collector notifications to registered callbacks.
///
/// Callbacks run outside the registry lock, so they may subscribe or
/// unsubscribe (including themselves) while being notified.
pub(crate) struct Notifier<T, R> {
    listeners: Arc<Listeners<T, R>>,
}

impl<T, R> Notifier<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    pub(crate) fn new() -> Self {
        Self {
            listeners: Arc::new(Listeners {
                next_id: AtomicU64::new(0),
                entries: Mutex::new(Vec::new()),
            }),
        }
    }

    pub(crate) fn subscribe(&self, kind: EventKind, callback: Callback<T, R>) -> Subscription {
        let id = ListenerId::next(&self.listeners.next_id);
        self.entries().push(Entry { id, kind, callback });
        let registry: Weak<dyn Detach> = Arc::downgrade(&self.listeners) as Weak<dyn Detach>;
        Subscription::new(id, registry)
    }

    pub(crate) fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.detach(id)
    }

    pub(crate) fn emit(&self, event: &CollectorEvent<T, R>) {
        let kind = event.kind();
        let callbacks: Vec<Callback<T, R>> = self
            .entries()
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| entry.callback.clone())
            .collect();
        for callback in callbacks {
            callback(event);
        }
    }

    /// Drops every callback. Used once the collector has ended, which also
    /// breaks reference cycles through callbacks holding the collector.
    pub(crate) fn clear(&self) {
        let drained: Vec<Entry<T, R>> = self.entries().drain(..).collect();
        drop(drained);
    }

    pub(crate) fn len(&self, kind: EventKind) -> usize {
        self.entries().iter().filter(|entry| entry.kind == kind).count()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, Vec<Entry<T, R>>> {
        self.listeners
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Event = CollectorEvent<i32, Infallible>;

    #[test]
    fn test_emit_reaches_matching_kind_only() {
        let notifier = Notifier::<i32, Infallible>::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        let _sub = notifier.subscribe(
            EventKind::Collect,
            Arc::new(move |_: &Event| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        notifier.emit(&CollectorEvent::Collected(1));
        notifier.emit(&CollectorEvent::Ignored(2));

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dropping_subscription_detaches() {
        let notifier = Notifier::<i32, Infallible>::new();
        let sub = notifier.subscribe(EventKind::Ignore, Arc::new(|_: &Event| {}));
        assert_eq!(notifier.len(EventKind::Ignore), 1);

        drop(sub);
        assert_eq!(notifier.len(EventKind::Ignore), 0);
    }

    #[test]
    fn test_forgotten_subscription_stays_until_unsubscribed() {
        let notifier = Notifier::<i32, Infallible>::new();
        let id = notifier
            .subscribe(EventKind::Dispose, Arc::new(|_: &Event| {}))
            .forget();
        assert_eq!(notifier.len(EventKind::Dispose), 1);

        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        assert_eq!(notifier.len(EventKind::Dispose), 0);
    }

    #[test]
    fn test_callback_may_detach_itself() {
        let notifier = Notifier::<i32, Infallible>::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let hits = Arc::new(AtomicUsize::new(0));

        let own = slot.clone();
        let counter = hits.clone();
        let sub = notifier.subscribe(
            EventKind::Collect,
            Arc::new(move |_: &Event| {
                counter.fetch_add(1, Ordering::SeqCst);
                own.lock().unwrap().take();
            }),
        );
        *slot.lock().unwrap() = Some(sub);

        notifier.emit(&CollectorEvent::Collected(1));
        notifier.emit(&CollectorEvent::Collected(2));

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.len(EventKind::Collect), 0);
    }
}

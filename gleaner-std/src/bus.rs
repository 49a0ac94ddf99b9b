//! Named-event publish/subscribe bus.

use crate::{
    log::{log_trace, log_warn},
    subscription::ListenerId,
};
use futures::future::join_all;
use gleaner_core::{BusError, BusEvent, DynHook, Hook};
use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak, atomic::AtomicU64},
};

type Registry<E> = HashMap<<E as BusEvent>::Kind, Vec<(ListenerId, Arc<dyn DynHook<E>>)>>;

struct BusInner<E: BusEvent> {
    next_id: AtomicU64,
    listeners: Mutex<Registry<E>>,
}

/// A bus delivering each published event to the hooks registered for its
/// kind.
///
/// Cloning is cheap and every clone refers to the same registry.
///
/// # Example
///
/// ```rust,ignore
/// let bus = EventBus::new();
/// let id = bus.subscribe(GatewayEventKind::MessageCreate, LoggingHook::new());
/// bus.publish(&event).await;
/// bus.unsubscribe(id);
/// ```
pub struct EventBus<E: BusEvent> {
    inner: Arc<BusInner<E>>,
}

impl<E: BusEvent> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<E: BusEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: BusEvent> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.total_listeners())
            .finish()
    }
}

/// Outcome of one [`EventBus::publish`].
#[derive(Debug, Default)]
pub struct PublishReport {
    /// Number of hooks the event was delivered to.
    pub delivered: usize,
    /// Errors returned by hooks, in registration order.
    pub errors: Vec<BusError>,
}

impl PublishReport {
    /// Whether every hook succeeded.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl<E: BusEvent> EventBus<E> {
    /// An empty bus.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                next_id: AtomicU64::new(0),
                listeners: Mutex::new(HashMap::new()),
            }),
        }
    }

    fn listeners(&self) -> MutexGuard<'_, Registry<E>> {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `hook` for events of `kind`.
    pub fn subscribe<H: Hook<E>>(&self, kind: E::Kind, hook: H) -> ListenerId {
        self.subscribe_dyn(kind, Arc::new(hook))
    }

    /// Register an already type-erased hook.
    pub fn subscribe_dyn(&self, kind: E::Kind, hook: Arc<dyn DynHook<E>>) -> ListenerId {
        let id = ListenerId::next(&self.inner.next_id);
        self.listeners().entry(kind).or_default().push((id, hook));
        log_trace!(?kind, %id, "bus listener added");
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners();
        let mut removed = false;
        listeners.retain(|_, hooks| {
            let before = hooks.len();
            hooks.retain(|(hook_id, _)| *hook_id != id);
            removed |= hooks.len() != before;
            !hooks.is_empty()
        });
        removed
    }

    /// Number of listeners registered for `kind`.
    pub fn listener_count(&self, kind: E::Kind) -> usize {
        self.listeners().get(&kind).map_or(0, Vec::len)
    }

    /// Number of listeners across every kind.
    pub fn total_listeners(&self) -> usize {
        self.listeners().values().map(Vec::len).sum()
    }

    /// Deliver `event` to every hook registered for its kind.
    ///
    /// Hooks run concurrently. The registry is snapshotted first, so hooks
    /// may subscribe or unsubscribe while being delivered to; changes apply
    /// from the next publish on. A failing hook does not stop delivery to
    /// the others.
    pub async fn publish(&self, event: &E) -> PublishReport {
        let kind = event.kind();
        let hooks: Vec<Arc<dyn DynHook<E>>> = self
            .listeners()
            .get(&kind)
            .map(|hooks| hooks.iter().map(|(_, hook)| hook.clone()).collect())
            .unwrap_or_default();

        let results = join_all(hooks.iter().map(|hook| hook.on_event_dyn(event))).await;

        let mut report = PublishReport {
            delivered: hooks.len(),
            errors: Vec::new(),
        };
        for source in results.into_iter().filter_map(Result::err) {
            log_warn!(?kind, error = %source, "bus listener failed");
            report.errors.push(BusError::Listener {
                kind: format!("{kind:?}"),
                source,
            });
        }
        report
    }

    /// A handle that does not keep the bus alive.
    pub fn downgrade(&self) -> WeakEventBus<E> {
        WeakEventBus {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

/// Non-owning handle to an [`EventBus`].
pub struct WeakEventBus<E: BusEvent> {
    inner: Weak<BusInner<E>>,
}

impl<E: BusEvent> Clone for WeakEventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<E: BusEvent> WeakEventBus<E> {
    /// The bus, if it is still alive.
    pub fn upgrade(&self) -> Option<EventBus<E>> {
        self.inner.upgrade().map(|inner| EventBus { inner })
    }
}

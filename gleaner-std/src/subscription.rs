//! Listener handles shared by the notifier and the event bus.

use std::{
    fmt,
    sync::{
        Weak,
        atomic::{AtomicU64, Ordering},
    },
};

/// Identifies one registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn next(counter: &AtomicU64) -> Self {
        Self(counter.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Something listeners can be removed from.
pub(crate) trait Detach: Send + Sync {
    fn detach(&self, id: ListenerId) -> bool;
}

/// A registered listener that is removed when this handle is dropped.
///
/// Call [`forget`](Subscription::forget) to keep the listener registered for
/// the rest of its registry's life.
#[must_use = "dropping a Subscription removes its listener"]
pub struct Subscription {
    id: ListenerId,
    registry: Weak<dyn Detach>,
    armed: bool,
}

impl Subscription {
    pub(crate) fn new(id: ListenerId, registry: Weak<dyn Detach>) -> Self {
        Self {
            id,
            registry,
            armed: true,
        }
    }

    /// The listener's id.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Leave the listener registered and return its id.
    pub fn forget(mut self) -> ListenerId {
        self.armed = false;
        self.id
    }

    /// Remove the listener now.
    pub fn unsubscribe(self) {}
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("armed", &self.armed)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.detach(self.id);
        }
    }
}

//! Collectors attached to an event bus through a [`Scope`].

use crate::{
    bus::{EventBus, WeakEventBus},
    collector::{Collector, CollectorOptions},
    log::log_debug,
    subscription::ListenerId,
};
use gleaner_core::{
    BoxError, BusEvent, ConfigError, EndReason, Hook, Route, Scope, ScopeExtractor,
};
use std::{
    fmt,
    ops::Deref,
    sync::{Arc, Mutex, PoisonError},
};

/// Bus listener feeding one route of a scope into its collector.
struct RouteHook<S: Scope> {
    route: Route<<S::Event as BusEvent>::Kind>,
    collector: Collector<ScopeExtractor<S>>,
}

impl<S: Scope> Hook<S::Event> for RouteHook<S> {
    async fn on_event(&self, event: &S::Event) -> Result<(), BoxError> {
        let collector = &self.collector;
        let scope = collector.extractor().scope();
        match self.route {
            Route::Collect(_) => collector.ingest(event).await?,
            Route::Dispose(_) => collector.dispose(event).await?,
            Route::DisposeEach(_) => {
                // Every part is disposed; the first failure is reported after.
                let mut failure = None;
                for part in scope.unbundle(event) {
                    if let Err(err) = collector.dispose(&part).await {
                        failure.get_or_insert(err);
                    }
                }
                if let Some(err) = failure {
                    return Err(err.into());
                }
            }
            Route::Empty(_) => {
                if scope.clears(event) {
                    collector.empty();
                }
            }
            Route::Invalidate(_) => {
                if let Some(reason) = scope.invalidated(event) {
                    collector.stop(EndReason::Scope(reason));
                }
            }
        }
        Ok(())
    }
}

/// The bus listeners of one scoped collector, removed exactly once.
struct Attachment<S: Scope> {
    bus: WeakEventBus<S::Event>,
    listeners: Mutex<Vec<ListenerId>>,
}

impl<S: Scope> Attachment<S> {
    fn detach(&self) {
        let listeners: Vec<ListenerId> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        if listeners.is_empty() {
            return;
        }
        if let Some(bus) = self.bus.upgrade() {
            for id in &listeners {
                bus.unsubscribe(*id);
            }
        }
        log_debug!(listeners = listeners.len(), "scoped collector detached");
    }

    fn is_attached(&self) -> bool {
        !self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

/// A [`Collector`] wired to an [`EventBus`] for as long as it runs.
///
/// Attaching subscribes one bus listener per [`Route`] of the scope. All of
/// them are removed once the collector ends, whatever ended it. Until then
/// the bus keeps the collector alive.
///
/// Derefs to the underlying [`Collector`].
pub struct ScopedCollector<S: Scope> {
    collector: Collector<ScopeExtractor<S>>,
    attachment: Arc<Attachment<S>>,
}

impl<S: Scope> ScopedCollector<S> {
    /// Build a collector for `scope` and subscribe it to `bus`.
    pub fn attach(
        bus: &EventBus<S::Event>,
        scope: S,
        options: CollectorOptions<S::Item>,
    ) -> Result<Self, ConfigError> {
        let routes = scope.routes();
        let collector = Collector::new(ScopeExtractor(scope), options)?;

        let listeners = routes
            .iter()
            .map(|route| {
                bus.subscribe(
                    route.kind(),
                    RouteHook {
                        route: *route,
                        collector: collector.clone(),
                    },
                )
            })
            .collect();
        let attachment = Arc::new(Attachment {
            bus: bus.downgrade(),
            listeners: Mutex::new(listeners),
        });

        // Cleared with the other listeners once the collector ends.
        let on_end = attachment.clone();
        let _ = collector.on_end(move |_, _| on_end.detach()).forget();
        if collector.is_ended() {
            attachment.detach();
        }

        log_debug!(routes = routes.len(), "scoped collector attached");
        Ok(Self {
            collector,
            attachment,
        })
    }

    /// The underlying collector.
    pub fn collector(&self) -> &Collector<ScopeExtractor<S>> {
        &self.collector
    }

    /// The scope this collector was attached with.
    pub fn scope(&self) -> &S {
        self.collector.extractor().scope()
    }

    /// Whether the collector still listens to the bus.
    pub fn is_attached(&self) -> bool {
        self.attachment.is_attached()
    }
}

impl<S: Scope> Clone for ScopedCollector<S> {
    fn clone(&self) -> Self {
        Self {
            collector: self.collector.clone(),
            attachment: self.attachment.clone(),
        }
    }
}

impl<S: Scope> Deref for ScopedCollector<S> {
    type Target = Collector<ScopeExtractor<S>>;

    fn deref(&self) -> &Self::Target {
        &self.collector
    }
}

impl<S: Scope> fmt::Debug for ScopedCollector<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedCollector")
            .field("collector", &self.collector)
            .field("attached", &self.is_attached())
            .finish()
    }
}

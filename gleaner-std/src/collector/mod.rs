//! # Collector engine
//!
//! A [`Collector`] accumulates items out of a live event stream until one of
//! its termination conditions fires:
//!
//! - **lifetime**: an absolute deadline counted from construction (`time`)
//! - **idle**: a rolling deadline rearmed on every accepted item (`idle`)
//! - **max**: an item count (`limit`)
//! - **stop**: the owner or a scope signal ends it explicitly
//!
//! Results can be consumed three ways: notifications ([`Collector::on`]),
//! the next accepted item ([`Collector::next`]) and a pull stream over
//! accepted items ([`Collector::drain`]).
//!
//! # Termination
//!
//! Recording a termination reason and finalizing are separate steps. Every
//! trigger funnels into [`Collector::stop`], which is a no-op once the
//! collector has ended, so timers, the item limit and scope signals can race
//! without emitting `End` twice.
//!
//! While a notification is being emitted, ending is deferred: the reason is
//! recorded and the emitter finalizes once it is done. `End` is therefore
//! always the last notification, and a stream never misses an item that is
//! part of the final snapshot.
//!
//! # Locking
//!
//! State lives behind one mutex that is never held across an `.await` or
//! while notifications run.

mod drain;
mod next;
mod notify;
mod options;
mod timer;

pub use drain::Drain;
pub use next::{Ended, Next};
pub use notify::{CollectorEvent, EventKind};
pub use options::{CollectorOptions, TimerReset};

use crate::{
    log::{log_debug, log_trace},
    subscription::{ListenerId, Subscription},
};
use futures::channel::{mpsc, oneshot};
use gleaner_core::{CollectError, ConfigError, EndReason, Extractor};
use next::Pending;
use notify::Notifier;
use std::{
    fmt,
    future::Future,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError, Weak,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use timer::Timer;
use tokio::runtime::Handle;

type Item<X> = <X as Extractor>::Item;
type Reason<X> = <X as Extractor>::Reason;
type Event<X> = CollectorEvent<Item<X>, Reason<X>>;
type Guard<'a, X> = MutexGuard<'a, State<Item<X>, Reason<X>>>;

#[derive(Debug, Clone, Copy)]
enum Deadline {
    Lifetime,
    Idle,
}

impl Deadline {
    fn reason<R>(self) -> EndReason<R> {
        match self {
            Deadline::Lifetime => EndReason::Time,
            Deadline::Idle => EndReason::Idle,
        }
    }
}

struct State<T, R> {
    items: Vec<T>,
    ended: bool,
    end_reason: Option<EndReason<R>>,
    requested: Option<EndReason<R>>,
    /// Notifications currently being emitted outside the lock.
    emitting: usize,
    lifetime: Option<Timer>,
    idle: Option<Timer>,
}

impl<T, R> State<T, R> {
    fn request_end(&mut self, reason: EndReason<R>) {
        if !self.ended && self.requested.is_none() {
            self.requested = Some(reason);
        }
    }

    /// Open for new items: not ended and no termination pending.
    fn is_open(&self) -> bool {
        !self.ended && self.requested.is_none()
    }

    fn timer(&self, deadline: Deadline) -> Option<&Timer> {
        match deadline {
            Deadline::Lifetime => self.lifetime.as_ref(),
            Deadline::Idle => self.idle.as_ref(),
        }
    }
}

struct Inner<X: Extractor> {
    extractor: X,
    options: CollectorOptions<Item<X>>,
    runtime: Option<Handle>,
    next_timer: AtomicU64,
    state: Mutex<State<Item<X>, Reason<X>>>,
    notifier: Notifier<Item<X>, Reason<X>>,
}

impl<X: Extractor> Inner<X> {
    fn lock(&self) -> Guard<'_, X> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A bounded accumulator over the events of one [`Extractor`].
///
/// Cloning is cheap and every clone refers to the same collector.
pub struct Collector<X: Extractor> {
    inner: Arc<Inner<X>>,
}

impl<X: Extractor> Clone for Collector<X> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<X: Extractor> fmt::Debug for Collector<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("Collector")
            .field("collected", &state.items.len())
            .field("ended", &state.ended)
            .field("end_reason", &state.end_reason)
            .field("lifetime", &state.lifetime.as_ref().map(Timer::duration))
            .field("idle", &state.idle.as_ref().map(Timer::duration))
            .field("options", &self.inner.options)
            .finish()
    }
}

impl<X: Extractor> Collector<X> {
    /// Validate `options`, arm the configured timers and start collecting.
    ///
    /// Timers run on the current Tokio runtime; configuring one outside a
    /// runtime is a [`ConfigError::NoRuntime`].
    pub fn new(extractor: X, options: CollectorOptions<Item<X>>) -> Result<Self, ConfigError> {
        options.validate()?;
        let runtime = if options.has_timers() {
            Some(Handle::try_current().map_err(|_| ConfigError::NoRuntime)?)
        } else {
            None
        };

        let collector = Self {
            inner: Arc::new(Inner {
                extractor,
                options,
                runtime,
                next_timer: AtomicU64::new(0),
                state: Mutex::new(State {
                    items: Vec::new(),
                    ended: false,
                    end_reason: None,
                    requested: None,
                    emitting: 0,
                    lifetime: None,
                    idle: None,
                }),
                notifier: Notifier::new(),
            }),
        };

        {
            let options = &collector.inner.options;
            let mut state = collector.inner.lock();
            state.lifetime = options
                .lifetime
                .and_then(|after| collector.arm(Deadline::Lifetime, after));
            state.idle = options
                .idle
                .and_then(|after| collector.arm(Deadline::Idle, after));
        }

        log_debug!(options = ?collector.inner.options, "collector armed");
        Ok(collector)
    }

    fn arm(&self, deadline: Deadline, after: Duration) -> Option<Timer> {
        let runtime = self.inner.runtime.as_ref()?;
        let id = self.inner.next_timer.fetch_add(1, Ordering::Relaxed);
        let weak: Weak<Inner<X>> = Arc::downgrade(&self.inner);
        Some(Timer::spawn(runtime, id, after, move || {
            if let Some(inner) = weak.upgrade() {
                Collector { inner }.expire(deadline, id);
            }
        }))
    }

    /// Timer callback. Only the timer currently armed for `deadline` may
    /// end the collector; one that was reset or cancelled meanwhile is stale.
    fn expire(&self, deadline: Deadline, id: u64) {
        let state = self.inner.lock();
        if state.timer(deadline).map(Timer::id) != Some(id) {
            return;
        }
        log_trace!(?deadline, "collector timer fired");
        self.end(state, deadline.reason());
    }

    /// The extractor this collector was built with.
    pub fn extractor(&self) -> &X {
        &self.inner.extractor
    }

    /// The options this collector was built with.
    pub fn options(&self) -> &CollectorOptions<Item<X>> {
        &self.inner.options
    }

    /// A snapshot of the items collected so far, in arrival order.
    pub fn collected(&self) -> Vec<Item<X>> {
        self.inner.lock().items.clone()
    }

    /// Whether the collector has ended.
    pub fn is_ended(&self) -> bool {
        self.inner.lock().ended
    }

    /// Why the collector ended, once it has.
    pub fn end_reason(&self) -> Option<EndReason<Reason<X>>> {
        self.inner.lock().end_reason.clone()
    }

    /// Feed one raw event to the collector.
    ///
    /// Irrelevant events are dropped silently. Relevant ones go through the
    /// filter and are either collected or ignored. A filter failure is
    /// returned to the caller and leaves the collector untouched. Events
    /// arriving after the end are no-ops.
    pub async fn ingest(&self, raw: &X::Raw) -> Result<(), CollectError> {
        if self.is_ended() {
            return Ok(());
        }
        let Some(candidate) = self.inner.extractor.extract_collectible(raw) else {
            return Ok(());
        };

        let accepted = self
            .inner
            .options
            .filter
            .accept_dyn(&candidate)
            .await
            .map_err(CollectError::Filter)?;

        if accepted {
            if !self.push(candidate.clone()) {
                return Ok(());
            }
            log_trace!(collected = ?candidate, "item collected");
            self.announce(CollectorEvent::Collected(candidate));
        } else {
            {
                let mut state = self.inner.lock();
                if state.ended {
                    return Ok(());
                }
                state.emitting += 1;
            }
            log_trace!(ignored = ?candidate, "item ignored");
            self.announce(CollectorEvent::Ignored(candidate));
        }

        self.check_end();
        Ok(())
    }

    /// Append an accepted item, rearm the idle timer and request `limit`
    /// when full. Returns `false` if the collector closed meanwhile.
    fn push(&self, item: Item<X>) -> bool {
        let mut state = self.inner.lock();
        if !state.is_open() {
            return false;
        }
        state.items.push(item);
        state.emitting += 1;

        if state.idle.is_some() {
            state.idle = self
                .inner
                .options
                .idle
                .and_then(|after| self.arm(Deadline::Idle, after));
        }
        if let Some(max) = self.inner.options.max {
            if state.items.len() >= max {
                state.request_end(EndReason::Limit);
            }
        }
        true
    }

    /// Emit a notification registered in `emitting` by the caller.
    fn announce(&self, event: Event<X>) {
        self.inner.notifier.emit(&event);
        self.inner.lock().emitting -= 1;
    }

    /// Feed one raw disposal event to the collector.
    ///
    /// Does nothing unless disposal is enabled. The disposed candidate must
    /// pass the filter and be present in the buffer (by `PartialEq`) to be
    /// removed.
    pub async fn dispose(&self, raw: &X::Raw) -> Result<(), CollectError> {
        if !self.inner.options.dispose || self.is_ended() {
            return Ok(());
        }
        let Some(candidate) = self.inner.extractor.extract_disposed(raw) else {
            return Ok(());
        };

        let accepted = self
            .inner
            .options
            .filter
            .accept_dyn(&candidate)
            .await
            .map_err(CollectError::Filter)?;
        if !accepted {
            return Ok(());
        }

        let removed = {
            let mut state = self.inner.lock();
            if state.ended {
                return Ok(());
            }
            let removed = state
                .items
                .iter()
                .position(|item| *item == candidate)
                .map(|index| state.items.remove(index));
            if removed.is_some() {
                state.emitting += 1;
            }
            removed
        };
        let Some(removed) = removed else {
            return Ok(());
        };

        log_trace!(disposed = ?removed, "item disposed");
        self.announce(CollectorEvent::Disposed(removed));
        self.check_end();
        Ok(())
    }

    /// Drop every collected item at once and re-run the end check.
    pub fn empty(&self) {
        {
            let mut state = self.inner.lock();
            if state.ended {
                return;
            }
            state.items.clear();
        }
        self.check_end();
    }

    /// Finalize a pending termination, if one was requested.
    ///
    /// Returns whether the collector has ended.
    pub fn check_end(&self) -> bool {
        let mut state = self.inner.lock();
        if state.emitting == 0 {
            if let Some(reason) = state.requested.take() {
                self.finalize(state, reason);
                return true;
            }
        }
        state.ended
    }

    /// End the collector.
    ///
    /// Cancels both timers, records `reason` and emits `End` with the final
    /// snapshot. Calling it on an ended collector does nothing. Called while
    /// a notification is being emitted, the end is finalized right after it.
    pub fn stop(&self, reason: EndReason<Reason<X>>) {
        let state = self.inner.lock();
        self.end(state, reason);
    }

    fn end(&self, mut state: Guard<'_, X>, reason: EndReason<Reason<X>>) {
        if state.emitting > 0 {
            state.request_end(reason);
            return;
        }
        self.finalize(state, reason);
    }

    /// Mark the collector ended under the same lock that decided it, then
    /// emit `End` outside it.
    fn finalize(&self, mut state: Guard<'_, X>, reason: EndReason<Reason<X>>) {
        if state.ended {
            return;
        }
        state.ended = true;
        state.requested = None;
        state.end_reason = Some(reason.clone());
        let collected = state.items.clone();
        let timers = (state.lifetime.take(), state.idle.take());
        drop(state);
        drop(timers);

        log_debug!(?reason, collected = collected.len(), "collector ended");
        self.inner
            .notifier
            .emit(&CollectorEvent::End { collected, reason });
        self.inner.notifier.clear();
    }

    /// [`stop`](Self::stop) with reason `user`.
    pub fn stop_user(&self) {
        self.stop(EndReason::User);
    }

    /// Reschedule the timers that are currently armed.
    ///
    /// Durations left as `None` fall back to the configured ones. A timer
    /// that was never configured stays disarmed.
    pub fn reset_timers(&self, reset: TimerReset) {
        let mut state = self.inner.lock();
        if state.ended {
            return;
        }
        if state.lifetime.is_some() {
            state.lifetime = reset
                .lifetime
                .or(self.inner.options.lifetime)
                .and_then(|after| self.arm(Deadline::Lifetime, after));
        }
        if state.idle.is_some() {
            state.idle = reset
                .idle
                .or(self.inner.options.idle)
                .and_then(|after| self.arm(Deadline::Idle, after));
        }
    }

    /// Listen to one notification kind.
    pub fn on<F>(&self, kind: EventKind, listener: F) -> Subscription
    where
        F: Fn(&Event<X>) + Send + Sync + 'static,
    {
        self.inner.notifier.subscribe(kind, Arc::new(listener))
    }

    /// Listen to accepted items.
    pub fn on_collect<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Item<X>) + Send + Sync + 'static,
    {
        self.on(EventKind::Collect, move |event| {
            if let CollectorEvent::Collected(item) = event {
                listener(item);
            }
        })
    }

    /// Listen to candidates rejected by the filter.
    pub fn on_ignore<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Item<X>) + Send + Sync + 'static,
    {
        self.on(EventKind::Ignore, move |event| {
            if let CollectorEvent::Ignored(item) = event {
                listener(item);
            }
        })
    }

    /// Listen to disposed items.
    pub fn on_dispose<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Item<X>) + Send + Sync + 'static,
    {
        self.on(EventKind::Dispose, move |event| {
            if let CollectorEvent::Disposed(item) = event {
                listener(item);
            }
        })
    }

    /// Listen to the end of the collector.
    pub fn on_end<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&[Item<X>], &EndReason<Reason<X>>) + Send + Sync + 'static,
    {
        self.on(EventKind::End, move |event| {
            if let CollectorEvent::End { collected, reason } = event {
                listener(collected, reason);
            }
        })
    }

    /// Remove a listener kept with [`Subscription::forget`].
    pub fn off(&self, id: ListenerId) -> bool {
        self.inner.notifier.unsubscribe(id)
    }

    /// Wait for the next accepted item.
    ///
    /// Rejects with the final snapshot if the collector has ended, or ends
    /// before another item is accepted.
    pub fn next(&self) -> Next<Item<X>, Reason<X>> {
        // Holding the state lock orders this check before any End emission.
        let state = self.inner.lock();
        if state.ended {
            return Next::ended(Ended {
                collected: state.items.clone(),
                reason: state.end_reason.clone(),
            });
        }

        let (sender, receiver) = oneshot::channel();
        let pending = Pending::new(sender);

        let on_collect = {
            let pending = pending.clone();
            self.inner.notifier.subscribe(
                EventKind::Collect,
                Arc::new(move |event: &Event<X>| {
                    if let CollectorEvent::Collected(item) = event {
                        pending.settle(Ok(item.clone()));
                    }
                }),
            )
        };
        let on_end = {
            let pending = pending.clone();
            self.inner.notifier.subscribe(
                EventKind::End,
                Arc::new(move |event: &Event<X>| {
                    if let CollectorEvent::End { collected, reason } = event {
                        pending.settle(Err(Ended {
                            collected: collected.clone(),
                            reason: Some(reason.clone()),
                        }));
                    }
                }),
            )
        };
        pending.hold([on_collect, on_end]);
        drop(state);

        Next::waiting(receiver, pending)
    }

    /// A fresh pull stream over items accepted from now on.
    ///
    /// Each call starts an independent traversal with its own queue.
    pub fn drain(&self) -> Drain<Item<X>> {
        let state = self.inner.lock();
        if state.ended {
            return Drain::finished();
        }

        let (sender, receiver) = mpsc::unbounded();
        let on_collect = {
            let sender = sender.clone();
            self.inner.notifier.subscribe(
                EventKind::Collect,
                Arc::new(move |event: &Event<X>| {
                    if let CollectorEvent::Collected(item) = event {
                        let _ = sender.unbounded_send(item.clone());
                    }
                }),
            )
        };
        let on_end = self.inner.notifier.subscribe(
            EventKind::End,
            Arc::new(move |_: &Event<X>| sender.close_channel()),
        );
        drop(state);

        Drain::new(receiver, vec![on_collect, on_end])
    }

    /// Wait for the collector to end and return its final snapshot and
    /// reason.
    ///
    /// The reason is `None` only if the collector was dropped without ever
    /// ending.
    pub fn finished(
        &self,
    ) -> impl Future<Output = (Vec<Item<X>>, Option<EndReason<Reason<X>>>)> + Send + 'static {
        let (sender, receiver) = oneshot::channel();
        {
            let state = self.inner.lock();
            if state.ended {
                let _ = sender.send((state.items.clone(), state.end_reason.clone()));
            } else {
                let sender = Mutex::new(Some(sender));
                // Cleared together with every other listener when End fires.
                let _ = self
                    .inner
                    .notifier
                    .subscribe(
                        EventKind::End,
                        Arc::new(move |event: &Event<X>| {
                            if let CollectorEvent::End { collected, reason } = event {
                                let sender = sender
                                    .lock()
                                    .unwrap_or_else(PoisonError::into_inner)
                                    .take();
                                if let Some(sender) = sender {
                                    let _ = sender.send((collected.clone(), Some(reason.clone())));
                                }
                            }
                        }),
                    )
                    .forget();
            }
        }

        async move { receiver.await.unwrap_or_else(|_| (Vec::new(), None)) }
    }

    /// Number of listeners registered for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.inner.notifier.len(kind)
    }
}

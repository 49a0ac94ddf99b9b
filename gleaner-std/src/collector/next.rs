//! Single-shot "next item" protocol.

use crate::subscription::Subscription;
use futures::channel::oneshot;
use gleaner_core::EndReason;
use std::{
    fmt,
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, PoisonError},
    task::{Context, Poll},
};

/// Rejection of [`Next`]: the collector ended before another item arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct Ended<T, R> {
    /// The collector's final snapshot.
    pub collected: Vec<T>,
    /// Why it ended. `None` if the collector was dropped without ending.
    pub reason: Option<EndReason<R>>,
}

impl<T, R> fmt::Display for Ended<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "collector ended with {} collected items before yielding another",
            self.collected.len()
        )
    }
}

impl<T: fmt::Debug, R: fmt::Debug> std::error::Error for Ended<T, R> {}

pub(crate) type Outcome<T, R> = Result<T, Ended<T, R>>;

/// Shared between the two listeners backing one [`Next`]: whichever fires
/// first takes the sender and drops both subscriptions.
pub(crate) struct Pending<T, R> {
    sender: Mutex<Option<oneshot::Sender<Outcome<T, R>>>>,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl<T, R> Pending<T, R> {
    pub(crate) fn new(sender: oneshot::Sender<Outcome<T, R>>) -> Arc<Self> {
        Arc::new(Self {
            sender: Mutex::new(Some(sender)),
            subscriptions: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn hold(&self, subscriptions: impl IntoIterator<Item = Subscription>) {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(subscriptions);
    }

    pub(crate) fn settle(&self, outcome: Outcome<T, R>) {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(sender) = sender {
            let _ = sender.send(outcome);
        }
        self.release();
    }

    fn release(&self) {
        let released: Vec<Subscription> = self
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        drop(released);
    }
}

enum State<T, R> {
    Ready(Option<Outcome<T, R>>),
    Waiting {
        receiver: oneshot::Receiver<Outcome<T, R>>,
        pending: Arc<Pending<T, R>>,
    },
}

/// Future returned by [`Collector::next`](crate::Collector::next).
///
/// Resolves with the next accepted item, or rejects with [`Ended`] if the
/// collector ends first (or had already ended when `next` was called).
#[must_use = "futures do nothing unless polled"]
pub struct Next<T, R> {
    state: State<T, R>,
}

impl<T, R> Next<T, R> {
    pub(crate) fn ended(ended: Ended<T, R>) -> Self {
        Self {
            state: State::Ready(Some(Err(ended))),
        }
    }

    pub(crate) fn waiting(
        receiver: oneshot::Receiver<Outcome<T, R>>,
        pending: Arc<Pending<T, R>>,
    ) -> Self {
        Self {
            state: State::Waiting { receiver, pending },
        }
    }
}

// No field is ever pinned.
impl<T, R> Unpin for Next<T, R> {}

impl<T, R> Future for Next<T, R> {
    type Output = Outcome<T, R>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            State::Ready(outcome) => match outcome.take() {
                Some(outcome) => Poll::Ready(outcome),
                None => Poll::Pending,
            },
            State::Waiting { receiver, pending } => {
                let outcome = match Pin::new(receiver).poll(cx) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(Ok(outcome)) => outcome,
                    Poll::Ready(Err(oneshot::Canceled)) => Err(Ended {
                        collected: Vec::new(),
                        reason: None,
                    }),
                };
                pending.release();
                this.state = State::Ready(None);
                Poll::Ready(outcome)
            }
        }
    }
}

impl<T, R> Drop for Next<T, R> {
    fn drop(&mut self) {
        if let State::Waiting { pending, .. } = &self.state {
            pending.release();
        }
    }
}

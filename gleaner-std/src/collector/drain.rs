//! Lazy pull sequence over accepted items.

use crate::subscription::Subscription;
use futures::{Stream, channel::mpsc};
use std::{
    pin::Pin,
    task::{Context, Poll},
};

/// Stream returned by [`Collector::drain`](crate::Collector::drain).
///
/// Yields every item accepted after the stream was created, in arrival
/// order, and finishes once the collector has ended and the backlog is
/// empty. Items are queued as they arrive, so nothing is lost when pulling
/// starts late. Dropping the stream detaches its listeners.
#[must_use = "streams do nothing unless polled"]
pub struct Drain<T> {
    receiver: mpsc::UnboundedReceiver<T>,
    _subscriptions: Vec<Subscription>,
}

impl<T> Drain<T> {
    pub(crate) fn new(receiver: mpsc::UnboundedReceiver<T>, subscriptions: Vec<Subscription>) -> Self {
        Self {
            receiver,
            _subscriptions: subscriptions,
        }
    }

    /// A stream that is already finished.
    pub(crate) fn finished() -> Self {
        let (_, receiver) = mpsc::unbounded();
        Self::new(receiver, Vec::new())
    }
}

impl<T> Stream for Drain<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        Pin::new(&mut self.get_mut().receiver).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_finished_yields_nothing() {
        let mut drain = Drain::<i32>::finished();
        assert_eq!(drain.next().await, None);
    }

    #[tokio::test]
    async fn test_backlog_drains_after_close() {
        let (tx, rx) = mpsc::unbounded();
        let drain = Drain::new(rx, Vec::new());

        tx.unbounded_send(1).unwrap();
        tx.unbounded_send(2).unwrap();
        tx.close_channel();

        assert_eq!(drain.collect::<Vec<_>>().await, vec![1, 2]);
    }
}

//! Cancelable one-shot timers.

use std::time::Duration;
use tokio::{runtime::Handle, task::JoinHandle};

/// A deferred callback running on a Tokio runtime.
///
/// The callback runs once after `after` unless the timer is dropped first;
/// dropping aborts the underlying task. A callback already running is not
/// interrupted, so owners compare [`Timer::id`] before acting on it.
pub(crate) struct Timer {
    task: JoinHandle<()>,
    id: u64,
    after: Duration,
}

impl Timer {
    pub(crate) fn spawn<F>(runtime: &Handle, id: u64, after: Duration, fire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let task = runtime.spawn(async move {
            tokio::time::sleep(after).await;
            fire();
        });
        Self { task, id, after }
    }

    /// Identifies this arming among every timer of its owner.
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn duration(&self) -> Duration {
        self.after
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_duration() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let timer = Timer::spawn(&Handle::current(), 1, Duration::from_millis(50), move || {
            flag.store(true, Ordering::SeqCst);
        });
        assert_eq!(timer.duration(), Duration::from_millis(50));
        assert_eq!(timer.id(), 1);

        tokio::time::sleep(Duration::from_millis(49)).await;
        assert!(!fired.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_timer_never_fires() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let timer = Timer::spawn(&Handle::current(), 2, Duration::from_millis(10), move || {
            flag.store(true, Ordering::SeqCst);
        });
        drop(timer);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }
}

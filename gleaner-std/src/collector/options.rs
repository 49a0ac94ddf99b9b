//! Collector configuration.

use gleaner_core::{
    AcceptAll, AsyncFnFilter, BoxError, ConfigError, DynFilter, Filter, FnFilter, TryFnFilter,
};
use std::{fmt, future::Future, sync::Arc, time::Duration};

/// Termination policy and filter for a collector.
///
/// # Example
///
/// ```rust,ignore
/// let options = CollectorOptions::new()
///     .max(5)
///     .idle(Duration::from_secs(30))
///     .filter(|n: &i32| *n >= 0);
/// ```
pub struct CollectorOptions<T> {
    pub(crate) lifetime: Option<Duration>,
    pub(crate) idle: Option<Duration>,
    pub(crate) max: Option<usize>,
    pub(crate) dispose: bool,
    pub(crate) filter: Arc<dyn DynFilter<T>>,
}

impl<T: Send + Sync + 'static> CollectorOptions<T> {
    /// Options with no limits, disposal disabled and an accept-all filter.
    pub fn new() -> Self {
        Self {
            lifetime: None,
            idle: None,
            max: None,
            dispose: false,
            filter: Arc::new(AcceptAll),
        }
    }

    /// End with `time` this long after construction.
    pub fn lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// End with `idle` when nothing has been accepted for this long.
    pub fn idle(mut self, idle: Duration) -> Self {
        self.idle = Some(idle);
        self
    }

    /// End with `limit` once this many items are held.
    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    /// Whether disposal events may remove collected items.
    pub fn dispose(mut self, dispose: bool) -> Self {
        self.dispose = dispose;
        self
    }

    /// Accept candidates for which `predicate` returns `true`.
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter_with(FnFilter(predicate))
    }

    /// Accept candidates with a predicate that may fail.
    pub fn try_filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> Result<bool, BoxError> + Send + Sync + 'static,
    {
        self.filter_with(TryFnFilter(predicate))
    }

    /// Accept candidates with an asynchronous predicate.
    pub fn filter_async<F, Fut>(self, predicate: F) -> Self
    where
        T: Clone,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send,
    {
        self.filter_with(AsyncFnFilter(predicate))
    }

    /// Use any [`Filter`] implementation.
    pub fn filter_with<F: Filter<T>>(mut self, filter: F) -> Self {
        self.filter = Arc::new(filter);
        self
    }
}

impl<T> CollectorOptions<T> {
    /// The configured lifetime, if any.
    pub fn lifetime_duration(&self) -> Option<Duration> {
        self.lifetime
    }

    /// The configured idle window, if any.
    pub fn idle_duration(&self) -> Option<Duration> {
        self.idle
    }

    /// The configured item limit, if any.
    pub fn max_items(&self) -> Option<usize> {
        self.max
    }

    /// Whether disposal is enabled.
    pub fn accepts_disposed(&self) -> bool {
        self.dispose
    }

    /// Whether any timer is configured.
    pub(crate) fn has_timers(&self) -> bool {
        self.lifetime.is_some() || self.idle.is_some()
    }

    /// Reject options that can never behave as intended.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max == Some(0) {
            return Err(ConfigError::ZeroLimit);
        }
        if self.lifetime == Some(Duration::ZERO) {
            return Err(ConfigError::ZeroDuration { option: "lifetime" });
        }
        if self.idle == Some(Duration::ZERO) {
            return Err(ConfigError::ZeroDuration { option: "idle" });
        }
        Ok(())
    }
}

impl<T: Send + Sync + 'static> Default for CollectorOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for CollectorOptions<T> {
    fn clone(&self) -> Self {
        Self {
            lifetime: self.lifetime,
            idle: self.idle,
            max: self.max,
            dispose: self.dispose,
            filter: self.filter.clone(),
        }
    }
}

impl<T> fmt::Debug for CollectorOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectorOptions")
            .field("lifetime", &self.lifetime)
            .field("idle", &self.idle)
            .field("max", &self.max)
            .field("dispose", &self.dispose)
            .finish_non_exhaustive()
    }
}

/// New durations for [`Collector::reset_timers`]. `None` keeps the
/// configured duration.
///
/// [`Collector::reset_timers`]: crate::Collector::reset_timers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerReset {
    /// Replacement lifetime.
    pub lifetime: Option<Duration>,
    /// Replacement idle window.
    pub idle: Option<Duration>,
}

impl TimerReset {
    /// Reset both timers to their configured durations.
    pub fn configured() -> Self {
        Self::default()
    }
}

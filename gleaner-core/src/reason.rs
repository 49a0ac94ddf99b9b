//! Termination reasons.

use std::fmt;

/// Why a collector stopped.
///
/// The four built-in reasons are shared by every collector; `Scope` carries a
/// source-specific reason such as "the containing channel was deleted".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndReason<R> {
    /// The lifetime timer fired.
    Time,
    /// No item was accepted within the idle window.
    Idle,
    /// The configured maximum number of items was reached.
    Limit,
    /// The owner stopped the collector.
    User,
    /// The source invalidated the collector's scope.
    Scope(R),
}

impl<R> EndReason<R> {
    /// Returns the source-specific reason, if any.
    pub fn scope(&self) -> Option<&R> {
        match self {
            EndReason::Scope(reason) => Some(reason),
            _ => None,
        }
    }
}

impl<R> Default for EndReason<R> {
    fn default() -> Self {
        EndReason::User
    }
}

impl<R: fmt::Display> fmt::Display for EndReason<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::Time => f.write_str("time"),
            EndReason::Idle => f.write_str("idle"),
            EndReason::Limit => f.write_str("limit"),
            EndReason::User => f.write_str("user"),
            EndReason::Scope(reason) => reason.fmt(f),
        }
    }
}

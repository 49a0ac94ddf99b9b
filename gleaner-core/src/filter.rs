//! # Acceptance Filters
//!
//! A filter decides whether a candidate item is collected or ignored. Filters
//! may be synchronous or asynchronous and may fail; a failure aborts handling
//! of the one event that triggered it.
//!
//! # Implementations
//!
//! - [`AcceptAll`] - the default, accepts every candidate
//! - [`FnFilter`] - a plain `Fn(&T) -> bool`
//! - [`TryFnFilter`] - a fallible `Fn(&T) -> Result<bool, BoxError>`
//! - [`AsyncFnFilter`] - an `Fn(T) -> impl Future<Output = bool>`

use crate::{
    error::BoxError,
    hook::BoxFuture,
};
use std::future::Future;

/// An acceptance predicate over candidate items.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Filter` for `{T}`",
    label = "missing `Filter` implementation",
    note = "Filters must implement the `accept` method for `{T}`."
)]
pub trait Filter<T>: Send + Sync + 'static {
    /// Returns `Ok(true)` when `item` should be collected.
    fn accept(&self, item: &T) -> impl Future<Output = Result<bool, BoxError>> + Send;
}

/// Object-safe version of [`Filter`].
pub trait DynFilter<T>: Send + Sync + 'static {
    /// Dynamic dispatch version of [`Filter::accept`].
    fn accept_dyn<'a>(&'a self, item: &'a T) -> BoxFuture<'a, Result<bool, BoxError>>;
}

impl<T, F> DynFilter<T> for F
where
    T: Sync,
    F: Filter<T>,
{
    fn accept_dyn<'a>(&'a self, item: &'a T) -> BoxFuture<'a, Result<bool, BoxError>> {
        Box::pin(self.accept(item))
    }
}

/// Accepts every candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl<T: Sync> Filter<T> for AcceptAll {
    async fn accept(&self, _item: &T) -> Result<bool, BoxError> {
        Ok(true)
    }
}

/// A synchronous, infallible predicate.
pub struct FnFilter<F>(pub F);

impl<T, F> Filter<T> for FnFilter<F>
where
    T: Sync,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    async fn accept(&self, item: &T) -> Result<bool, BoxError> {
        Ok((self.0)(item))
    }
}

/// A synchronous predicate that may fail.
pub struct TryFnFilter<F>(pub F);

impl<T, F> Filter<T> for TryFnFilter<F>
where
    T: Sync,
    F: Fn(&T) -> Result<bool, BoxError> + Send + Sync + 'static,
{
    async fn accept(&self, item: &T) -> Result<bool, BoxError> {
        (self.0)(item)
    }
}

/// An asynchronous predicate. The candidate is cloned into the call so the
/// returned future can own it.
pub struct AsyncFnFilter<F>(pub F);

impl<T, F, Fut> Filter<T> for AsyncFnFilter<F>
where
    T: Clone + Send + Sync,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send,
{
    async fn accept(&self, item: &T) -> Result<bool, BoxError> {
        Ok((self.0)(item.clone()).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_accept_all() {
        assert!(AcceptAll.accept(&"anything").await.unwrap());
    }

    #[tokio::test]
    async fn test_fn_filter_through_dyn() {
        let filter: Box<dyn DynFilter<i32>> = Box::new(FnFilter(|n: &i32| *n >= 0));
        assert!(filter.accept_dyn(&5).await.unwrap());
        assert!(!filter.accept_dyn(&-1).await.unwrap());
    }

    #[tokio::test]
    async fn test_try_fn_filter_error() {
        let filter = TryFnFilter(|n: &i32| {
            if *n == 0 {
                Err(BoxError::from("zero is not allowed"))
            } else {
                Ok(true)
            }
        });
        assert!(filter.accept(&1).await.unwrap());
        let err = filter.accept(&0).await.unwrap_err();
        assert_eq!(err.to_string(), "zero is not allowed");
    }

    #[tokio::test]
    async fn test_async_fn_filter() {
        let filter = AsyncFnFilter(|s: String| async move { s.starts_with('!') });
        assert!(filter.accept(&"!ping".to_string()).await.unwrap());
        assert!(!filter.accept(&"ping".to_string()).await.unwrap());
    }
}

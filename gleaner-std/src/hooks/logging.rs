//! Logging hook for bus observation.

use gleaner_core::{BoxError, Hook, Message};
use std::fmt::Debug;

/// A hook that logs every event it is delivered.
#[derive(Debug, Clone, Default)]
pub struct LoggingHook {
    label: Option<&'static str>,
}

impl LoggingHook {
    /// An unlabeled logging hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// A logging hook that tags its records with `label`.
    pub fn named(label: &'static str) -> Self {
        Self { label: Some(label) }
    }

    /// The label attached to log records, if any.
    pub fn label(&self) -> Option<&'static str> {
        self.label
    }
}

impl<E: Message + Debug> Hook<E> for LoggingHook {
    async fn on_event(&self, event: &E) -> Result<(), BoxError> {
        #[cfg(feature = "tracing")]
        {
            tracing::debug!(label = self.label, ?event, "bus event");
        }
        #[cfg(not(feature = "tracing"))]
        {
            let _ = event;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_logging_hook_never_fails() {
        let hook = LoggingHook::named("audit");
        assert_eq!(hook.label(), Some("audit"));
        assert!(hook.on_event(&"hello").await.is_ok());
        assert!(LoggingHook::new().on_event(&42u8).await.is_ok());
    }
}

//! Logging shims that compile away without the `tracing` feature.

macro_rules! log_debug {
    ($($arg:tt)+) => {{
        #[cfg(feature = "tracing")]
        {
            tracing::debug!($($arg)+);
        }
    }};
}

macro_rules! log_trace {
    ($($arg:tt)+) => {{
        #[cfg(feature = "tracing")]
        {
            tracing::trace!($($arg)+);
        }
    }};
}

macro_rules! log_warn {
    ($($arg:tt)+) => {{
        #[cfg(feature = "tracing")]
        {
            tracing::warn!($($arg)+);
        }
    }};
}

pub(crate) use log_debug;
pub(crate) use log_trace;
pub(crate) use log_warn;

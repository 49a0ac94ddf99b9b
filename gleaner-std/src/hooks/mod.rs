//! Ready-made bus hooks.

mod logging;

pub use logging::LoggingHook;

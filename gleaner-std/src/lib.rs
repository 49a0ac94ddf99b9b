//! # gleaner-std
//!
//! Standard implementations for the Gleaner event collection framework.
//!
//! This crate provides:
//! - **Collector engine**: [`Collector`], [`CollectorOptions`], [`Next`], [`Drain`]
//! - **Event bus**: [`EventBus`]
//! - **Scoped collectors**: [`ScopedCollector`]
//! - **Standard hooks**: Logging
//! - **Testing utilities**: [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use gleaner_core;

mod log;

// Modules
pub mod bus;
pub mod collector;
pub mod hooks;
pub mod scoped;
pub mod subscription;
pub mod testing;

pub use bus::{EventBus, PublishReport, WeakEventBus};
pub use collector::{
    Collector, CollectorEvent, CollectorOptions, Drain, Ended, EventKind, Next, TimerReset,
};
pub use scoped::ScopedCollector;
pub use subscription::{ListenerId, Subscription};

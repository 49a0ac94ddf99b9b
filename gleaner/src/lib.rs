//! # gleaner - Bounded Event Collectors
//!
//! `gleaner` accumulates items out of a live event stream until a
//! termination policy fires: a lifetime deadline, an idle window, an item
//! limit, an explicit stop, or the deletion of the scope being watched.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gleaner::prelude::*;
//! use gleaner::gateway::{Channel, MessageCollector, MessageScope};
//!
//! let bus = GatewayBus::new();
//! let collector = MessageCollector::attach(
//!     &bus,
//!     MessageScope::new(channel),
//!     CollectorOptions::new().max(3).idle(Duration::from_secs(30)),
//! )?;
//!
//! // Elsewhere, the gateway publishes events on `bus`.
//! let (messages, reason) = collector.finished().await;
//! ```
//!
//! Collectors can also be driven directly, without a bus, through an
//! [`Extractor`] such as [`Identity`].

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use gleaner_core::{
    // Filters
    AcceptAll,
    AsyncFnFilter,
    // Errors
    BoxError,
    BoxFuture,
    BusError,
    // Scopes
    BusEvent,
    CollectError,
    // Extraction
    Collectible,
    ConfigError,
    DynFilter,
    // Hooks
    DynHook,
    EndReason,
    Extractor,
    Filter,
    FnFilter,
    GleanerError,
    Hook,
    Identity,
    // Message
    Message,
    Route,
    Scope,
    ScopeExtractor,
    TryFnFilter,
};

// Engine
pub use gleaner_std::{
    Collector, CollectorEvent, CollectorOptions, Drain, Ended, EventKind, Next, TimerReset,
};

// Bus
pub use gleaner_std::{
    EventBus, ListenerId, PublishReport, ScopedCollector, Subscription, WeakEventBus,
};

pub mod gateway;

/// Standard hook implementations.
pub mod hooks {
    pub use gleaner_std::hooks::LoggingHook;
}

/// Testing utilities.
pub mod testing {
    pub use gleaner_std::testing::{RecordingHook, RecordingObserver};
}

/// Prelude module - common imports for Gleaner.
///
/// # Usage
///
/// ```rust,ignore
/// use gleaner::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Errors
        BoxError,
        CollectError,
        // Engine
        Collector,
        CollectorEvent,
        CollectorOptions,
        ConfigError,
        EndReason,
        EventKind,
        // Bus
        EventBus,
        Extractor,
        Filter,
        Hook,
        Scope,
        ScopedCollector,
        TimerReset,
        gateway::{GatewayBus, GatewayEvent, ScopeEnd},
    };
    pub use std::time::Duration;
}

//! # gleaner-core
//!
//! Core traits for the Gleaner event collection framework.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! event sources and extensions that don't need the full `gleaner-std`
//! implementation.
//!
//! # Seams
//!
//! A collector accumulates items out of a live event stream until one of its
//! termination conditions fires. Four seams shape what it sees:
//!
//! ## [`Extractor`]
//!
//! Decides whether a raw event is relevant to a collector and turns it into a
//! candidate item, both for collection and for disposal.
//!
//! ## [`Filter`]
//!
//! The user's accept/reject decision over a candidate. May be asynchronous
//! and may fail.
//!
//! ## [`Scope`]
//!
//! Binds a collector to a named-event bus: which event kinds to subscribe to,
//! what each of them does ([`Route`]), and which events end the collector
//! because the scope was deleted.
//!
//! ## [`Hook`]
//!
//! A bus listener. Scopes are wired to a bus through hooks.
//!
//! # Error Types
//!
//! - [`GleanerError`] - Top-level error type
//! - [`ConfigError`] - Rejected collector options
//! - [`CollectError`] - Failed ingestion or disposal of one event
//! - [`BusError`] - Failed bus listener

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod extract;
mod filter;
mod hook;
mod message;
mod reason;
mod scope;

// Re-exports
pub use error::{BoxError, BusError, CollectError, ConfigError, GleanerError};
pub use extract::{Collectible, Extractor, Identity};
pub use filter::{AcceptAll, AsyncFnFilter, DynFilter, Filter, FnFilter, TryFnFilter};
pub use hook::{BoxFuture, DynHook, Hook};
pub use message::Message;
pub use reason::EndReason;
pub use scope::{BusEvent, Route, Scope, ScopeExtractor};

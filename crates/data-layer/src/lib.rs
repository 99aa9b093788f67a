//! Event-Driven Data Layer (EDDL) interception — takes over a page's shared
//! event queue, carries page context forward across events, and forwards a
//! normalized record for every accepted entry to a tracking sink.
//!
//! # Modules
//!
//! - [`entry`] — Boundary parsing of raw queue values into typed entries
//! - [`context`] — Single-slot store for the carried-forward page context
//! - [`merge`] — Combines context and entry data into a `NormalizedEvent`
//! - [`dispatcher`] — Classification path and tracking-sink dispatch
//! - [`interceptor`] — The intercepted queue and the page-scope registry

pub mod context;
pub mod dispatcher;
pub mod entry;
pub mod interceptor;
pub mod merge;

pub use context::ContextStore;
pub use dispatcher::{DispatchMetrics, Dispatcher};
pub use entry::{DataLayerEntry, OtherEntry, PageLoadEntry};
pub use interceptor::{DataLayer, InstallOutcome, PageScope};
pub use merge::merge;

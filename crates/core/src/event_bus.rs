//! Tracking sink seam — the outbound call every accepted queue entry ends in.
//!
//! The dispatcher holds an `Arc<dyn TrackingSink>` and hands it a tracking
//! name plus the merged payload. Calls are fire-and-forget: nothing is
//! returned and nothing is retried.

use crate::types::{NormalizedEvent, TrackingCall};
use std::sync::{Arc, Mutex};
use tracing::info;

/// Host-provided tracking call, `track(name, payload)`.
pub trait TrackingSink: Send + Sync {
    fn track(&self, name: &str, payload: &NormalizedEvent);
}

/// No-op sink for hosts that only want the dispatcher's side effects.
pub struct NoOpSink;

impl TrackingSink for NoOpSink {
    fn track(&self, _name: &str, _payload: &NormalizedEvent) {}
}

/// Sink that records every call as a structured log line.
pub struct LogSink;

impl TrackingSink for LogSink {
    fn track(&self, name: &str, payload: &NormalizedEvent) {
        info!(
            tracking_name = name,
            link_name = payload.link_name.as_deref(),
            page_keys = payload.page.len(),
            data_keys = payload.data.len(),
            "tracking call"
        );
    }
}

/// In-memory sink that captures calls for testing.
#[derive(Default)]
pub struct CaptureSink {
    calls: Mutex<Vec<TrackingCall>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<TrackingCall> {
        self.calls.lock().expect("capture sink mutex poisoned").clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().expect("capture sink mutex poisoned").len()
    }

    pub fn count_named(&self, name: &str) -> usize {
        self.calls
            .lock()
            .expect("capture sink mutex poisoned")
            .iter()
            .filter(|c| c.name == name)
            .count()
    }

    pub fn clear(&self) {
        self.calls.lock().expect("capture sink mutex poisoned").clear();
    }
}

impl TrackingSink for CaptureSink {
    fn track(&self, name: &str, payload: &NormalizedEvent) {
        self.calls
            .lock()
            .expect("capture sink mutex poisoned")
            .push(TrackingCall {
                name: name.to_string(),
                payload: payload.clone(),
            });
    }
}

/// Convenience: a sink that drops every call.
pub fn noop_sink() -> Arc<dyn TrackingSink> {
    Arc::new(NoOpSink)
}

/// Convenience: create a capture sink for tests.
pub fn capture_sink() -> Arc<CaptureSink> {
    Arc::new(CaptureSink::new())
}

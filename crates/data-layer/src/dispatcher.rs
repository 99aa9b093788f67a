//! Dispatcher — classifies raw queue values, keeps the page context current,
//! and hands every accepted entry to the tracking sink.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error};

use eddl_core::config::DataLayerConfig;
use eddl_core::error::DataLayerResult;
use eddl_core::event_bus::{noop_sink, TrackingSink};
use eddl_core::types::{Context, NormalizedEvent};

use crate::context::ContextStore;
use crate::entry::{raw_event_name, DataLayerEntry};
use crate::merge::merge;

/// Running counters for one dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchMetrics {
    pub dispatched: u64,
    pub page_loads: u64,
    pub others: u64,
    pub skipped: u64,
}

/// Routes queue entries through validation, context handling and the sink.
pub struct Dispatcher {
    config: DataLayerConfig,
    context: ContextStore,
    sink: Arc<dyn TrackingSink>,
    metrics: DispatchMetrics,
}

impl Dispatcher {
    pub fn new(config: DataLayerConfig) -> Self {
        Self {
            config,
            context: ContextStore::new(),
            sink: noop_sink(),
            metrics: DispatchMetrics::default(),
        }
    }

    /// Attach the tracking sink that receives every dispatched event.
    pub fn with_sink(mut self, sink: Arc<dyn TrackingSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &DataLayerConfig {
        &self.config
    }

    /// Context as of the last processed `PageLoad`.
    pub fn context(&self) -> &Context {
        self.context.read()
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }

    /// Namespaced name used for the tracking call.
    pub fn tracking_name(&self, event: &str) -> String {
        format!("{}{}", self.config.event_prefix, event)
    }

    /// Process one raw entry and report why it was rejected, if it was.
    /// A rejected entry has no effect on context, sink or counters.
    pub fn try_process(&mut self, raw: &Value) -> DataLayerResult<NormalizedEvent> {
        let entry = DataLayerEntry::parse(raw)?;
        Ok(self.dispatch_entry(&entry))
    }

    /// Process one raw entry, logging and skipping it if it is malformed.
    /// Returns whether the entry was dispatched.
    pub fn process(&mut self, raw: &Value) -> bool {
        match self.try_process(raw) {
            Ok(_) => true,
            Err(err) => {
                self.metrics.skipped += 1;
                error!(
                    data_layer = %self.config.name,
                    event = raw_event_name(raw),
                    "{}: {}",
                    self.config.name,
                    err
                );
                false
            }
        }
    }

    /// Dispatch an already validated entry.
    pub fn dispatch_entry(&mut self, entry: &DataLayerEntry) -> NormalizedEvent {
        match entry {
            DataLayerEntry::PageLoad(page_load) => {
                self.context.reset(Context::with_page(page_load.page.clone()));
                self.metrics.page_loads += 1;
                debug!(
                    "{}: Dispatching Page Load Event {}",
                    self.config.name, page_load.event
                );
            }
            DataLayerEntry::Other(other) => {
                self.metrics.others += 1;
                debug!(
                    "{}: Dispatching Other Event {}",
                    self.config.name, other.event
                );
            }
        }

        let payload = merge(self.context.read(), entry, &self.config.unknown_link_name);
        let tracking_name = self.tracking_name(entry.event());

        debug!(tracking_name = %tracking_name, payload = ?payload, "dispatching to tracking sink");
        self.sink.track(&tracking_name, &payload);
        self.metrics.dispatched += 1;

        payload
    }
}

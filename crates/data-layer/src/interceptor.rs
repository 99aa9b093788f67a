//! Queue interceptor — the page-visible data layer queue.
//!
//! Code on the page pushes entries before or after the dispatcher is ready.
//! Until [`DataLayer::install`] runs, pushes only buffer. Installing drains
//! that backlog in insertion order and from then on every push is routed
//! straight to the dispatcher.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use eddl_core::config::DataLayerConfig;
use eddl_core::event_bus::TrackingSink;

use crate::dispatcher::Dispatcher;

/// Result of an install attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The interceptor was installed after draining `drained` backlog entries.
    Installed { drained: usize },
    /// An interceptor was already in place; nothing was done.
    AlreadyInstalled,
}

/// A data layer queue, buffering until intercepted.
#[derive(Default)]
pub struct DataLayer {
    backlog: VecDeque<Value>,
    dispatcher: Option<Dispatcher>,
}

impl DataLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue that already holds entries pushed by earlier code.
    pub fn with_entries(entries: impl IntoIterator<Item = Value>) -> Self {
        Self {
            backlog: entries.into_iter().collect(),
            dispatcher: None,
        }
    }

    pub fn is_intercepted(&self) -> bool {
        self.dispatcher.is_some()
    }

    /// Entries waiting for an interceptor. Always zero once installed.
    pub fn len(&self) -> usize {
        self.backlog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backlog.is_empty()
    }

    /// Buffered entries, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &Value> {
        self.backlog.iter()
    }

    pub fn dispatcher(&self) -> Option<&Dispatcher> {
        self.dispatcher.as_ref()
    }

    /// Push one or more entries, in argument order.
    pub fn push(&mut self, entries: impl IntoIterator<Item = Value>) {
        match self.dispatcher.as_mut() {
            Some(dispatcher) => {
                for entry in entries {
                    dispatcher.process(&entry);
                }
            }
            None => self.backlog.extend(entries),
        }
    }

    pub fn push_one(&mut self, entry: Value) {
        self.push(std::iter::once(entry));
    }

    /// Take over the queue with `dispatcher`.
    ///
    /// The backlog is drained through the dispatcher before live routing
    /// starts, so each buffered entry is processed exactly once and ahead of
    /// anything pushed afterwards. Installing twice is a no-op: the first
    /// dispatcher and its context stay in place and `dispatcher` is dropped.
    pub fn install(&mut self, mut dispatcher: Dispatcher) -> InstallOutcome {
        if self.dispatcher.is_some() {
            debug!(
                data_layer = %dispatcher.config().name,
                "interceptor already installed, skipping"
            );
            return InstallOutcome::AlreadyInstalled;
        }

        let mut drained = 0;
        while let Some(entry) = self.backlog.pop_front() {
            dispatcher.process(&entry);
            drained += 1;
        }

        info!(
            data_layer = %dispatcher.config().name,
            drained,
            "data layer interceptor installed"
        );
        self.dispatcher = Some(dispatcher);
        InstallOutcome::Installed { drained }
    }
}

/// Named data layers reachable from anywhere on the page.
#[derive(Default)]
pub struct PageScope {
    layers: HashMap<String, DataLayer>,
}

impl PageScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// The queue registered under `name`, created empty if absent. An existing
    /// queue is returned as is, entries included.
    pub fn data_layer(&mut self, name: &str) -> &mut DataLayer {
        self.layers.entry(name.to_string()).or_default()
    }

    pub fn get(&self, name: &str) -> Option<&DataLayer> {
        self.layers.get(name)
    }

    /// Initialize the data layer described by `config`: make sure the queue
    /// exists, then install a dispatcher feeding `sink` unless one already is.
    pub fn install_data_layer(
        &mut self,
        config: DataLayerConfig,
        sink: Arc<dyn TrackingSink>,
    ) -> InstallOutcome {
        debug!("Begin EDDL Initialization");
        let layer = self.data_layer(&config.name);
        let outcome = layer.install(Dispatcher::new(config).with_sink(sink));
        debug!(?outcome, "Completed EDDL Initialization");
        outcome
    }
}

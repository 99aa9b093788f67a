//! Context store — the single slot holding the page context established by
//! the most recent `PageLoad` entry.

use eddl_core::types::Context;

/// Owns the carried-forward context for one data layer.
///
/// Only the dispatcher replaces the context, and only after a `PageLoad`
/// entry has passed validation. Everyone else gets read access.
#[derive(Debug, Clone, Default)]
pub struct ContextStore {
    current: Context,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> &Context {
        &self.current
    }

    /// Replace the held context wholesale. Keys from the previous context are
    /// not carried over.
    pub(crate) fn reset(&mut self, context: Context) {
        self.current = context;
    }
}

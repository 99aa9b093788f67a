//! Merger — combines the current context with an entry's own data.

use eddl_core::types::{Context, NormalizedEvent};

use crate::entry::DataLayerEntry;

/// Build the payload for `entry` against `context`.
///
/// `page` and `data` are cloned, so the result stays fixed when the context
/// is later replaced or the caller mutates its own copy of the entry.
pub fn merge(
    context: &Context,
    entry: &DataLayerEntry,
    unknown_link_name: &str,
) -> NormalizedEvent {
    let link_name = match entry {
        DataLayerEntry::Other(other) => Some(
            other
                .link_name
                .clone()
                .unwrap_or_else(|| unknown_link_name.to_string()),
        ),
        DataLayerEntry::PageLoad(_) => None,
    };

    NormalizedEvent {
        link_name,
        page: context.page.clone(),
        data: entry.data().clone(),
    }
}

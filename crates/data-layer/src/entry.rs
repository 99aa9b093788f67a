//! Queue entries — raw values pushed onto the data layer are untyped JSON;
//! this module turns them into the closed set of entries the dispatcher
//! understands, or the reason the entry has to be skipped.

use serde_json::Value;
use tracing::warn;

use eddl_core::error::{DataLayerError, DataLayerResult};
use eddl_core::types::{Attributes, EntryType};

/// A `PageLoad` entry. Its `page` becomes the new context.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLoadEntry {
    pub event: String,
    pub page: Attributes,
    pub data: Attributes,
}

/// An `Other` entry (clicks, interactions). Dispatched against the current context.
#[derive(Debug, Clone, PartialEq)]
pub struct OtherEntry {
    pub event: String,
    pub data: Attributes,
    pub link_name: Option<String>,
}

/// A validated queue entry.
#[derive(Debug, Clone, PartialEq)]
pub enum DataLayerEntry {
    PageLoad(PageLoadEntry),
    Other(OtherEntry),
}

impl DataLayerEntry {
    /// Validate a raw queue value.
    ///
    /// Checks run in a fixed order: `type` present, `event` present, `type`
    /// recognized, then `page` for page loads. The first failure wins. Fields
    /// with an unexpected shape are coerced rather than rejected.
    pub fn parse(raw: &Value) -> DataLayerResult<Self> {
        // Non-object values have no fields, so they fail the first check.
        let empty = Attributes::new();
        let fields = raw.as_object().unwrap_or(&empty);

        let type_value =
            present(fields, "type").ok_or(DataLayerError::MissingField { field: "type" })?;
        let event_value =
            present(fields, "event").ok_or(DataLayerError::MissingField { field: "event" })?;

        let entry_type = type_value
            .as_str()
            .ok_or_else(|| type_value.to_string())
            .and_then(|s| s.parse::<EntryType>())
            .map_err(|event_type| DataLayerError::UnknownType { event_type })?;

        let event = text(event_value);

        match entry_type {
            EntryType::PageLoad => {
                let page = match present(fields, "page") {
                    None => return Err(DataLayerError::MissingPageContext { event }),
                    Some(value) => object_or_empty(value, "page", &event),
                };
                let data = optional_object(fields, "data", &event);
                Ok(DataLayerEntry::PageLoad(PageLoadEntry { event, page, data }))
            }
            EntryType::Other => {
                let data = optional_object(fields, "data", &event);
                let link_name = present(fields, "linkName").map(text);
                Ok(DataLayerEntry::Other(OtherEntry {
                    event,
                    data,
                    link_name,
                }))
            }
        }
    }

    pub fn entry_type(&self) -> EntryType {
        match self {
            DataLayerEntry::PageLoad(_) => EntryType::PageLoad,
            DataLayerEntry::Other(_) => EntryType::Other,
        }
    }

    pub fn event(&self) -> &str {
        match self {
            DataLayerEntry::PageLoad(e) => &e.event,
            DataLayerEntry::Other(e) => &e.event,
        }
    }

    pub fn data(&self) -> &Attributes {
        match self {
            DataLayerEntry::PageLoad(e) => &e.data,
            DataLayerEntry::Other(e) => &e.data,
        }
    }
}

/// Event name of a raw value, if it has a usable one. Used for log context
/// on entries that fail validation.
pub fn raw_event_name(raw: &Value) -> Option<&str> {
    raw.get("event").and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// A field counts as present unless it is missing or falsy: `null`,
/// `false`, zero or an empty string.
fn present<'a>(fields: &'a Attributes, key: &str) -> Option<&'a Value> {
    match fields.get(key) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => None,
        Some(value) => Some(value),
    }
}

/// String fields keep their text; anything else is rendered as JSON.
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn object_or_empty(value: &Value, field: &'static str, event: &str) -> Attributes {
    match value.as_object() {
        Some(fields) => fields.clone(),
        None => {
            warn!(field, event, "expected an object, using an empty one");
            Attributes::new()
        }
    }
}

fn optional_object(fields: &Attributes, field: &'static str, event: &str) -> Attributes {
    match present(fields, field) {
        None => Attributes::new(),
        Some(value) => object_or_empty(value, field, event),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_page_load() {
        let raw = json!({
            "type": "PageLoad",
            "event": "view",
            "page": {"name": "Home", "channel": "Cancer.gov"},
            "data": {"y": 2}
        });
        let entry = DataLayerEntry::parse(&raw).unwrap();
        assert_eq!(entry.entry_type(), EntryType::PageLoad);
        assert_eq!(entry.event(), "view");
        match entry {
            DataLayerEntry::PageLoad(pl) => {
                assert_eq!(pl.page["name"], "Home");
                assert_eq!(pl.data["y"], 2);
            }
            other => panic!("expected PageLoad, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_other_with_and_without_link_name() {
        let raw = json!({"type": "Other", "event": "click", "linkName": "cta", "data": {"x": 1}});
        match DataLayerEntry::parse(&raw).unwrap() {
            DataLayerEntry::Other(o) => {
                assert_eq!(o.link_name.as_deref(), Some("cta"));
                assert_eq!(o.data["x"], 1);
            }
            other => panic!("expected Other, got {:?}", other),
        }

        let raw = json!({"type": "Other", "event": "click"});
        match DataLayerEntry::parse(&raw).unwrap() {
            DataLayerEntry::Other(o) => {
                assert_eq!(o.link_name, None);
                assert!(o.data.is_empty());
            }
            other => panic!("expected Other, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_type_is_reported_before_missing_event() {
        let err = DataLayerEntry::parse(&json!({"data": {}})).unwrap_err();
        assert!(matches!(err, DataLayerError::MissingField { field: "type" }));

        let err = DataLayerEntry::parse(&json!({"type": "", "event": "view"})).unwrap_err();
        assert!(matches!(err, DataLayerError::MissingField { field: "type" }));

        let err = DataLayerEntry::parse(&json!({"type": "Bogus"})).unwrap_err();
        assert!(matches!(err, DataLayerError::MissingField { field: "event" }));
    }

    #[test]
    fn test_non_object_entry_has_no_type() {
        for raw in [json!(42), json!("PageLoad"), json!(null), json!([1, 2])] {
            let err = DataLayerEntry::parse(&raw).unwrap_err();
            assert!(matches!(err, DataLayerError::MissingField { field: "type" }));
        }
    }

    #[test]
    fn test_unknown_type() {
        let err = DataLayerEntry::parse(&json!({"type": "Bogus", "event": "x"})).unwrap_err();
        match err {
            DataLayerError::UnknownType { event_type } => assert_eq!(event_type, "Bogus"),
            other => panic!("expected UnknownType, got {:?}", other),
        }

        let err = DataLayerEntry::parse(&json!({"type": 7, "event": "x"})).unwrap_err();
        match err {
            DataLayerError::UnknownType { event_type } => assert_eq!(event_type, "7"),
            other => panic!("expected UnknownType, got {:?}", other),
        }
    }

    #[test]
    fn test_page_load_without_page() {
        let err = DataLayerEntry::parse(&json!({"type": "PageLoad", "event": "view"})).unwrap_err();
        match err {
            DataLayerError::MissingPageContext { event } => assert_eq!(event, "view"),
            other => panic!("expected MissingPageContext, got {:?}", other),
        }
    }

    #[test]
    fn test_falsy_fields_count_as_missing() {
        for value in [json!(false), json!(0), json!(0.0), json!(null), json!("")] {
            let raw = json!({"type": value.clone(), "event": "view"});
            let err = DataLayerEntry::parse(&raw).unwrap_err();
            assert!(matches!(err, DataLayerError::MissingField { field: "type" }));

            let raw = json!({"type": "Other", "event": value.clone()});
            let err = DataLayerEntry::parse(&raw).unwrap_err();
            assert!(matches!(err, DataLayerError::MissingField { field: "event" }));

            let raw = json!({"type": "PageLoad", "event": "view", "page": value});
            let err = DataLayerEntry::parse(&raw).unwrap_err();
            assert!(matches!(err, DataLayerError::MissingPageContext { .. }));
        }
    }

    #[test]
    fn test_type_is_classified_before_event_shape() {
        let err = DataLayerEntry::parse(&json!({"type": "Bogus", "event": 5})).unwrap_err();
        match err {
            DataLayerError::UnknownType { event_type } => assert_eq!(event_type, "Bogus"),
            other => panic!("expected UnknownType, got {:?}", other),
        }
    }

    #[test]
    fn test_odd_shapes_are_coerced() {
        let raw = json!({"type": "Other", "event": 5, "linkName": 42, "data": "abc"});
        match DataLayerEntry::parse(&raw).unwrap() {
            DataLayerEntry::Other(o) => {
                assert_eq!(o.event, "5");
                assert_eq!(o.link_name.as_deref(), Some("42"));
                assert!(o.data.is_empty());
            }
            other => panic!("expected Other, got {:?}", other),
        }

        let raw = json!({"type": "PageLoad", "event": "view", "page": "Home", "data": [1]});
        match DataLayerEntry::parse(&raw).unwrap() {
            DataLayerEntry::PageLoad(pl) => {
                assert!(pl.page.is_empty());
                assert!(pl.data.is_empty());
            }
            other => panic!("expected PageLoad, got {:?}", other),
        }
    }

    #[test]
    fn test_raw_event_name() {
        assert_eq!(raw_event_name(&json!({"event": "view"})), Some("view"));
        assert_eq!(raw_event_name(&json!({"event": ""})), None);
        assert_eq!(raw_event_name(&json!(3)), None);
    }
}

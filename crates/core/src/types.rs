use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Free-form attribute object carried in `page` and `data`.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Declared type of a queue entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EntryType {
    PageLoad,
    Other,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::PageLoad => "PageLoad",
            EntryType::Other => "Other",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PageLoad" => Ok(EntryType::PageLoad),
            "Other" => Ok(EntryType::Other),
            other => Err(other.to_string()),
        }
    }
}

/// State carried forward from the most recent page load.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Context {
    #[serde(default)]
    pub page: Attributes,
}

impl Context {
    pub fn with_page(page: Attributes) -> Self {
        Self { page }
    }
}

/// Sink-ready payload produced for every accepted queue entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NormalizedEvent {
    #[serde(rename = "linkName", default, skip_serializing_if = "Option::is_none")]
    pub link_name: Option<String>,
    pub page: Attributes,
    pub data: Attributes,
}

/// One recorded invocation of a tracking sink.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackingCall {
    pub name: String,
    pub payload: NormalizedEvent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_type_parsing_is_exact() {
        assert_eq!("PageLoad".parse::<EntryType>(), Ok(EntryType::PageLoad));
        assert_eq!("Other".parse::<EntryType>(), Ok(EntryType::Other));
        assert_eq!("pageload".parse::<EntryType>(), Err("pageload".to_string()));
        assert_eq!(EntryType::PageLoad.to_string(), "PageLoad");
    }

    #[test]
    fn test_normalized_event_wire_shape() {
        let mut page = Attributes::new();
        page.insert("name".into(), json!("Home"));
        let mut data = Attributes::new();
        data.insert("x".into(), json!(1));

        let other = NormalizedEvent {
            link_name: Some("UnknownLinkName".into()),
            page: page.clone(),
            data: data.clone(),
        };
        assert_eq!(
            serde_json::to_value(&other).unwrap(),
            json!({"page": {"name": "Home"}, "data": {"x": 1}, "linkName": "UnknownLinkName"})
        );

        let page_load = NormalizedEvent {
            link_name: None,
            page,
            data,
        };
        let value = serde_json::to_value(&page_load).unwrap();
        assert!(value.get("linkName").is_none());
        assert_eq!(value, json!({"page": {"name": "Home"}, "data": {"x": 1}}));
    }

    #[test]
    fn test_default_context_is_empty() {
        let ctx = Context::default();
        assert!(ctx.page.is_empty());
        assert_eq!(serde_json::to_value(&ctx).unwrap(), json!({"page": {}}));
    }
}

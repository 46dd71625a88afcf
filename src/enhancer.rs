//! The relayed OpenAPI document and the metadata overlay applied to it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::config::ServiceConfig;

pub const API_TITLE: &str = "Pica Loco API";
pub const API_DESCRIPTION: &str =
    "Auto-generated API documentation for the Pica Loco mobile app backend";
pub const API_VERSION: &str = "1.0.0";
pub const CONTACT_NAME: &str = "Pica Loco Development Team";
pub const CONTACT_URL: &str = "https://github.com/your-username/trainpixelfolio";
pub const SERVER_DESCRIPTION: &str = "Pica Loco API Server";

/// An API description as a JSON object. Contents are passed through untouched
/// apart from what [`enhance`] overlays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecDocument(Map<String, Value>);

impl SpecDocument {
    /// Accepts only JSON objects.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn info(&self) -> Option<&Map<String, Value>> {
        self.0.get("info").and_then(Value::as_object)
    }

    pub fn servers(&self) -> &[Value] {
        self.0
            .get("servers")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn path_count(&self) -> usize {
        self.0
            .get("paths")
            .and_then(Value::as_object)
            .map_or(0, Map::len)
    }

    pub fn title(&self) -> Option<&str> {
        self.info()?.get("title")?.as_str()
    }
}

/// Overlays the fixed title, description, version and contact onto `raw.info`
/// and replaces `servers` with the backend REST root. Other `info` fields are kept.
pub fn enhance(raw: &SpecDocument, config: &ServiceConfig) -> SpecDocument {
    let mut fields = raw.0.clone();

    let mut info = raw.info().cloned().unwrap_or_default();
    info.insert("title".into(), json!(API_TITLE));
    info.insert("description".into(), json!(API_DESCRIPTION));
    info.insert("version".into(), json!(API_VERSION));
    info.insert(
        "contact".into(),
        json!({ "name": CONTACT_NAME, "url": CONTACT_URL }),
    );
    fields.insert("info".into(), Value::Object(info));

    fields.insert(
        "servers".into(),
        json!([{ "url": config.rest_url(), "description": SERVER_DESCRIPTION }]),
    );

    SpecDocument(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ServiceConfig {
        ServiceConfig::new(Some("https://demo.supabase.co"), Some("anon")).unwrap()
    }

    fn doc(value: Value) -> SpecDocument {
        SpecDocument::from_value(value).unwrap()
    }

    #[test]
    fn test_overlay_wins_and_keeps_other_fields() {
        let raw = doc(json!({
            "swagger": "2.0",
            "info": {
                "title": "standard public schema",
                "version": "12.2.3",
                "description": "PostgREST",
                "contact": { "email": "nobody@example.com" },
                "x-logo": "logo.png"
            },
            "paths": { "/todos": {} }
        }));

        let enhanced = enhance(&raw, &config());
        let info = enhanced.info().unwrap();

        assert_eq!(info["title"], API_TITLE);
        assert_eq!(info["description"], API_DESCRIPTION);
        assert_eq!(info["version"], API_VERSION);
        assert_eq!(info["contact"], json!({ "name": CONTACT_NAME, "url": CONTACT_URL }));
        assert_eq!(info["x-logo"], "logo.png");
        assert_eq!(enhanced.get("swagger"), Some(&json!("2.0")));
        assert_eq!(enhanced.path_count(), 1);
    }

    #[test]
    fn test_servers_replaced_with_single_entry() {
        let raw = doc(json!({
            "paths": {},
            "servers": [{ "url": "http://a" }, { "url": "http://b" }]
        }));

        let enhanced = enhance(&raw, &config());
        let servers = enhanced.servers();

        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0]["url"], "https://demo.supabase.co/rest/v1");
    }

    #[test]
    fn test_missing_or_malformed_info_is_replaced() {
        for raw in [doc(json!({ "paths": {} })), doc(json!({ "info": "oops" }))] {
            let enhanced = enhance(&raw, &config());
            assert_eq!(enhanced.title(), Some(API_TITLE));
            assert_eq!(enhanced.info().unwrap().len(), 4);
        }
    }

    #[test]
    fn test_input_untouched_and_idempotent() {
        let raw = doc(json!({ "info": { "title": "original" }, "paths": {} }));
        let before = raw.clone();

        let first = enhance(&raw, &config());
        let second = enhance(&raw, &config());

        assert_eq!(raw, before);
        assert_eq!(first, second);
        assert_eq!(enhance(&first, &config()), first);
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(SpecDocument::from_value(json!([1, 2])).is_none());
        assert!(SpecDocument::from_value(json!("text")).is_none());
        assert!(SpecDocument::from_value(json!({})).is_some());
    }
}

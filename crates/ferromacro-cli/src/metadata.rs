use std::fmt::{Display, Formatter};

use ferromacro_core::DateWindow;
use serde::Serialize;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

pub const SCHEMA_VERSION: &str = "v1.0.0";

/// Request identifier (UUID v4), one per emitted envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvelopeMeta {
    pub request_id: RequestId,
    pub schema_version: &'static str,
    pub generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<DateWindow>,
    pub cache_hit: bool,
    pub latency_ms: u64,
    pub warnings: Vec<String>,
}

impl EnvelopeMeta {
    pub fn new(window: Option<DateWindow>, latency_ms: u64, cache_hit: bool) -> Self {
        let generated_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"));
        Self {
            request_id: RequestId::new_v4(),
            schema_version: SCHEMA_VERSION,
            generated_at,
            window,
            cache_hit,
            latency_ms,
            warnings: Vec::new(),
        }
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}

/// Output wrapper for every JSON response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub meta: EnvelopeMeta,
    pub data: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_ids_are_unique_hyphenated_uuids() {
        let first = RequestId::new_v4().to_string();
        let second = RequestId::new_v4().to_string();
        assert_ne!(first, second);
        assert_eq!(first.len(), 36);
        assert_eq!(first.matches('-').count(), 4);
    }

    #[test]
    fn envelope_serializes_meta_then_data() {
        let window = DateWindow::parse("2020-01-01", "2020-12-31").expect("valid");
        let mut meta = EnvelopeMeta::new(Some(window), 12, true);
        meta.push_warning("column 'VIX' has no values in the window");
        let envelope = Envelope {
            meta,
            data: json!({"rows": 3}),
        };

        let value = serde_json::to_value(&envelope).expect("serializes");
        assert_eq!(value["meta"]["schema_version"], "v1.0.0");
        assert_eq!(value["meta"]["window"]["start"], "2020-01-01");
        assert_eq!(value["meta"]["cache_hit"], true);
        assert_eq!(value["meta"]["latency_ms"], 12);
        assert_eq!(value["meta"]["warnings"].as_array().map(Vec::len), Some(1));
        assert_eq!(value["data"]["rows"], 3);
    }

    #[test]
    fn window_is_omitted_for_static_commands() {
        let envelope = Envelope {
            meta: EnvelopeMeta::new(None, 0, false),
            data: Value::Null,
        };
        let value = serde_json::to_value(&envelope).expect("serializes");
        assert!(value["meta"].get("window").is_none());
        assert!(value["meta"]["generated_at"]
            .as_str()
            .is_some_and(|ts| ts.ends_with('Z')));
    }
}

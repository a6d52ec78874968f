//! Timestamp fields
//!
//! Accepted text form: `YYYY-MM-DDTHH:MM:SS` with an optional `.ffffff`
//! fraction. Exports drop the fraction when it is zero.

use chrono::{NaiveDateTime, Timelike};
use serde_json::{json, Value as JsonValue};

use crate::schema::field::FieldKind;
use crate::schema::types::Value;

const ISO8601_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parses an ISO-8601 timestamp.
pub fn iso8601_to_date(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), ISO8601_FORMAT).ok()
}

/// Formats a timestamp as ISO-8601.
pub fn date_to_iso8601(dt: &NaiveDateTime) -> String {
    if dt.nanosecond() == 0 {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

/// A timestamp field.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeField;

impl DateTimeField {
    pub fn new() -> Self {
        Self
    }
}

impl FieldKind for DateTimeField {
    fn type_name(&self) -> &'static str {
        "string"
    }

    fn native_from_raw(&self, raw: Value) -> Value {
        if let Value::String(s) = &raw {
            if let Some(dt) = iso8601_to_date(s) {
                return Value::DateTime(dt);
            }
        }
        raw
    }

    /// Empty values are ignored and keep the current timestamp.
    fn assign(&self, raw: Value) -> Option<Value> {
        if !raw.is_truthy() {
            return None;
        }
        Some(self.native_from_raw(raw))
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        match value {
            Value::DateTime(_) => Ok(()),
            _ => Err("not a datetime".into()),
        }
    }

    fn export_wire(&self, value: &Value) -> JsonValue {
        match value {
            Value::DateTime(dt) => json!(date_to_iso8601(dt)),
            other => other.to_json(),
        }
    }

    fn jsonschema_keywords(&self, out: &mut serde_json::Map<String, JsonValue>) {
        out.insert("format".into(), json!("date-time"));
    }
}

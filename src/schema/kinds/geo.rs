//! Geographic point fields

use serde_json::{json, Value as JsonValue};

use crate::schema::field::FieldKind;
use crate::schema::types::Value;

/// A two-dimensional point, stored as `[x, y]` or a two-entry mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoPointField;

impl GeoPointField {
    pub fn new() -> Self {
        Self
    }
}

fn is_number(value: &Value) -> bool {
    matches!(value, Value::Int(_) | Value::Float(_))
}

impl FieldKind for GeoPointField {
    fn type_name(&self) -> &'static str {
        "array"
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        let numeric = match value {
            Value::List(items) if items.len() == 2 => items.iter().all(is_number),
            Value::Map(map) if map.len() == 2 => map.values().all(is_number),
            Value::List(_) | Value::Map(_) => {
                return Err("value must be a two-dimensional point".into());
            }
            _ => {
                return Err("geo point must be a list of (x, y) or a mapping of two values".into());
            }
        };
        if !numeric {
            return Err("both values in point must be float or int".into());
        }
        Ok(())
    }

    fn jsonschema_keywords(&self, out: &mut serde_json::Map<String, JsonValue>) {
        out.insert("items".into(), json!({"type": "number"}));
        out.insert("minItems".into(), json!(2));
        out.insert("maxItems".into(), json!(2));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_and_mapping_points() {
        assert!(GeoPointField.validate(&Value::from(json!([1.5, 2]))).is_ok());
        assert!(GeoPointField.validate(&Value::from(json!({"lat": 1, "lng": 2.0}))).is_ok());
    }

    #[test]
    fn test_rejects_bad_points() {
        assert_eq!(
            GeoPointField.validate(&Value::from(json!([1, 2, 3]))),
            Err("value must be a two-dimensional point".into())
        );
        assert_eq!(
            GeoPointField.validate(&Value::from(json!([1, "x"]))),
            Err("both values in point must be float or int".into())
        );
        assert!(GeoPointField.validate(&Value::from("1,2")).is_err());
    }
}

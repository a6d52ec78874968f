//! Fixed-point decimal fields
//!
//! Values are held as `rust_decimal::Decimal` and leave the system as
//! decimal strings so no precision is lost in the JSON codec.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Value as JsonValue};

use crate::schema::field::FieldKind;
use crate::schema::types::Value;

/// Converts a value into a decimal, if possible.
pub fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Decimal(d) => Some(*d),
        Value::Int(i) => Some(Decimal::from(*i)),
        Value::Float(f) if f.is_finite() => parse_decimal(&f.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// A bounded fixed-point decimal field.
#[derive(Debug, Clone, Default)]
pub struct DecimalField {
    min_value: Option<Decimal>,
    max_value: Option<Decimal>,
}

impl DecimalField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_value(mut self, min: impl Into<Decimal>) -> Self {
        self.min_value = Some(min.into());
        self
    }

    pub fn max_value(mut self, max: impl Into<Decimal>) -> Self {
        self.max_value = Some(max.into());
        self
    }
}

impl FieldKind for DecimalField {
    fn type_name(&self) -> &'static str {
        "number"
    }

    fn native_from_raw(&self, raw: Value) -> Value {
        match to_decimal(&raw) {
            Some(d) => Value::Decimal(d),
            None => raw,
        }
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        let number = to_decimal(value).ok_or_else(|| "could not convert to decimal".to_string())?;

        if let Some(min) = self.min_value {
            if number < min {
                return Err(format!("Decimal value below min_value: {}", min));
            }
        }
        if let Some(max) = self.max_value {
            if number > max {
                return Err(format!("Decimal value above max_value: {}", max));
            }
        }
        Ok(())
    }

    fn export_native(&self, value: &Value) -> Value {
        to_decimal(value)
            .map(Value::Decimal)
            .unwrap_or_else(|| value.clone())
    }

    fn jsonschema_keywords(&self, out: &mut serde_json::Map<String, JsonValue>) {
        if let Some(max) = self.max_value.and_then(|d| d.to_f64()) {
            out.insert("maximum".into(), json!(max));
        }
        if let Some(min) = self.min_value.and_then(|d| d.to_f64()) {
            out.insert("minimum".into(), json!(min));
        }
    }
}

//! Numeric fields

use serde_json::{json, Value as JsonValue};

use crate::schema::field::FieldKind;
use crate::schema::types::Value;

/// Number class a field converts its values into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberType {
    Int,
    Float,
}

impl NumberType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberType::Int => "Int",
            NumberType::Float => "Float",
        }
    }

    /// Converts a value into this number class, if possible.
    pub fn convert(&self, value: &Value) -> Option<Value> {
        match self {
            NumberType::Int => match value {
                Value::Int(i) => Some(Value::Int(*i)),
                Value::Float(f) if f.is_finite() => Some(Value::Int(f.trunc() as i64)),
                Value::Bool(b) => Some(Value::Int(i64::from(*b))),
                Value::String(s) => s.trim().parse::<i64>().ok().map(Value::Int),
                _ => None,
            },
            NumberType::Float => match value {
                Value::Int(i) => Some(Value::Float(*i as f64)),
                Value::Float(f) => Some(Value::Float(*f)),
                Value::Bool(b) => Some(Value::Float(if *b { 1.0 } else { 0.0 })),
                Value::String(s) => s.trim().parse::<f64>().ok().map(Value::Float),
                _ => None,
            },
        }
    }
}

/// A bounded integer or float field.
#[derive(Debug, Clone)]
pub struct NumberField {
    number_type: NumberType,
    min_value: Option<f64>,
    max_value: Option<f64>,
}

impl NumberField {
    pub fn int() -> Self {
        Self {
            number_type: NumberType::Int,
            min_value: None,
            max_value: None,
        }
    }

    pub fn float() -> Self {
        Self {
            number_type: NumberType::Float,
            min_value: None,
            max_value: None,
        }
    }

    pub fn min_value(mut self, min: impl Into<f64>) -> Self {
        self.min_value = Some(min.into());
        self
    }

    pub fn max_value(mut self, max: impl Into<f64>) -> Self {
        self.max_value = Some(max.into());
        self
    }

    pub fn number_type(&self) -> NumberType {
        self.number_type
    }

    fn bound_json(&self, bound: f64) -> JsonValue {
        match self.number_type {
            NumberType::Int if bound.fract() == 0.0 => json!(bound as i64),
            _ => json!(bound),
        }
    }
}

impl FieldKind for NumberField {
    fn type_name(&self) -> &'static str {
        match self.number_type {
            NumberType::Int => "integer",
            NumberType::Float => "number",
        }
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        let kind = self.number_type.as_str();
        let number = self
            .number_type
            .convert(value)
            .and_then(|v| v.as_f64())
            .ok_or_else(|| format!("not {}", kind))?;

        if let Some(min) = self.min_value {
            if number < min {
                return Err(format!("{} value below min_value: {}", kind, min));
            }
        }
        if let Some(max) = self.max_value {
            if number > max {
                return Err(format!("{} value above max_value: {}", kind, max));
            }
        }
        Ok(())
    }

    fn export_native(&self, value: &Value) -> Value {
        self.number_type
            .convert(value)
            .unwrap_or_else(|| value.clone())
    }

    fn jsonschema_keywords(&self, out: &mut serde_json::Map<String, JsonValue>) {
        if let Some(max) = self.max_value {
            out.insert("maximum".into(), self.bound_json(max));
        }
        if let Some(min) = self.min_value {
            out.insert("minimum".into(), self.bound_json(min));
        }
    }
}

//! Text fields: plain strings, email addresses and URLs

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Value as JsonValue};

use crate::schema::errors::{ShieldError, ShieldResult};
use crate::schema::field::FieldKind;
use crate::schema::types::Value;

const EMAIL_PATTERN: &str = r"(?i)^[-!#$%&'*+/=?^_`{}|~0-9A-Z]+(\.[-!#$%&'*+/=?^_`{}|~0-9A-Z]+)*@(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+[A-Z]{2,6}\.?$";

const URL_PATTERN: &str = r"(?i)^https?://(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+[A-Z]{2,6}\.?|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?::\d+)?(?:/?|[/?]\S+)$";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(URL_PATTERN).expect("url pattern compiles"))
}

/// Well-known string formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    Email,
    Url,
}

impl StringFormat {
    fn as_str(&self) -> &'static str {
        match self {
            StringFormat::Email => "email",
            StringFormat::Url => "url",
        }
    }
}

/// A unicode string field.
#[derive(Debug, Clone, Default)]
pub struct StringField {
    max_length: Option<usize>,
    min_length: Option<usize>,
    regex: Option<Regex>,
    format: Option<StringFormat>,
}

impl StringField {
    pub fn new() -> Self {
        Self::default()
    }

    /// String that must look like an email address
    pub fn email() -> Self {
        Self {
            format: Some(StringFormat::Email),
            ..Self::default()
        }
    }

    /// String that must look like an http(s) URL
    pub fn url() -> Self {
        Self {
            format: Some(StringFormat::Url),
            ..Self::default()
        }
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Pattern the value must match from its start.
    ///
    /// An invalid pattern is a schema declaration error.
    pub fn regex(mut self, pattern: &str) -> ShieldResult<Self> {
        let anchored = if pattern.starts_with('^') {
            pattern.to_string()
        } else {
            format!("^(?:{})", pattern)
        };
        let re = Regex::new(&anchored).map_err(|e| {
            ShieldError::configuration(format!("invalid regex '{}': {}", pattern, e))
        })?;
        self.regex = Some(re);
        Ok(self)
    }
}

impl FieldKind for StringField {
    fn type_name(&self) -> &'static str {
        "string"
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        let s = value.as_str().ok_or_else(|| "not a string".to_string())?;

        match self.format {
            Some(StringFormat::Email) if !email_regex().is_match(s) => {
                return Err("invalid email address".into());
            }
            Some(StringFormat::Url) if !url_regex().is_match(s) => {
                return Err("invalid URL".into());
            }
            _ => {}
        }

        let len = s.chars().count();
        if let Some(max) = self.max_length {
            if len > max {
                return Err("string value is too long".into());
            }
        }
        if let Some(min) = self.min_length {
            if len < min {
                return Err("string value is too short".into());
            }
        }
        if let Some(re) = &self.regex {
            if !re.is_match(s) {
                return Err("string value did not match validation regex".into());
            }
        }
        Ok(())
    }

    fn export_native(&self, value: &Value) -> Value {
        match value {
            Value::String(_) | Value::Null => value.clone(),
            other => Value::String(other.to_string()),
        }
    }

    fn jsonschema_keywords(&self, out: &mut serde_json::Map<String, JsonValue>) {
        if let Some(max) = self.max_length {
            out.insert("maxLength".into(), json!(max));
        }
        if let Some(min) = self.min_length {
            out.insert("minLength".into(), json!(min));
        }
        if let Some(re) = &self.regex {
            out.insert("pattern".into(), json!(re.as_str()));
        }
        if let Some(format) = self.format {
            out.insert("format".into(), json!(format.as_str()));
        }
    }
}

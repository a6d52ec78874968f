//! Hex digest fields

use serde_json::{json, Value as JsonValue};

use crate::schema::field::FieldKind;
use crate::schema::types::Value;

/// Digest algorithm a hash field expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
}

impl HashAlgorithm {
    pub fn hex_length(&self) -> usize {
        match self {
            HashAlgorithm::Md5 => 32,
            HashAlgorithm::Sha1 => 40,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "MD5",
            HashAlgorithm::Sha1 => "SHA1",
        }
    }
}

/// A field that must resemble a hex digest.
#[derive(Debug, Clone, Copy)]
pub struct HashField {
    algorithm: HashAlgorithm,
}

impl HashField {
    pub fn md5() -> Self {
        Self {
            algorithm: HashAlgorithm::Md5,
        }
    }

    pub fn sha1() -> Self {
        Self {
            algorithm: HashAlgorithm::Sha1,
        }
    }
}

impl FieldKind for HashField {
    fn type_name(&self) -> &'static str {
        "string"
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        let label = self.algorithm.label();
        let s = value
            .as_str()
            .ok_or_else(|| format!("{} value is not a string", label))?;
        if s.len() != self.algorithm.hex_length() {
            return Err(format!("{} value is wrong length", label));
        }
        if !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("{} value is not hex", label));
        }
        Ok(())
    }

    fn jsonschema_keywords(&self, out: &mut serde_json::Map<String, JsonValue>) {
        let len = self.algorithm.hex_length();
        out.insert("maxLength".into(), json!(len));
        out.insert("minLength".into(), json!(len));
    }
}

//! Option structs shared by the validation engine and the schema composer

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::schema::{ShieldError, ShieldResult};

/// Validation engine options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Collect every failure instead of stopping at the first (default: false)
    #[serde(default)]
    pub aggregate_errors: bool,

    /// Remove undeclared keys from the input mapping (default: true)
    #[serde(default = "default_strip_unknown_fields")]
    pub strip_unknown_fields: bool,
}

fn default_strip_unknown_fields() -> bool {
    true
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            aggregate_errors: false,
            strip_unknown_fields: default_strip_unknown_fields(),
        }
    }
}

impl ValidationOptions {
    /// Load options from a JSON file
    pub fn load(path: &Path) -> ShieldResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ShieldError::Config(format!("Failed to read options: {}", e)))?;
        Self::from_json_str(&content)
    }

    /// Parse options from JSON text
    pub fn from_json_str(content: &str) -> ShieldResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| ShieldError::Config(format!("Invalid options JSON: {}", e)))
    }
}

/// Collection metadata of a top-level schema.
///
/// Only consumed by persistence layers; the engine carries it as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMeta {
    /// Collection name (default: lowercased type name)
    pub collection: String,

    /// Document count cap
    #[serde(default)]
    pub max_documents: Option<u64>,

    /// Size cap in bytes
    #[serde(default)]
    pub max_size: Option<u64>,
}

impl CollectionMeta {
    pub fn named(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            max_documents: None,
            max_size: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let options = ValidationOptions::default();
        assert!(!options.aggregate_errors);
        assert!(options.strip_unknown_fields);
        assert_eq!(ValidationOptions::from_json_str("{}").unwrap(), options);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"aggregate_errors": true, "strip_unknown_fields": false}}"#).unwrap();

        let options = ValidationOptions::load(file.path()).unwrap();
        assert!(options.aggregate_errors);
        assert!(!options.strip_unknown_fields);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ValidationOptions::load(&dir.path().join("missing.json")).unwrap_err();
        assert_eq!(err.code(), "SHIELD_CONFIG");
    }

    #[test]
    fn test_invalid_json() {
        let err = ValidationOptions::from_json_str("{aggregate").unwrap_err();
        assert!(matches!(err, ShieldError::Config(_)));
    }

    #[test]
    fn test_collection_meta_deserialize() {
        let meta: CollectionMeta =
            serde_json::from_str(r#"{"collection": "media", "max_documents": 10}"#).unwrap();
        assert_eq!(meta.collection, "media");
        assert_eq!(meta.max_documents, Some(10));
        assert_eq!(meta.max_size, None);
    }
}

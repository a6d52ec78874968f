//! Error types for schema composition, validation and lookup
//!
//! Error codes:
//! - SHIELD_CONFIGURATION (schema declaration is broken)
//! - SHIELD_FIELD_INVALID (single field rejected)
//! - SHIELD_DOCUMENT_INVALID (document-level check rejected)
//! - SHIELD_VIOLATIONS (aggregated validation failures)
//! - SHIELD_UNKNOWN_FIELD / SHIELD_UNKNOWN_SCHEMA (lookup failures)
//! - SHIELD_CONFIG (options file could not be loaded)

use thiserror::Error;

use super::types::Value;

/// Result type for schema operations
pub type ShieldResult<T> = Result<T, ShieldError>;

/// Errors raised by the schema engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShieldError {
    // ==================
    // Declaration Errors
    // ==================
    /// Malformed schema declaration. Never recovered from.
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ==================
    // Validation Errors
    // ==================
    /// A single field failed its kind, choices or custom validator
    #[error("{reason} - {field}:{value}")]
    FieldInvalid {
        reason: String,
        field: String,
        value: Value,
    },

    /// A document-level check failed
    #[error("{reason} - {field}:{value}")]
    DocumentInvalid {
        reason: String,
        field: String,
        value: Value,
    },

    /// Several failures collected by an aggregating validation pass
    #[error("Document invalid: {} violation(s)", .0.len())]
    Violations(Vec<ShieldError>),

    // ==================
    // Lookup Errors
    // ==================
    /// Field name not declared on the schema
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Discriminator not known to the registry
    #[error("Unknown schema: {0}")]
    UnknownSchema(String),

    // ==================
    // Options Errors
    // ==================
    /// Options file could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),
}

impl ShieldError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        ShieldError::Configuration(message.into())
    }

    /// Create a field-level validation error
    pub fn field_invalid(
        reason: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        ShieldError::FieldInvalid {
            reason: reason.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a document-level validation error
    pub fn document_invalid(
        reason: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        ShieldError::DocumentInvalid {
            reason: reason.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a required-field-missing error
    pub fn required_missing(field: impl Into<String>) -> Self {
        Self::document_invalid("required field missing", field, Value::Null)
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ShieldError::Configuration(_) => "SHIELD_CONFIGURATION",
            ShieldError::FieldInvalid { .. } => "SHIELD_FIELD_INVALID",
            ShieldError::DocumentInvalid { .. } => "SHIELD_DOCUMENT_INVALID",
            ShieldError::Violations(_) => "SHIELD_VIOLATIONS",
            ShieldError::UnknownField(_) => "SHIELD_UNKNOWN_FIELD",
            ShieldError::UnknownSchema(_) => "SHIELD_UNKNOWN_SCHEMA",
            ShieldError::Config(_) => "SHIELD_CONFIG",
        }
    }

    /// Whether the error means "reject this document"
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ShieldError::FieldInvalid { .. }
                | ShieldError::DocumentInvalid { .. }
                | ShieldError::Violations(_)
        )
    }

    /// Reason text for field and document failures
    pub fn reason(&self) -> Option<&str> {
        match self {
            ShieldError::FieldInvalid { reason, .. }
            | ShieldError::DocumentInvalid { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Field name for field and document failures
    pub fn field(&self) -> Option<&str> {
        match self {
            ShieldError::FieldInvalid { field, .. }
            | ShieldError::DocumentInvalid { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ShieldError::configuration("x").code(), "SHIELD_CONFIGURATION");
        assert_eq!(
            ShieldError::field_invalid("bad", "age", 3).code(),
            "SHIELD_FIELD_INVALID"
        );
        assert_eq!(ShieldError::required_missing("name").code(), "SHIELD_DOCUMENT_INVALID");
        assert_eq!(ShieldError::Violations(vec![]).code(), "SHIELD_VIOLATIONS");
        assert_eq!(ShieldError::UnknownField("x".into()).code(), "SHIELD_UNKNOWN_FIELD");
    }

    #[test]
    fn test_display_includes_reason_field_and_value() {
        let err = ShieldError::field_invalid("not a valid UUID", "owner", "abc");
        let display = format!("{}", err);
        assert!(display.contains("not a valid UUID"));
        assert!(display.contains("owner"));
        assert!(display.contains("abc"));
    }

    #[test]
    fn test_validation_classification() {
        assert!(ShieldError::required_missing("name").is_validation());
        assert!(ShieldError::Violations(vec![]).is_validation());
        assert!(!ShieldError::configuration("broken").is_validation());
        assert!(!ShieldError::UnknownField("x".into()).is_validation());
    }

    #[test]
    fn test_reason_and_field_accessors() {
        let err = ShieldError::required_missing("name");
        assert_eq!(err.reason(), Some("required field missing"));
        assert_eq!(err.field(), Some("name"));
        assert_eq!(ShieldError::configuration("x").reason(), None);
    }
}

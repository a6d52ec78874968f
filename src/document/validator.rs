//! Validation of candidate mappings against a schema
//!
//! Two scopes share one pass:
//! - full: required fields plus every supplied field
//! - partial: supplied fields only (PATCH-style updates)
//!
//! Input keys are field names. The synthesized `id` field is the exception
//! and is keyed by `_id`; a declared identity field such as `email` is
//! supplied and checked under its own name. Null and whitespace-only values
//! count as not supplied.
//!
//! Stripping removes undeclared keys from the caller's mapping in place and
//! reports them in `ValidationReport::stripped`.

use std::collections::BTreeSet;

use tracing::debug;

use crate::config::ValidationOptions;
use crate::schema::{
    Field, Mapping, Schema, ShieldError, ShieldResult, DEFAULT_ID_FIELD, ID_KEY,
};

/// Fields in scope for a validation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Full,
    Partial,
}

impl Scope {
    fn should_check(&self, field: &Field, supplied: bool) -> bool {
        match self {
            Scope::Full => field.is_required() || supplied,
            Scope::Partial => supplied,
        }
    }
}

/// Outcome of a validation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    /// Failures collected in aggregate mode, in field order
    pub errors: Vec<ShieldError>,
    /// Undeclared keys removed from the input
    pub stripped: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Turns collected failures into a single error.
    ///
    /// Returns the stripped keys when there were no failures.
    pub fn into_result(self) -> ShieldResult<Vec<String>> {
        if self.errors.is_empty() {
            Ok(self.stripped)
        } else {
            Err(ShieldError::Violations(self.errors))
        }
    }
}

/// Validation engine bound to one schema.
///
/// Validation is deterministic: fields are visited in name order.
pub struct Validator<'a> {
    schema: &'a Schema,
    options: ValidationOptions,
}

impl<'a> Validator<'a> {
    /// Creates a validator with default options (fail-fast, stripping on).
    pub fn new(schema: &'a Schema) -> Self {
        Self::with_options(schema, ValidationOptions::default())
    }

    pub fn with_options(schema: &'a Schema, options: ValidationOptions) -> Self {
        Self { schema, options }
    }

    pub fn aggregate_errors(mut self, aggregate: bool) -> Self {
        self.options.aggregate_errors = aggregate;
        self
    }

    pub fn strip_unknown_fields(mut self, strip: bool) -> Self {
        self.options.strip_unknown_fields = strip;
        self
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Validates `values` as a candidate complete document.
    ///
    /// # Errors
    ///
    /// In fail-fast mode, returns the first failure. Aggregate mode never
    /// fails; failures are listed in the report.
    pub fn full(&self, values: &mut Mapping) -> ShieldResult<ValidationReport> {
        self.run(Scope::Full, values)
    }

    /// Validates only the fields present in `values`.
    pub fn partial(&self, values: &mut Mapping) -> ShieldResult<ValidationReport> {
        self.run(Scope::Partial, values)
    }

    fn run(&self, scope: Scope, values: &mut Mapping) -> ShieldResult<ValidationReport> {
        let internal = self.schema.internal_fields();
        let mut report = ValidationReport::default();
        let mut declared: BTreeSet<&str> = BTreeSet::new();

        for (name, field) in self.schema.fields() {
            let key = input_key(name, field);
            declared.insert(key);

            let supplied = values.get(key);

            if let Some(raw) = supplied {
                if internal.contains(key) && !field.is_default(raw) {
                    let err = ShieldError::document_invalid(
                        "overwrite of internal fields attempted",
                        key,
                        raw.clone(),
                    );
                    self.record(err, &mut report)?;
                    continue;
                }
            }

            if !scope.should_check(field, supplied.is_some()) {
                continue;
            }

            let raw = match supplied {
                Some(raw) if !raw.is_blank() => raw,
                _ => {
                    if scope == Scope::Full && field.is_required() {
                        self.record(ShieldError::required_missing(name.as_str()), &mut report)?;
                    }
                    continue;
                }
            };

            let native = field.kind().native_from_raw(raw.clone());
            if let Err(err) = field.check(&native) {
                self.record(err, &mut report)?;
            }
        }

        if self.options.strip_unknown_fields {
            let rogue: Vec<String> = values
                .keys()
                .filter(|k| !declared.contains(k.as_str()))
                .cloned()
                .collect();
            for key in &rogue {
                values.remove(key);
            }
            if !rogue.is_empty() {
                debug!(
                    class_name = %self.schema.class_name(),
                    stripped = ?rogue,
                    "unknown fields stripped"
                );
            }
            report.stripped = rogue;
        }

        Ok(report)
    }

    fn record(&self, err: ShieldError, report: &mut ValidationReport) -> ShieldResult<()> {
        debug!(
            class_name = %self.schema.class_name(),
            code = err.code(),
            error = %err,
            "validation failure recorded"
        );
        if self.options.aggregate_errors {
            report.errors.push(err);
            Ok(())
        } else {
            Err(err)
        }
    }
}

/// Key a field is supplied under in validation input
fn input_key<'f>(name: &'f str, field: &Field) -> &'f str {
    if field.is_id_field() && name == DEFAULT_ID_FIELD {
        ID_KEY
    } else {
        name
    }
}

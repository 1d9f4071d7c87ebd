//! Step validation with detailed error reporting

use jsonschema::{validator_for, ValidationError as JsonSchemaError, Validator as JsonValidator};
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::core::{Portal, StepKey};
use crate::schema::registry::SchemaRegistry;
use crate::yaml::diagnostics::line_col_to_offset;

/// Anything able to check a step slice against that step's rules
///
/// The wizard controller only depends on this seam, so rules can be swapped
/// between the moment a step is captured and the final re-check.
pub trait StepValidator {
    /// Validate a slice, returning the accepted value or every field error
    fn validate_slice(
        &self,
        portal: Portal,
        step: StepKey,
        slice: &JsonValue,
    ) -> Result<JsonValue, StepErrors>;
}

/// A single field-level problem in a step slice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// JSON pointer of the offending field ("" for the slice itself)
    pub path: String,
    pub message: String,
    pub hint: String,
    pub help: Option<String>,
}

impl FieldError {
    /// Field name for inline display, "(form)" for slice-level errors
    pub fn field(&self) -> &str {
        let name = self.path.trim_start_matches('/');
        if name.is_empty() {
            "(form)"
        } else {
            name
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field(), self.message)
    }
}

/// All field errors of one step
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{} {} step has {} invalid field(s)", .portal, .step, .errors.len())]
pub struct StepErrors {
    pub portal: Portal,
    pub step: StepKey,
    pub errors: Vec<FieldError>,
}

impl StepErrors {
    pub fn new(portal: Portal, step: StepKey, errors: Vec<FieldError>) -> Self {
        Self { portal, step, errors }
    }

    /// Messages for one field, in report order
    pub fn messages_for(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field() == field)
            .map(|e| e.message.as_str())
            .collect()
    }
}

/// Validation error with source location information
#[derive(Debug, Error, Diagnostic)]
#[error("Step validation failed: {summary}")]
#[diagnostic(code(onboard::schema::validation_error))]
pub struct ValidationError {
    summary: String,

    #[source_code]
    src: NamedSource<String>,

    #[related]
    violations: Vec<SchemaViolation>,
}

/// A single schema violation
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct SchemaViolation {
    #[label("{}", self.hint)]
    span: SourceSpan,

    message: String,
    hint: String,

    #[help]
    help: Option<String>,
}

impl SchemaViolation {
    pub fn new(message: String, hint: String, span: SourceSpan, help: Option<String>) -> Self {
        Self {
            span,
            message,
            hint,
            help,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ValidationError {
    pub fn new(filename: &str, source: &str, violations: Vec<SchemaViolation>) -> Self {
        let count = violations.len();
        let summary = if count == 1 {
            "1 error".to_string()
        } else {
            format!("{} errors", count)
        };
        Self {
            summary,
            src: NamedSource::new(filename, source.to_string()),
            violations,
        }
    }

    /// Get the number of violations
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[SchemaViolation] {
        &self.violations
    }
}

/// A step schema that failed to compile
#[derive(Debug, Error)]
#[error("invalid schema for {portal} {step}: {message}")]
pub struct SchemaCompileError {
    pub portal: Portal,
    pub step: StepKey,
    pub message: String,
}

/// Schema validator with compiled step schemas
pub struct Validator {
    compiled: HashMap<(Portal, StepKey), JsonValidator>,
}

impl Validator {
    /// Create a new validator with schemas from the registry
    pub fn new(registry: &SchemaRegistry) -> Self {
        let mut compiled = HashMap::new();

        for (portal, step) in registry.keys() {
            let Some(schema_str) = registry.get(portal, step) else {
                continue;
            };
            match serde_json::from_str::<JsonValue>(schema_str) {
                Ok(schema_json) => match validator_for(&schema_json) {
                    Ok(v) => {
                        compiled.insert((portal, step), v);
                    }
                    Err(e) => tracing::warn!(%portal, %step, "schema does not compile: {}", e),
                },
                Err(e) => tracing::warn!(%portal, %step, "schema is not JSON: {}", e),
            }
        }

        Self { compiled }
    }

    pub fn has_schema(&self, portal: Portal, step: StepKey) -> bool {
        self.compiled.contains_key(&(portal, step))
    }

    /// Replace the rule set of one step
    pub fn override_schema(
        &mut self,
        portal: Portal,
        step: StepKey,
        schema: &JsonValue,
    ) -> Result<(), SchemaCompileError> {
        let compiled = validator_for(schema).map_err(|e| SchemaCompileError {
            portal,
            step,
            message: e.to_string(),
        })?;
        tracing::debug!(%portal, %step, "step schema overridden");
        self.compiled.insert((portal, step), compiled);
        Ok(())
    }

    /// Validate YAML or JSON text holding a single step slice
    ///
    /// Errors carry source spans pointing at the offending keys.
    pub fn validate_document(
        &self,
        content: &str,
        filename: &str,
        portal: Portal,
        step: StepKey,
    ) -> Result<JsonValue, ValidationError> {
        // YAML is a superset of JSON, one parser covers both
        let yaml_value: serde_yml::Value = match serde_yml::from_str(content) {
            Ok(v) => v,
            Err(e) => {
                let span = find_error_span(content, e.location());
                let violation = SchemaViolation::new(
                    format!("YAML parse error: {}", e),
                    "invalid YAML".to_string(),
                    span,
                    Some("Check YAML syntax - proper indentation, colons, quotes".to_string()),
                );
                return Err(ValidationError::new(filename, content, vec![violation]));
            }
        };

        let json_value: JsonValue = match serde_json::to_value(&yaml_value) {
            Ok(v) => v,
            Err(e) => {
                let violation = SchemaViolation::new(
                    format!("Failed to convert YAML to JSON: {}", e),
                    "conversion error".to_string(),
                    (0, content.len()).into(),
                    None,
                );
                return Err(ValidationError::new(filename, content, vec![violation]));
            }
        };

        let Some(schema) = self.compiled.get(&(portal, step)) else {
            let violation = SchemaViolation::new(
                format!("No schema for the {} step of the {} portal", step, portal),
                "unknown step".to_string(),
                first_line_span(content),
                None,
            );
            return Err(ValidationError::new(filename, content, vec![violation]));
        };

        let violations: Vec<SchemaViolation> = schema
            .iter_errors(&json_value)
            .map(|e| error_to_violation(content, &e))
            .collect();

        if violations.is_empty() {
            Ok(json_value)
        } else {
            Err(ValidationError::new(filename, content, violations))
        }
    }
}

impl StepValidator for Validator {
    fn validate_slice(
        &self,
        portal: Portal,
        step: StepKey,
        slice: &JsonValue,
    ) -> Result<JsonValue, StepErrors> {
        let Some(schema) = self.compiled.get(&(portal, step)) else {
            return Err(StepErrors::new(
                portal,
                step,
                vec![FieldError {
                    path: String::new(),
                    message: format!("No schema for the {} step of the {} portal", step, portal),
                    hint: "unknown step".to_string(),
                    help: None,
                }],
            ));
        };

        let errors: Vec<FieldError> = schema.iter_errors(slice).map(|e| error_to_field(&e)).collect();
        if errors.is_empty() {
            Ok(slice.clone())
        } else {
            Err(StepErrors::new(portal, step, errors))
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        let registry = SchemaRegistry::default();
        Self::new(&registry)
    }
}

/// Pointer to the field an error is about
///
/// `required` and `additionalProperties` report the parent object, so the
/// property name is appended to land on the field itself.
fn field_path(error: &JsonSchemaError) -> String {
    let base = error.instance_path.to_string();
    match &error.kind {
        jsonschema::error::ValidationErrorKind::Required { property } => {
            let prop = property.as_str().map(|s| s.to_string()).unwrap_or_else(|| property.to_string());
            format!("{}/{}", base, prop)
        }
        jsonschema::error::ValidationErrorKind::AdditionalProperties { unexpected } if unexpected.len() == 1 => {
            format!("{}/{}", base, unexpected[0])
        }
        _ => base,
    }
}

fn error_to_field(error: &JsonSchemaError) -> FieldError {
    FieldError {
        path: field_path(error),
        message: format_schema_error(error),
        hint: format_error_hint(error),
        help: generate_help_message(error),
    }
}

/// Convert a JSON Schema validation error to our violation format
fn error_to_violation(content: &str, error: &JsonSchemaError) -> SchemaViolation {
    let path = field_path(error);
    let span = find_path_span(content, &path);
    SchemaViolation::new(
        format_schema_error(error),
        format_error_hint(error),
        span,
        generate_help_message(error),
    )
}

/// Format a JSON Schema error into a user-friendly message
fn format_schema_error(error: &JsonSchemaError) -> String {
    let path = if error.instance_path.as_str().is_empty() {
        "form".to_string()
    } else {
        format!("'{}'", error.instance_path.as_str().trim_start_matches('/'))
    };

    match &error.kind {
        jsonschema::error::ValidationErrorKind::Required { property } => {
            let prop_str = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            format!("Missing required field: {}", prop_str)
        }
        jsonschema::error::ValidationErrorKind::Type { kind } => {
            format!("Wrong type at {}: expected {:?}", path, kind)
        }
        jsonschema::error::ValidationErrorKind::Enum { options } => {
            format!("Invalid value at {}: must be one of: {}", path, format_enum_options(options))
        }
        jsonschema::error::ValidationErrorKind::Constant { expected_value } => {
            if expected_value == &JsonValue::Bool(true) {
                format!("{} must be accepted", path)
            } else {
                format!("Invalid value at {}: must be {}", path, expected_value)
            }
        }
        jsonschema::error::ValidationErrorKind::Pattern { pattern } => {
            format!("Value at {} doesn't match pattern: {}", path, pattern)
        }
        jsonschema::error::ValidationErrorKind::MinLength { limit } => {
            format!("Value at {} is too short: minimum {} characters", path, limit)
        }
        jsonschema::error::ValidationErrorKind::MaxLength { limit } => {
            format!("Value at {} is too long: maximum {} characters", path, limit)
        }
        jsonschema::error::ValidationErrorKind::Minimum { limit } => {
            format!("Value at {} is too small: minimum {}", path, limit)
        }
        jsonschema::error::ValidationErrorKind::Maximum { limit } => {
            format!("Value at {} is too large: maximum {}", path, limit)
        }
        jsonschema::error::ValidationErrorKind::AdditionalProperties { unexpected } => {
            format!("Unknown field(s) in {}: {}", path, unexpected.join(", "))
        }
        _ => {
            format!("Validation error at {}: {}", path, error)
        }
    }
}

/// Format enum options as a string
fn format_enum_options(options: &JsonValue) -> String {
    if let Some(arr) = options.as_array() {
        arr.iter()
            .map(|v| v.as_str().map(|s| s.to_string()).unwrap_or_else(|| v.to_string()))
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        options.to_string()
    }
}

/// Generate a short hint for the error label
fn format_error_hint(error: &JsonSchemaError) -> String {
    match &error.kind {
        jsonschema::error::ValidationErrorKind::Required { .. } => "required field missing".to_string(),
        jsonschema::error::ValidationErrorKind::Type { .. } => "wrong type".to_string(),
        jsonschema::error::ValidationErrorKind::Enum { .. } => "invalid value".to_string(),
        jsonschema::error::ValidationErrorKind::Constant { .. } => "must be accepted".to_string(),
        jsonschema::error::ValidationErrorKind::Pattern { .. } => "pattern mismatch".to_string(),
        jsonschema::error::ValidationErrorKind::MinLength { .. } => "too short".to_string(),
        jsonschema::error::ValidationErrorKind::MaxLength { .. } => "too long".to_string(),
        jsonschema::error::ValidationErrorKind::Minimum { .. } => "too small".to_string(),
        jsonschema::error::ValidationErrorKind::Maximum { .. } => "too large".to_string(),
        jsonschema::error::ValidationErrorKind::AdditionalProperties { .. } => "unknown field".to_string(),
        _ => "validation error".to_string(),
    }
}

/// Generate a help message with suggestions for fixing the error
fn generate_help_message(error: &JsonSchemaError) -> Option<String> {
    match &error.kind {
        jsonschema::error::ValidationErrorKind::Required { property } => {
            let prop_str = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            Some(format!("Fill in the '{}' field", prop_str))
        }
        jsonschema::error::ValidationErrorKind::Enum { options } => {
            Some(format!("Valid values: {}", format_enum_options(options)))
        }
        jsonschema::error::ValidationErrorKind::Pattern { pattern } => {
            if pattern.contains('@') {
                Some("Use an address like name@example.com".to_string())
            } else if pattern.contains("[A-Z]{2}-") {
                Some("License format: region code, dash, digits, e.g. NY-204518".to_string())
            } else if pattern.contains("{8,15}") {
                Some("Phone format: optional +, then 8 to 15 digits".to_string())
            } else {
                None
            }
        }
        jsonschema::error::ValidationErrorKind::Type { kind } => {
            Some(format!("Expected value of type: {:?}", kind))
        }
        jsonschema::error::ValidationErrorKind::AdditionalProperties { unexpected } => {
            if unexpected.len() == 1 {
                Some(format!("Remove the '{}' field or check spelling", unexpected[0]))
            } else {
                Some("Remove unknown fields or check spelling".to_string())
            }
        }
        _ => None,
    }
}

fn first_line_span(content: &str) -> SourceSpan {
    let len = content.find('\n').unwrap_or(content.len()).max(1);
    (0, len).into()
}

/// Find the span (byte offset, length) for an error location
///
/// serde_yml columns count characters, so the offset is resolved per char.
fn find_error_span(content: &str, location: Option<serde_yml::Location>) -> SourceSpan {
    let Some(loc) = location else {
        return first_line_span(content);
    };

    let mut offset = line_col_to_offset(content, loc.line(), loc.column()).min(content.len());
    while !content.is_char_boundary(offset) {
        offset -= 1;
    }
    let rest_of_content = &content[offset..];
    let len = rest_of_content
        .find('\n')
        .unwrap_or(rest_of_content.len())
        .max(1);

    (offset, len).into()
}

/// Find the span for a JSON path in YAML content
fn find_path_span(content: &str, json_path: &str) -> SourceSpan {
    let parts: Vec<&str> = json_path.split('/').filter(|s| !s.is_empty()).collect();

    let Some(search_key) = parts.last() else {
        return first_line_span(content);
    };

    // Array index: point at the parent key
    if search_key.parse::<usize>().is_ok() && parts.len() >= 2 {
        if let Some(span) = find_key_span(content, parts[parts.len() - 2]) {
            return span;
        }
    }

    find_key_span(content, search_key).unwrap_or_else(|| first_line_span(content))
}

/// Find the span of a key in YAML content
fn find_key_span(content: &str, key: &str) -> Option<SourceSpan> {
    let candidates = [format!("{}:", key), format!("\"{}\":", key)];

    let mut offset = 0;
    for line in content.lines() {
        let trimmed = line.trim_start();
        if candidates.iter().any(|c| trimmed.starts_with(c.as_str())) {
            let indent = line.len() - trimmed.len();
            return Some((offset + indent, trimmed.len()).into());
        }
        offset += line.len() + 1;
    }
    None
}

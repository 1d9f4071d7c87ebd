//! Schema-driven interactive prompts for one wizard step
//!
//! Reads a step's JSON Schema and asks the user for each field. The
//! prompter only collects raw input; validation is left to the controller
//! so field errors are reported the same way in batch and interactive use.

use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Password, Select};
use miette::{IntoDiagnostic, Result};
use serde_json::{Map, Value};

use crate::core::labels::{display_label, LabelKind};
use crate::core::{Portal, StepKey};
use crate::schema::registry::SchemaRegistry;

/// Prompts for step slices using the embedded schemas
pub struct StepPrompter {
    registry: SchemaRegistry,
    theme: ColorfulTheme,
}

/// Field information extracted from schema
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub name: String,
    pub description: Option<String>,
    pub field_type: FieldType,
    pub required: bool,
    pub default: Option<Value>,
    /// Marked `writeOnly` in the schema; never echoed or displayed
    pub secret: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String { min_length: Option<u64>, max_length: Option<u64> },
    /// Fixed choices, optionally shown through a label table
    Enum { values: Vec<Value>, labels: Option<LabelKind> },
    Integer { minimum: Option<i64>, maximum: Option<i64> },
    Number { minimum: Option<f64> },
    Boolean,
}

impl StepPrompter {
    pub fn new() -> Self {
        Self {
            registry: SchemaRegistry::default(),
            theme: ColorfulTheme::default(),
        }
    }

    /// Fields of a step, in prompt order
    pub fn fields(&self, portal: Portal, step: StepKey) -> Result<Vec<FieldInfo>> {
        let schema_str = self
            .registry
            .get(portal, step)
            .ok_or_else(|| miette::miette!("No schema found for the {} step of the {} portal", step, portal))?;
        let schema: Value = serde_json::from_str(schema_str).into_diagnostic()?;
        Ok(extract_fields(&schema))
    }

    /// Names of every secret field across a portal's steps
    pub fn secret_fields(&self, portal: Portal) -> Vec<String> {
        StepKey::all()
            .iter()
            .filter_map(|step| self.fields(portal, *step).ok())
            .flatten()
            .filter(|f| f.secret)
            .map(|f| f.name)
            .collect()
    }

    /// Ask for every field of a step
    ///
    /// Values from `previous` (a slice captured on an earlier visit) are
    /// offered as defaults.
    pub fn prompt(&self, portal: Portal, step: StepKey, previous: Option<&Value>) -> Result<Value> {
        let fields = self.fields(portal, step)?;
        let mut slice = Map::new();

        for field in &fields {
            let prior = previous.and_then(|p| p.get(&field.name));
            if let Some(v) = self.prompt_field(field, prior)? {
                slice.insert(field.name.clone(), v);
            }
        }

        Ok(Value::Object(slice))
    }

    /// Prompt the user for a field value
    fn prompt_field(&self, field: &FieldInfo, prior: Option<&Value>) -> Result<Option<Value>> {
        let prompt = format_prompt(field);
        let default = prior.or(field.default.as_ref());

        match &field.field_type {
            FieldType::Enum { values, labels } => {
                let items: Vec<String> = values.iter().map(|v| describe_choice(v, *labels)).collect();
                let default_idx = default
                    .and_then(|d| values.iter().position(|v| v == d))
                    .unwrap_or(0);

                let selection = Select::with_theme(&self.theme)
                    .with_prompt(&prompt)
                    .items(&items)
                    .default(default_idx)
                    .interact()
                    .into_diagnostic()?;

                Ok(values.get(selection).cloned())
            }

            FieldType::Boolean => {
                let default_val = default.and_then(|d| d.as_bool()).unwrap_or(false);
                let items = &["Yes", "No"];
                let selection = Select::with_theme(&self.theme)
                    .with_prompt(&prompt)
                    .items(items)
                    .default(if default_val { 0 } else { 1 })
                    .interact()
                    .into_diagnostic()?;

                Ok(Some(Value::Bool(selection == 0)))
            }

            FieldType::String { .. } if field.secret => {
                // A value kept from an earlier visit is reused when left blank
                let kept = prior.and_then(|p| p.as_str()).filter(|p| !p.is_empty());
                let raw = Password::with_theme(&self.theme)
                    .with_prompt(&prompt)
                    .allow_empty_password(kept.is_some() || !field.required)
                    .interact()
                    .into_diagnostic()?;

                if raw.is_empty() {
                    Ok(kept.map(|p| Value::String(p.to_string())))
                } else {
                    Ok(Some(Value::String(raw)))
                }
            }

            FieldType::String { .. } | FieldType::Integer { .. } | FieldType::Number { .. } => {
                let default_str = default.map(value_as_input).unwrap_or_default();

                let mut input = Input::<String>::with_theme(&self.theme)
                    .with_prompt(&prompt)
                    .allow_empty(!field.required);
                if !default_str.is_empty() {
                    input = input.default(default_str);
                }
                let raw = input.interact_text().into_diagnostic()?;

                Ok(coerce_input(&field.field_type, &raw))
            }
        }
    }
}

impl Default for StepPrompter {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract field information from a step schema
///
/// Required fields come first in the order the schema lists them, then
/// optional ones alphabetically.
pub fn extract_fields(schema: &Value) -> Vec<FieldInfo> {
    let Some(props) = schema.get("properties").and_then(|p| p.as_object()) else {
        return Vec::new();
    };
    let required: Vec<&str> = schema
        .get("required")
        .and_then(|r| r.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    let mut optional: Vec<&String> = props.keys().filter(|k| !required.contains(&k.as_str())).collect();
    optional.sort();

    required
        .iter()
        .copied()
        .chain(optional.into_iter().map(|s| s.as_str()))
        .filter_map(|name| {
            props
                .get(name)
                .and_then(|prop| parse_field(name, prop, required.contains(&name)))
        })
        .collect()
}

/// Parse a single field from its schema
fn parse_field(name: &str, schema: &Value, required: bool) -> Option<FieldInfo> {
    let description = schema.get("description").and_then(|d| d.as_str()).map(String::from);
    let default = schema.get("default").cloned();

    let field_type = if let Some(values) = schema.get("enum").and_then(|e| e.as_array()) {
        FieldType::Enum {
            values: values.clone(),
            labels: schema
                .get("x-labels")
                .and_then(|l| l.as_str())
                .and_then(LabelKind::from_name),
        }
    } else {
        match schema.get("type").and_then(|t| t.as_str()) {
            Some("string") => FieldType::String {
                min_length: schema.get("minLength").and_then(|v| v.as_u64()),
                max_length: schema.get("maxLength").and_then(|v| v.as_u64()),
            },
            Some("integer") => FieldType::Integer {
                minimum: schema.get("minimum").and_then(|v| v.as_i64()),
                maximum: schema.get("maximum").and_then(|v| v.as_i64()),
            },
            Some("number") => FieldType::Number {
                minimum: schema.get("minimum").and_then(|v| v.as_f64()),
            },
            Some("boolean") => FieldType::Boolean,
            _ => return None,
        }
    };

    Some(FieldInfo {
        name: name.to_string(),
        description,
        field_type,
        required,
        default,
        secret: schema.get("writeOnly").and_then(|w| w.as_bool()).unwrap_or(false),
    })
}

/// Convert typed text into a JSON value
///
/// Empty input means "not provided". Text that does not parse as the
/// expected number is kept as a string so the schema reports it.
pub fn coerce_input(field_type: &FieldType, raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let value = match field_type {
        FieldType::Integer { .. } => raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        FieldType::Number { .. } => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        _ => Value::String(raw.to_string()),
    };
    Some(value)
}

fn value_as_input(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Text shown for one enum choice
fn describe_choice(value: &Value, labels: Option<LabelKind>) -> String {
    match (labels, value.as_u64()) {
        (Some(kind), Some(code)) => match u8::try_from(code) {
            Ok(code) => display_label(kind, code).to_string(),
            Err(_) => value.to_string(),
        },
        _ => value.as_str().map(String::from).unwrap_or_else(|| value.to_string()),
    }
}

/// Format the prompt for a field
pub fn format_prompt(field: &FieldInfo) -> String {
    let name = field
        .name
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    match &field.description {
        Some(desc) => {
            let short_desc = if desc.chars().count() > 50 {
                format!("{}...", desc.chars().take(47).collect::<String>())
            } else {
                desc.clone()
            };
            format!("{} ({})", name, style(short_desc).dim())
        }
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_fields_first_in_schema_order() {
        let prompter = StepPrompter::new();
        let fields = prompter.fields(Portal::Doctor, StepKey::Professional).unwrap();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "specialization",
                "license_number",
                "years_of_experience",
                "consultation_fee",
                "bio",
                "clinic_name"
            ]
        );
        assert!(fields[0].required);
        assert!(!fields[4].required);
    }

    #[test]
    fn test_enum_with_label_table() {
        let prompter = StepPrompter::new();
        let fields = prompter.fields(Portal::User, StepKey::Personal).unwrap();
        let gender = fields.iter().find(|f| f.name == "gender").unwrap();
        match &gender.field_type {
            FieldType::Enum { values, labels } => {
                assert_eq!(values, &vec![json!(1), json!(2)]);
                assert_eq!(*labels, Some(LabelKind::Gender));
                assert_eq!(describe_choice(&values[1], *labels), "Female");
            }
            other => panic!("expected enum, got {:?}", other),
        }
    }

    #[test]
    fn test_password_fields_are_secret() {
        let prompter = StepPrompter::new();
        for (portal, step) in [(Portal::User, StepKey::Account), (Portal::Doctor, StepKey::Personal)] {
            let fields = prompter.fields(portal, step).unwrap();
            let secret: Vec<&str> = fields.iter().filter(|f| f.secret).map(|f| f.name.as_str()).collect();
            assert_eq!(secret, vec!["password"]);
        }
        assert_eq!(prompter.secret_fields(Portal::User), vec!["password".to_string()]);
    }

    #[test]
    fn test_unknown_step_schema() {
        let prompter = StepPrompter::new();
        assert!(prompter.fields(Portal::User, StepKey::Documents).is_err());
    }

    #[test]
    fn test_coerce_input() {
        let int = FieldType::Integer { minimum: None, maximum: None };
        let num = FieldType::Number { minimum: None };
        let text = FieldType::String { min_length: None, max_length: None };

        assert_eq!(coerce_input(&int, " 12 "), Some(json!(12)));
        assert_eq!(coerce_input(&int, "twelve"), Some(json!("twelve")));
        assert_eq!(coerce_input(&num, "35.5"), Some(json!(35.5)));
        assert_eq!(coerce_input(&text, "Amira"), Some(json!("Amira")));
        assert_eq!(coerce_input(&text, "   "), None);
    }

    #[test]
    fn test_format_prompt_title_cases_name() {
        let field = FieldInfo {
            name: "date_of_birth".to_string(),
            description: None,
            field_type: FieldType::String { min_length: None, max_length: None },
            required: true,
            default: None,
            secret: false,
        };
        assert_eq!(format_prompt(&field), "Date Of Birth");
    }

    #[test]
    fn test_extract_fields_skips_unsupported_types() {
        let schema = json!({
            "properties": {
                "tags": { "type": "array" },
                "note": { "type": "string" }
            }
        });
        let fields = extract_fields(&schema);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "note");
    }
}

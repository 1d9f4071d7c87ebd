//! YAML draft documents and their diagnostics
//!
//! A draft document maps step names to slices, for batch registration:
//!
//! ```yaml
//! account:
//!   email: omar@example.com
//!   password: hunter22x
//! personal:
//!   first_name: Omar
//! ```

pub mod diagnostics;

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::StepKey;

pub use diagnostics::{YamlError, YamlSyntaxError};

/// Parse a draft document into slices keyed by step
pub fn parse_draft_document(content: &str, filename: &str) -> Result<BTreeMap<StepKey, Value>, YamlError> {
    let doc: serde_yml::Value = serde_yml::from_str(content)
        .map_err(|e| YamlSyntaxError::from_serde_error(&e, content, filename))?;

    let serde_yml::Value::Mapping(mapping) = doc else {
        return Err(YamlSyntaxError::at_location(
            "draft must be a mapping of step names to fields",
            content,
            filename,
            1,
            1,
            Some("Start each step on its own line, e.g. `personal:`".to_string()),
        )
        .into());
    };

    let mut slices = BTreeMap::new();
    for (key, value) in mapping {
        let name = key.as_str().unwrap_or_default().to_string();
        let line = diagnostics::find_top_level_key_line(content, &name).unwrap_or(1);

        let step: StepKey = name.parse().map_err(|e: crate::core::IdentityParseError| {
            YamlSyntaxError::at_location(e.to_string(), content, filename, line, 1, None)
        })?;

        let slice = serde_json::to_value(&value).map_err(|e| {
            YamlSyntaxError::at_location(
                format!("step '{}' cannot be read as fields: {}", name, e),
                content,
                filename,
                line,
                1,
                None,
            )
        })?;
        slices.insert(step, slice);
    }

    Ok(slices)
}

/// Read and parse a draft document from disk
pub fn load_draft_document(path: &Path) -> Result<BTreeMap<StepKey, Value>, YamlError> {
    let content = std::fs::read_to_string(path)?;
    let filename = path.file_name().unwrap_or_default().to_string_lossy();
    parse_draft_document(&content, &filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_draft_document() {
        let content = "account:\n  email: a@b.co\n  password: abcdefg1\nconsent:\n  accept_terms: true\n";
        let slices = parse_draft_document(content, "draft.yaml").unwrap();
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[&StepKey::Account]["email"], json!("a@b.co"));
        assert_eq!(slices[&StepKey::Consent]["accept_terms"], json!(true));
    }

    #[test]
    fn test_unknown_step_points_at_key() {
        let content = "account:\n  email: a@b.co\nbilling:\n  card: 4242\n";
        let err = parse_draft_document(content, "draft.yaml").unwrap_err();
        match err {
            YamlError::Syntax(e) => {
                assert!(e.message().contains("billing"));
                assert_eq!(e.offset(), content.find("billing").unwrap());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_mapping_document() {
        let err = parse_draft_document("- just\n- a list\n", "draft.yaml").unwrap_err();
        assert!(matches!(err, YamlError::Syntax(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_draft_document(Path::new("/no/such/draft.yaml")).unwrap_err();
        assert!(matches!(err, YamlError::Io(_)));
    }
}

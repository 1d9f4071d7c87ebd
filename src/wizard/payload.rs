//! Flattening a complete draft into a multipart-shaped payload

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;
use ulid::Ulid;

use crate::core::{Portal, StepKey};
use crate::wizard::draft::WizardDraft;
use crate::wizard::flow::Flow;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("the {0} step has not been completed")]
    MissingSlice(StepKey),

    #[error("the {0} step did not produce a record of fields")]
    NotAnObject(StepKey),

    #[error("field '{field}' is set by both the {first} and {second} steps")]
    DuplicateField {
        field: String,
        first: StepKey,
        second: StepKey,
    },
}

/// Text shown in place of secret values
pub const REDACTED: &str = "********";

/// One form part
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PayloadPart {
    Text { name: String, value: String },
    File { name: String, path: PathBuf },
}

impl PayloadPart {
    pub fn name(&self) -> &str {
        match self {
            PayloadPart::Text { name, .. } | PayloadPart::File { name, .. } => name,
        }
    }
}

/// Flattened registration record, built only from a fully valid draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionPayload {
    pub portal: Portal,
    #[serde(serialize_with = "serialize_ulid")]
    pub draft_id: Ulid,
    pub parts: Vec<PayloadPart>,
}

fn serialize_ulid<S: serde::Serializer>(id: &Ulid, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&id.to_string())
}

impl SubmissionPayload {
    /// Assemble the payload, visiting steps in flow order
    ///
    /// Fields within a slice are visited in key order. Nested objects
    /// become `parent.child`, arrays repeat under `name[]`, nulls are
    /// dropped, and string fields declared as file fields become file parts.
    pub fn assemble(flow: &Flow, draft: &WizardDraft) -> Result<Self, PayloadError> {
        let mut parts = Vec::new();
        let mut owners: HashMap<String, StepKey> = HashMap::new();
        // Flattened part names; `name[]` repeats are expected and not tracked
        let mut part_owners: HashMap<String, StepKey> = HashMap::new();

        for (i, def) in flow.steps().iter().enumerate() {
            let slice = draft.get(i + 1).ok_or(PayloadError::MissingSlice(def.key))?;
            let fields = slice.as_object().ok_or(PayloadError::NotAnObject(def.key))?;

            let mut names: Vec<&String> = fields.keys().collect();
            names.sort();

            for name in names {
                if let Some(first) = owners.insert(name.clone(), def.key) {
                    return Err(PayloadError::DuplicateField {
                        field: name.clone(),
                        first,
                        second: def.key,
                    });
                }

                let mut fresh = Vec::new();
                let value = &fields[name.as_str()];
                match value {
                    Value::String(path) if def.file_fields.contains(&name.as_str()) => {
                        fresh.push(PayloadPart::File {
                            name: name.clone(),
                            path: PathBuf::from(path),
                        });
                    }
                    _ => flatten_into(name, value, &mut fresh),
                }

                for part in &fresh {
                    let part_name = part.name();
                    if part_name.contains("[]") {
                        continue;
                    }
                    if let Some(first) = part_owners.insert(part_name.to_string(), def.key) {
                        return Err(PayloadError::DuplicateField {
                            field: part_name.to_string(),
                            first,
                            second: def.key,
                        });
                    }
                }
                parts.append(&mut fresh);
            }
        }

        Ok(Self {
            portal: flow.portal(),
            draft_id: draft.id(),
            parts,
        })
    }

    /// Copy with the values of `secret` text fields replaced by a mask
    pub fn redacted(&self, secret: &[String]) -> Self {
        let parts = self
            .parts
            .iter()
            .map(|part| match part {
                PayloadPart::Text { name, .. } if secret.iter().any(|s| s == name) => PayloadPart::Text {
                    name: name.clone(),
                    value: REDACTED.to_string(),
                },
                other => other.clone(),
            })
            .collect();
        Self {
            portal: self.portal,
            draft_id: self.draft_id,
            parts,
        }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// First text value under a part name
    pub fn text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|p| match p {
            PayloadPart::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn files(&self) -> impl Iterator<Item = (&str, &PathBuf)> {
        self.parts.iter().filter_map(|p| match p {
            PayloadPart::File { name, path } => Some((name.as_str(), path)),
            _ => None,
        })
    }
}

fn flatten_into(name: &str, value: &Value, parts: &mut Vec<PayloadPart>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => parts.push(text(name, b.to_string())),
        Value::Number(n) => parts.push(text(name, n.to_string())),
        Value::String(s) => parts.push(text(name, s.clone())),
        Value::Array(items) => {
            let item_name = format!("{}[]", name);
            for item in items {
                flatten_into(&item_name, item, parts);
            }
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                flatten_into(&format!("{}.{}", name, key), &map[key.as_str()], parts);
            }
        }
    }
}

fn text(name: &str, value: String) -> PayloadPart {
    PayloadPart::Text {
        name: name.to_string(),
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doctor_draft() -> (Flow, WizardDraft) {
        let flow = Flow::for_portal(Portal::Doctor).unwrap();
        let mut draft = WizardDraft::new(flow.len());
        draft.set(1, json!({"first_name": "Amira", "gender": 2, "email": "amira@example.com"}));
        draft.set(2, json!({"specialization": 1, "consultation_fee": 35.5, "clinic_name": null}));
        draft.set(3, json!({"medical_license": "/tmp/license.pdf", "national_id": "/tmp/id.png"}));
        draft.set(4, json!({"accept_terms": true, "accept_privacy": true}));
        (flow, draft)
    }

    #[test]
    fn test_assemble_flattens_in_step_then_key_order() {
        let (flow, draft) = doctor_draft();
        let payload = SubmissionPayload::assemble(&flow, &draft).unwrap();

        let names: Vec<&str> = payload.parts.iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            vec![
                "email",
                "first_name",
                "gender",
                "consultation_fee",
                "specialization",
                "medical_license",
                "national_id",
                "accept_privacy",
                "accept_terms",
            ]
        );
        assert_eq!(payload.text("gender"), Some("2"));
        assert_eq!(payload.text("consultation_fee"), Some("35.5"));
        assert_eq!(payload.text("accept_terms"), Some("true"));
        assert_eq!(payload.text("clinic_name"), None);
        assert_eq!(payload.draft_id, draft.id());
    }

    #[test]
    fn test_file_fields_become_file_parts() {
        let (flow, draft) = doctor_draft();
        let payload = SubmissionPayload::assemble(&flow, &draft).unwrap();
        let files: Vec<(&str, &PathBuf)> = payload.files().collect();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].0, "medical_license");
        assert_eq!(files[0].1, &PathBuf::from("/tmp/license.pdf"));
        assert_eq!(payload.text("medical_license"), None);
    }

    #[test]
    fn test_nested_values() {
        let flow = Flow::for_portal(Portal::User).unwrap();
        let mut draft = WizardDraft::new(3);
        draft.set(1, json!({"email": "a@b.co"}));
        draft.set(2, json!({"address": {"city": "Cairo", "zip": 11511}, "langs": ["ar", "en"]}));
        draft.set(3, json!({"accept_terms": true}));

        let payload = SubmissionPayload::assemble(&flow, &draft).unwrap();
        assert_eq!(payload.text("address.city"), Some("Cairo"));
        assert_eq!(payload.text("address.zip"), Some("11511"));
        let langs: Vec<&PayloadPart> = payload.parts.iter().filter(|p| p.name() == "langs[]").collect();
        assert_eq!(langs.len(), 2);
    }

    #[test]
    fn test_missing_slice() {
        let flow = Flow::for_portal(Portal::User).unwrap();
        let mut draft = WizardDraft::new(3);
        draft.set(1, json!({"email": "a@b.co"}));
        assert_eq!(
            SubmissionPayload::assemble(&flow, &draft).unwrap_err(),
            PayloadError::MissingSlice(StepKey::Personal)
        );
    }

    #[test]
    fn test_duplicate_field_across_steps() {
        let flow = Flow::for_portal(Portal::User).unwrap();
        let mut draft = WizardDraft::new(3);
        draft.set(1, json!({"email": "a@b.co"}));
        draft.set(2, json!({"email": "other@b.co"}));
        draft.set(3, json!({}));
        assert_eq!(
            SubmissionPayload::assemble(&flow, &draft).unwrap_err(),
            PayloadError::DuplicateField {
                field: "email".to_string(),
                first: StepKey::Account,
                second: StepKey::Personal,
            }
        );
    }

    #[test]
    fn test_nested_field_colliding_with_dotted_name() {
        let flow = Flow::for_portal(Portal::User).unwrap();
        let mut draft = WizardDraft::new(3);
        draft.set(1, json!({"email": "a@b.co"}));
        draft.set(2, json!({"address": {"city": "Cairo"}}));
        draft.set(3, json!({"address.city": "Giza"}));
        assert_eq!(
            SubmissionPayload::assemble(&flow, &draft).unwrap_err(),
            PayloadError::DuplicateField {
                field: "address.city".to_string(),
                first: StepKey::Personal,
                second: StepKey::Consent,
            }
        );
    }

    #[test]
    fn test_array_repeats_are_not_duplicates() {
        let flow = Flow::for_portal(Portal::User).unwrap();
        let mut draft = WizardDraft::new(3);
        draft.set(1, json!({"email": "a@b.co"}));
        draft.set(2, json!({"langs": ["ar", "en", "ar"]}));
        draft.set(3, json!({"accept_terms": true}));
        let payload = SubmissionPayload::assemble(&flow, &draft).unwrap();
        assert_eq!(payload.parts.iter().filter(|p| p.name() == "langs[]").count(), 3);
    }

    #[test]
    fn test_redacted_masks_only_secret_text() {
        let flow = Flow::for_portal(Portal::User).unwrap();
        let mut draft = WizardDraft::new(3);
        draft.set(1, json!({"email": "a@b.co", "password": "hunter22x"}));
        draft.set(2, json!({"first_name": "Omar"}));
        draft.set(3, json!({"accept_terms": true}));
        let payload = SubmissionPayload::assemble(&flow, &draft).unwrap();

        let masked = payload.redacted(&["password".to_string()]);
        assert_eq!(masked.text("password"), Some(REDACTED));
        assert_eq!(masked.text("email"), Some("a@b.co"));
        assert_eq!(masked.len(), payload.len());
        assert_eq!(payload.text("password"), Some("hunter22x"));
    }

    #[test]
    fn test_non_object_slice() {
        let flow = Flow::for_portal(Portal::User).unwrap();
        let mut draft = WizardDraft::new(3);
        draft.set(1, json!(["not", "a", "record"]));
        assert_eq!(
            SubmissionPayload::assemble(&flow, &draft).unwrap_err(),
            PayloadError::NotAnObject(StepKey::Account)
        );
    }
}

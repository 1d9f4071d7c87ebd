//! Embedded step schemas

use rust_embed::Embed;
use std::collections::HashMap;

use crate::core::{Portal, StepKey};

#[derive(Embed)]
#[folder = "schemas/"]
struct EmbeddedSchemas;

/// JSON Schema source for every (portal, step) pair shipped with the binary
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<(Portal, StepKey), String>,
}

impl SchemaRegistry {
    /// Schema file location inside the embedded folder
    pub fn path_for(portal: Portal, step: StepKey) -> String {
        format!("{}/{}.schema.json", portal.as_str(), step.as_str())
    }

    pub fn get(&self, portal: Portal, step: StepKey) -> Option<&str> {
        self.schemas.get(&(portal, step)).map(|s| s.as_str())
    }

    pub fn has_schema(&self, portal: Portal, step: StepKey) -> bool {
        self.schemas.contains_key(&(portal, step))
    }

    /// Every registered pair, sorted for stable iteration
    pub fn keys(&self) -> Vec<(Portal, StepKey)> {
        let mut keys: Vec<_> = self.schemas.keys().copied().collect();
        keys.sort_by_key(|(p, s)| (p.as_str(), *s));
        keys
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        let mut schemas = HashMap::new();
        for portal in Portal::with_registration() {
            for step in StepKey::all() {
                let path = Self::path_for(*portal, *step);
                if let Some(file) = EmbeddedSchemas::get(&path) {
                    match String::from_utf8(file.data.into_owned()) {
                        Ok(text) => {
                            schemas.insert((*portal, *step), text);
                        }
                        Err(e) => tracing::warn!(%path, "embedded schema is not UTF-8: {}", e),
                    }
                }
            }
        }
        Self { schemas }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doctor_schemas_present() {
        let registry = SchemaRegistry::default();
        for step in [StepKey::Personal, StepKey::Professional, StepKey::Documents, StepKey::Consent] {
            assert!(registry.has_schema(Portal::Doctor, step), "missing doctor/{}", step);
        }
        assert!(!registry.has_schema(Portal::Doctor, StepKey::Account));
    }

    #[test]
    fn test_user_schemas_present() {
        let registry = SchemaRegistry::default();
        for step in [StepKey::Account, StepKey::Personal, StepKey::Consent] {
            assert!(registry.has_schema(Portal::User, step));
        }
        assert!(!registry.has_schema(Portal::Admin, StepKey::Personal));
    }

    #[test]
    fn test_schemas_parse_as_json() {
        let registry = SchemaRegistry::default();
        for (portal, step) in registry.keys() {
            let text = registry.get(portal, step).unwrap();
            assert!(serde_json::from_str::<serde_json::Value>(text).is_ok());
        }
    }
}

//! Schema generator configuration

use serde::{Deserialize, Serialize};

/// Meta-schema URI of JSON Schema draft 2020-12
pub const DRAFT_2020_12: &str = "https://json-schema.org/draft/2020-12/schema";

/// Settings for a [`SchemaGenerator`](super::SchemaGenerator)
///
/// The defaults produce the bare document expected by tool-calling APIs: no
/// `$schema` and no root `title`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSettings {
    /// Emitted as `$schema` on the root document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_schema: Option<String>,
    /// Use the root record's declared name as the document `title`
    #[serde(default)]
    pub root_title: bool,
}

impl SchemaSettings {
    /// Create settings with the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings that declare the document as draft 2020-12
    pub fn draft2020_12() -> Self {
        Self::new().with_meta_schema(DRAFT_2020_12)
    }

    /// Set the `$schema` URI
    pub fn with_meta_schema(mut self, meta_schema: impl Into<String>) -> Self {
        self.meta_schema = Some(meta_schema.into());
        self
    }

    /// Title the document after the root record
    pub fn with_root_title(mut self, root_title: bool) -> Self {
        self.root_title = root_title;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = SchemaSettings::default();
        assert!(settings.meta_schema.is_none());
        assert!(!settings.root_title);
    }

    #[test]
    fn test_settings_builder() {
        let settings = SchemaSettings::draft2020_12().with_root_title(true);
        assert_eq!(settings.meta_schema.as_deref(), Some(DRAFT_2020_12));
        assert!(settings.root_title);
    }

    #[test]
    fn test_settings_deserialize() {
        let settings: SchemaSettings = serde_json::from_str(r#"{"root_title": true}"#).unwrap();
        assert_eq!(settings, SchemaSettings::new().with_root_title(true));
    }
}

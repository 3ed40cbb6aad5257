use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Expected body schema of a route, keyed by field name.
pub type MultipartSchema = BTreeMap<String, SchemaProperty>;

/// Declared type of a schema property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
}

/// Declared expectation for one form field.
///
/// Mirrors the JSON-schema fragment a route would declare for its body
/// properties, so schemas can also be deserialized from route definitions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaProperty {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<SchemaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Byte ceiling for upload fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Mime allow-list for upload fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept: Option<Vec<String>>,
    /// Element schema for array properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaProperty>>,
}

impl SchemaProperty {
    /// Plain property of the given type.
    pub fn of(kind: SchemaType) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Single-file upload property: binary string with a size ceiling and a
    /// mime allow-list.
    pub fn file(max_size: usize, accept: &[&str]) -> Self {
        Self {
            kind: Some(SchemaType::String),
            format: Some("binary".to_owned()),
            max_length: Some(max_size),
            accept: Some(accept.iter().map(|s| (*s).to_owned()).collect()),
            items: None,
        }
    }

    /// Array property whose elements are file uploads.
    pub fn file_array(max_size: usize, accept: &[&str]) -> Self {
        Self {
            kind: Some(SchemaType::Array),
            items: Some(Box::new(Self::file(max_size, accept))),
            ..Self::default()
        }
    }

    /// Whether this property declares a single file upload. All four pieces
    /// must be present: binary string format plus a size ceiling and an
    /// allow-list to validate against.
    pub fn is_file(&self) -> bool {
        self.kind == Some(SchemaType::String)
            && self.format.as_deref() == Some("binary")
            && self.max_length.is_some()
            && self.accept.is_some()
    }

    /// Element schema when this property declares an array of file uploads.
    pub fn file_items(&self) -> Option<&SchemaProperty> {
        if self.kind == Some(SchemaType::Array) {
            self.items.as_deref().filter(|items| items.is_file())
        } else {
            None
        }
    }

    /// Whether this property declares an array of file uploads.
    pub fn is_file_array(&self) -> bool {
        self.file_items().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_property_requires_all_four_pieces() {
        let full = SchemaProperty::file(1000, &["image/png"]);
        assert!(full.is_file());

        let mut no_format = full.clone();
        no_format.format = None;
        assert!(!no_format.is_file());

        let mut no_limit = full.clone();
        no_limit.max_length = None;
        assert!(!no_limit.is_file());

        let mut no_accept = full.clone();
        no_accept.accept = None;
        assert!(!no_accept.is_file());

        let mut wrong_kind = full;
        wrong_kind.kind = Some(SchemaType::Object);
        assert!(!wrong_kind.is_file());
    }

    #[test]
    fn file_array_requires_file_items() {
        assert!(SchemaProperty::file_array(1000, &["image/png"]).is_file_array());
        assert!(!SchemaProperty::of(SchemaType::Array).is_file_array());
        assert!(!SchemaProperty::file(1000, &["image/png"]).is_file_array());

        let mut broken = SchemaProperty::file_array(1000, &["image/png"]);
        broken.items = Some(Box::new(SchemaProperty::of(SchemaType::String)));
        assert!(!broken.is_file_array());
    }

    #[test]
    fn deserializes_json_schema_fragments() {
        let property: SchemaProperty = serde_json::from_str(
            r#"{"type":"string","format":"binary","maxLength":1000,"accept":["image/png"]}"#,
        )
        .unwrap();
        assert!(property.is_file());
        assert_eq!(property.max_length, Some(1000));
    }
}

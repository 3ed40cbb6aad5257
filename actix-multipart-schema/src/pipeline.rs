use serde_json::{Map, Value};

use crate::bridge::{from_serialized_file, to_serialized_file};
use crate::coerce::coerce;
use crate::error::UnprocessableEntity;
use crate::field::{FieldEntry, RawField, RawFields, RawUpload};
use crate::file::File;
use crate::path::{has_array_notation, parse_field_path, set_nested_value};
use crate::schema::{MultipartSchema, SchemaProperty, SchemaType};
use crate::validate::{validate_file_mime_type, validate_file_size};

/// How one submitted field lines up with its schema property, resolved
/// once before dispatch.
#[derive(Debug)]
enum FieldClass<'a> {
    /// Every upload runs the file pipeline, yielding an array value.
    FileArray {
        uploads: Vec<&'a RawUpload>,
        items: &'a SchemaProperty,
    },
    /// One upload runs the file pipeline, yielding a scalar value.
    SingleFile {
        upload: &'a RawUpload,
        property: &'a SchemaProperty,
    },
    /// A singular file property received repeated parts.
    RepeatedSingleFile,
    /// A repeated field without a file-array schema contributes an empty
    /// array.
    Discarded,
    /// Plain text, coerced with the declared type when present.
    Text {
        value: &'a str,
        kind: Option<SchemaType>,
    },
    /// Nothing usable: an upload without a matching file schema.
    Skip,
}

fn classify<'a>(entry: &'a FieldEntry, property: Option<&'a SchemaProperty>) -> FieldClass<'a> {
    match entry {
        FieldEntry::Repeated(parts) => {
            if let Some(items) = property.and_then(SchemaProperty::file_items) {
                FieldClass::FileArray {
                    uploads: uploads_of(parts),
                    items,
                }
            } else if property.is_some_and(SchemaProperty::is_file) {
                FieldClass::RepeatedSingleFile
            } else {
                FieldClass::Discarded
            }
        }
        FieldEntry::Single(RawField::Upload(upload)) => {
            if let Some(items) = property.and_then(SchemaProperty::file_items) {
                FieldClass::FileArray {
                    uploads: vec![upload],
                    items,
                }
            } else if let Some(property) = property.filter(|p| p.is_file()) {
                FieldClass::SingleFile { upload, property }
            } else {
                FieldClass::Skip
            }
        }
        FieldEntry::Single(RawField::Text(value)) => FieldClass::Text {
            value: value.as_str(),
            kind: property.and_then(|p| p.kind),
        },
    }
}

/// Text parts mixed into a repeated upload field carry no file payload and
/// are dropped rather than run through the file pipeline.
fn uploads_of(parts: &[RawField]) -> Vec<&RawUpload> {
    parts
        .iter()
        .filter_map(|part| match part {
            RawField::Upload(upload) => Some(upload),
            RawField::Text(_) => None,
        })
        .collect()
}

/// Build the record, enforce the schema's limits, encode for the
/// validation stage.
fn process_file(
    upload: &RawUpload,
    property: &SchemaProperty,
    field_name: &str,
) -> Result<String, UnprocessableEntity> {
    let file = File::from_upload(upload);
    if let Some(max_size) = property.max_length {
        validate_file_size(&file, max_size, field_name)?;
    }
    if let Some(accept) = &property.accept {
        validate_file_mime_type(&file, accept, field_name)?;
    }
    Ok(to_serialized_file(&file))
}

/// Phase one, run before the host validates the body: classify every
/// submitted field against the schema and build the nested, typed body.
/// Files come out as tagged JSON strings so the whole body is plain JSON
/// for the validation stage. Fails fast on the first violating field.
pub fn pre_validation(
    fields: &RawFields,
    schema: &MultipartSchema,
) -> Result<Map<String, Value>, UnprocessableEntity> {
    let mut body = Map::new();

    for (name, entry) in fields.iter() {
        let value = match classify(entry, schema.get(name)) {
            FieldClass::FileArray { uploads, items } => {
                let mut serialized = Vec::with_capacity(uploads.len());
                for upload in uploads {
                    serialized.push(Value::String(process_file(upload, items, name)?));
                }
                Value::Array(serialized)
            }
            FieldClass::SingleFile { upload, property } => {
                Value::String(process_file(upload, property, name)?)
            }
            FieldClass::RepeatedSingleFile => {
                return Err(UnprocessableEntity::field(
                    name,
                    format!("Field \"{name}\" expects a single file, not an array."),
                ));
            }
            FieldClass::Discarded => Value::Array(Vec::new()),
            FieldClass::Text { value, kind } => coerce(value, kind),
            FieldClass::Skip => {
                log::debug!("multipart field {name} has no usable value, skipping");
                continue;
            }
        };
        place(&mut body, name, value);
    }

    Ok(body)
}

fn place(body: &mut Map<String, Value>, name: &str, value: Value) {
    if has_array_notation(name) {
        set_nested_value(body, &parse_field_path(name), value);
    } else {
        body.insert(name.to_owned(), value);
    }
}

/// Phase two, run after the host validated the body: walk the top-level
/// entries and turn tagged file strings back into file records, both at
/// scalar positions and element-wise inside arrays. Everything else is
/// left untouched.
pub fn pre_handler(body: Map<String, Value>) -> Map<String, Value> {
    body.into_iter()
        .map(|(name, value)| (name, rehydrate(value)))
        .collect()
}

fn rehydrate(value: Value) -> Value {
    match value {
        Value::String(text) => restore_file(text),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::String(text) => restore_file(text),
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}

fn restore_file(text: String) -> Value {
    match from_serialized_file(&text) {
        Some(file) => serde_json::to_value(&file).unwrap_or(Value::String(text)),
        None => Value::String(text),
    }
}

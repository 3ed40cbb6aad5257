use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// One offending field inside a validation failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// A multipart body that failed schema-driven validation.
///
/// Always carries status 422 and at least one field entry. Validators
/// raise it as soon as the first violation is found, so normalization of
/// the remaining fields is abandoned.
#[derive(Debug, Clone, Error)]
#[error("Validation error")]
pub struct UnprocessableEntity {
    pub status_code: u16,
    pub validation: Vec<FieldError>,
}

impl UnprocessableEntity {
    /// Failure for a single field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status_code: 422,
            validation: vec![FieldError {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    /// The failure messages, in order.
    pub fn messages(&self) -> Vec<&str> {
        self.validation.iter().map(|v| v.message.as_str()).collect()
    }

    /// The JSON body this failure renders to on the wire.
    pub fn response_body(&self) -> Value {
        json!({
            "statusCode": self.status_code,
            "message": self.to_string(),
            "validation": self.validation,
        })
    }
}

/// Error type for multipart extraction.
#[derive(Error, Debug)]
pub enum MultipartError {
    /// The normalized body did not deserialize into the target form type.
    #[error("Error while parsing field: {0}")]
    ParseError(serde_json::Error),
    /// A file part exceeded the configured size ceiling while being
    /// decoded.
    #[error("File for field ({field}) was too large (max size: {limit} bytes)")]
    FileSizeError { field: String, limit: usize },
    /// The part stream failed to decode. The stream cannot resume past
    /// the failure, so the parts behind it are unreadable.
    #[error("Malformed multipart request: {0}")]
    DecodeError(actix_multipart::MultipartError),
    /// The request did not carry a multipart content type.
    #[error("Expected a multipart/form-data request")]
    NotMultipart,
    /// A field violated its declared schema.
    #[error(transparent)]
    Validation(#[from] UnprocessableEntity),
}

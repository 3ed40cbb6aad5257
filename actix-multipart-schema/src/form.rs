use crate::schema::MultipartSchema;

/// This shouldn't be implemented manually.
/// Use [`actix_multipart_schema_derive::MultipartForm`].
pub trait MultipartForm {
    /// Expected body schema, keyed by field name after serde renaming.
    fn schema() -> MultipartSchema;
}

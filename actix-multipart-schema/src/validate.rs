use crate::error::UnprocessableEntity;
use crate::file::File;

/// Reject a file larger than the schema's byte ceiling.
pub fn validate_file_size(
    file: &File,
    max_size: usize,
    field_name: &str,
) -> Result<(), UnprocessableEntity> {
    if file.size > max_size {
        return Err(UnprocessableEntity::field(
            field_name,
            format!("File size exceeds the maximum allowed size of {max_size} bytes."),
        ));
    }
    Ok(())
}

/// Reject a file whose mimetype is missing or not on the allow-list.
pub fn validate_file_mime_type(
    file: &File,
    allowed_types: &[String],
    field_name: &str,
) -> Result<(), UnprocessableEntity> {
    if file.mimetype.is_empty() || !allowed_types.iter().any(|t| *t == file.mimetype) {
        return Err(UnprocessableEntity::field(
            field_name,
            format!(
                "Invalid file type. Allowed types: {}.",
                allowed_types.join(", ")
            ),
        ));
    }
    Ok(())
}

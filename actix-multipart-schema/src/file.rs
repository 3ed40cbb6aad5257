use std::ffi::OsStr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::field::RawUpload;

/// An uploaded file as handed to request handlers.
///
/// `name` is a freshly generated storage name (UUIDv4 plus the original
/// extension); the submitted filename is kept in `original_name`. `size`
/// is the byte count reported by the decoder and the buffer survives the
/// validation stage byte-for-byte.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct File {
    pub name: String,
    pub original_name: String,
    pub mimetype: String,
    pub encoding: String,
    pub size: usize,
    pub buffer: Vec<u8>,
}

impl File {
    /// Build the canonical file record for a decoded upload.
    pub fn from_upload(upload: &RawUpload) -> Self {
        let id = Uuid::new_v4();
        let name = match Path::new(&upload.filename).extension().and_then(OsStr::to_str) {
            Some(ext) => format!("{id}.{ext}"),
            None => id.to_string(),
        };

        Self {
            name,
            original_name: upload.filename.clone(),
            mimetype: upload.mimetype.clone(),
            encoding: upload.encoding.clone(),
            size: upload.bytes_read,
            buffer: upload.data.clone(),
        }
    }
}

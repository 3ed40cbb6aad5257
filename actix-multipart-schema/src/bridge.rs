use serde::{Deserialize, Serialize};

use crate::file::File;

/// Wire form of a file record while it crosses the validation stage, which
/// only understands plain JSON scalars: `{"type":"file","file":{…}}`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum FileMarker {
    File { file: File },
}

/// Encode a file record as a tagged JSON string. Serialization of a record
/// cannot realistically fail; if it ever does the field degrades to an
/// empty string rather than aborting the request.
pub fn to_serialized_file(file: &File) -> String {
    serde_json::to_string(&FileMarker::File { file: file.clone() }).unwrap_or_default()
}

/// Decode a tagged JSON string back into a file record.
///
/// Total: anything that is not a well-formed marker (malformed JSON, a
/// different tag, a missing payload) yields `None`, which callers treat
/// as "leave the value unchanged". A marker without a buffer decodes to a
/// record with an empty one.
pub fn from_serialized_file(text: &str) -> Option<File> {
    match serde_json::from_str::<FileMarker>(text) {
        Ok(FileMarker::File { file }) => Some(file),
        Err(_) => None,
    }
}

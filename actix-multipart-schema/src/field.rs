/// One decoded multipart part, as handed over by the decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum RawField {
    /// Plain text part.
    Text(String),
    /// Fully buffered file part.
    Upload(RawUpload),
}

/// A buffered file part produced by the multipart decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct RawUpload {
    pub filename: String,
    pub mimetype: String,
    pub encoding: String,
    /// Bytes the decoder read for this part, 0 when unknown.
    pub bytes_read: usize,
    pub data: Vec<u8>,
}

/// Everything submitted under one field name.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEntry {
    Single(RawField),
    /// The same key occurred more than once, in submission order.
    Repeated(Vec<RawField>),
}

/// The flat field set of one multipart request, in submission order.
#[derive(Debug, Clone, Default)]
pub struct RawFields {
    entries: Vec<(String, FieldEntry)>,
}

impl RawFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a decoded part. A name seen before folds into a repeated
    /// entry instead of overwriting the earlier part.
    pub fn push(&mut self, name: impl Into<String>, field: RawField) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, entry)) => match entry {
                FieldEntry::Single(first) => {
                    let first = std::mem::replace(first, RawField::Text(String::new()));
                    *entry = FieldEntry::Repeated(vec![first, field]);
                }
                FieldEntry::Repeated(all) => all.push(field),
            },
            None => self.entries.push((name, FieldEntry::Single(field))),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldEntry)> {
        self.entries.iter().map(|(n, e)| (n.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RawUpload {
    /// Convenience constructor for buffered uploads; `bytes_read` is taken
    /// from the buffer length.
    pub fn new(
        filename: impl Into<String>,
        mimetype: impl Into<String>,
        encoding: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            mimetype: mimetype.into(),
            encoding: encoding.into(),
            bytes_read: data.len(),
            data,
        }
    }
}

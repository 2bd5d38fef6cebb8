//! Encoded report artifacts.

use super::FileExtension;

/// Serialized file bytes for one export, ready to be streamed.
///
/// The content type is derived from the extension, so the two can never
/// disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedArtifact {
    bytes: Vec<u8>,
    file_extension: FileExtension,
    filename: String,
}

impl EncodedArtifact {
    pub fn new(bytes: Vec<u8>, file_extension: FileExtension, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            file_extension,
            filename: filename.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn file_extension(&self) -> FileExtension {
        self.file_extension
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> &'static str {
        self.file_extension.content_type()
    }

    /// Value for the `Content-Disposition` header.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

use bytes::Bytes;
use perma_storage::Reference;
use serde::{Deserialize, Serialize};

use crate::{Blob, PermaSchemaError, SCHEMA_VERSION};

/// One contiguous run of a file's contents, stored as its own blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePart {
    /// The blob holding this part's bytes
    pub blob_ref: Reference,
    /// The number of bytes in the part
    pub size: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileFields {
    #[serde(default)]
    file_name: Option<String>,
    parts: Vec<FilePart>,
}

/// A file descriptor: an ordered list of parts that, concatenated, make up
/// the file's contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    reference: Reference,
    name: Option<String>,
    parts: Vec<FilePart>,
    size: u64,
}

impl File {
    /// The reference of the file descriptor blob.
    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    /// The file's name, if it was recorded.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The parts making up the file, in order.
    pub fn parts(&self) -> &[FilePart] {
        &self.parts
    }

    /// The total size of the file, in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Blob {
    /// View this blob as a [File], if it is a well formed file descriptor.
    /// Part sizes whose total does not fit in a `u64` are not well formed.
    pub fn as_file(&self) -> Option<File> {
        let fields: FileFields = self.fields("file")?;
        let size = fields
            .parts
            .iter()
            .try_fold(0u64, |total, part| total.checked_add(part.size))?;

        Some(File {
            reference: self.reference().clone(),
            name: fields.file_name,
            parts: fields.parts,
            size,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileDocument<'a> {
    camli_version: u64,
    camli_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_name: Option<&'a str>,
    parts: &'a [FilePart],
}

/// Encodes file descriptors.
#[derive(Debug, Clone, Default)]
pub struct FileBuilder {
    name: Option<String>,
    parts: Vec<FilePart>,
}

impl FileBuilder {
    /// Start an unnamed file with no parts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the file's name.
    pub fn name<S>(mut self, name: S) -> Self
    where
        S: Into<String>,
    {
        self.name = Some(name.into());
        self
    }

    /// Append a part.
    pub fn part(mut self, blob_ref: Reference, size: u64) -> Self {
        self.parts.push(FilePart { blob_ref, size });
        self
    }

    /// Encode the file descriptor as schema blob bytes.
    pub fn build(&self) -> Result<Bytes, PermaSchemaError> {
        let document = FileDocument {
            camli_version: SCHEMA_VERSION,
            camli_type: "file",
            file_name: self.name.as_deref(),
            parts: &self.parts,
        };

        serde_json::to_vec_pretty(&document)
            .map(Bytes::from)
            .map_err(|error| PermaSchemaError::EncodeFailed(format!("{error}")))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn it_decodes_a_built_file() -> Result<()> {
        let first = Reference::of(b"hello, ");
        let second = Reference::of(b"world");
        let bytes = FileBuilder::new()
            .name("greeting.txt")
            .part(first.clone(), 7)
            .part(second.clone(), 5)
            .build()?;
        let reference = Reference::of(&bytes);

        let file = Blob::from_bytes(&reference, bytes)?
            .as_file()
            .expect("a file");

        assert_eq!(file.reference(), &reference);
        assert_eq!(file.name(), Some("greeting.txt"));
        assert_eq!(
            file.parts(),
            &[
                FilePart {
                    blob_ref: first,
                    size: 7
                },
                FilePart {
                    blob_ref: second,
                    size: 5
                }
            ]
        );
        assert_eq!(file.size(), 12);

        Ok(())
    }

    #[test]
    fn it_is_not_a_file_when_the_part_sizes_overflow() -> Result<()> {
        let bytes = FileBuilder::new()
            .part(Reference::of(b"huge"), u64::MAX)
            .part(Reference::of(b"tail"), 2)
            .build()?;
        let reference = Reference::of(&bytes);

        let blob = Blob::from_bytes(&reference, bytes)?;

        assert!(blob.as_file().is_none());

        Ok(())
    }

    #[test]
    fn it_is_not_a_file_without_parts() -> Result<()> {
        let bytes = Bytes::from_static(br#"{"camliVersion": 1, "camliType": "file"}"#);
        let reference = Reference::of(&bytes);

        let blob = Blob::from_bytes(&reference, bytes)?;

        assert!(blob.as_file().is_none());
        assert!(blob.as_share().is_none());

        Ok(())
    }
}

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use crate::{BlobFetcher, BlobReceiver, FetchedBlob, PermaStorageError, Reference};

/// A basic file-system-based blob store. All blobs are stored inside a root
/// directory as files named after the canonical text of their [Reference].
#[derive(Clone, Debug)]
pub struct FileSystemBlobStore {
    root_dir: PathBuf,
}

impl FileSystemBlobStore {
    /// Creates a new [`FileSystemBlobStore`] that stores files in `root_dir`,
    /// creating the directory if it does not exist yet.
    pub async fn new<Pathlike>(root_dir: Pathlike) -> Result<Self, PermaStorageError>
    where
        Pathlike: AsRef<Path>,
    {
        let root_dir = root_dir.as_ref().to_owned();
        tokio::fs::create_dir_all(&root_dir).await?;
        Ok(Self { root_dir })
    }

    /// The directory blobs are stored in.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn make_path(&self, reference: &Reference) -> PathBuf {
        self.root_dir.join(reference.to_string())
    }
}

#[async_trait]
impl BlobFetcher for FileSystemBlobStore {
    async fn fetch(&self, reference: &Reference) -> Result<FetchedBlob, PermaStorageError> {
        let file = match tokio::fs::File::open(self.make_path(reference)).await {
            Ok(file) => file,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(PermaStorageError::NotFound(reference.clone()));
            }
            Err(error) => return Err(error.into()),
        };
        let size = file.metadata().await?.len();

        Ok(FetchedBlob::new(file, size))
    }
}

#[async_trait]
impl BlobReceiver for FileSystemBlobStore {
    async fn receive(&self, bytes: Bytes) -> Result<Reference, PermaStorageError> {
        let reference = Reference::of(&bytes);
        let path = self.make_path(&reference);

        if tokio::fs::try_exists(&path).await? {
            return Ok(reference);
        }

        // Write beside the destination first so a concurrent fetch never
        // observes a partially written blob
        let partial = path.with_extension("partial");
        tokio::fs::write(&partial, &bytes).await?;
        tokio::fs::rename(&partial, &path).await?;

        tracing::debug!(%reference, size = bytes.len(), "Stored blob");

        Ok(reference)
    }
}

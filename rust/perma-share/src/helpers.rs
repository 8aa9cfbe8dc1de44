use anyhow::Result;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use perma_schema::ShareBuilder;
use perma_storage::{BlobReceiver, MemoryBlobStore, Reference};

/// Builds the blobs that share chains are made of.
#[derive(Clone, Default)]
pub struct ChainFixture {
    pub store: MemoryBlobStore,
}

impl ChainFixture {
    pub async fn put<B>(&self, bytes: B) -> Result<Reference>
    where
        B: Into<Bytes>,
    {
        Ok(self.store.receive(bytes.into()).await?)
    }

    pub async fn share(&self, target: &Reference, transitive: bool) -> Result<Reference> {
        self.put(ShareBuilder::new(target.clone()).transitive(transitive).build()?)
            .await
    }

    pub async fn share_expiring(
        &self,
        target: &Reference,
        expires: DateTime<Utc>,
    ) -> Result<Reference> {
        self.put(
            ShareBuilder::new(target.clone())
                .transitive(true)
                .expires(expires)
                .build()?,
        )
        .await
    }

    /// An opaque blob that mentions `next` somewhere in the middle.
    pub async fn pointing_at(&self, next: &Reference) -> Result<Reference> {
        self.put(format!("directory listing\n  photo.jpg {next}\nend\n"))
            .await
    }
}

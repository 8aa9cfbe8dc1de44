use anyhow::Result;

use crate::FileSystemBlobStore;

/// Creates a [`FileSystemBlobStore`] rooted in a fresh temporary directory,
/// for use in tests. The store is only usable for as long as the returned
/// [`tempfile::TempDir`] is kept alive.
pub async fn make_target_store() -> Result<(FileSystemBlobStore, tempfile::TempDir)> {
    let root = tempfile::tempdir()?;
    let store = FileSystemBlobStore::new(root.path()).await?;
    Ok((store, root))
}

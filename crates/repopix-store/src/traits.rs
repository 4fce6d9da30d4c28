//! The content store abstraction.

use crate::{ContentEntry, ContentsResponse, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// A path-addressed, branch-scoped content store.
///
/// Implementations are bound to a single repository and branch at
/// construction time; every call operates on that branch.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Reads the entry or directory listing at `path`.
    ///
    /// An empty path addresses the repository root. A missing path yields
    /// [`StoreError::NotFound`](crate::StoreError::NotFound).
    async fn get_content(&self, path: &str) -> Result<ContentsResponse>;

    /// Creates or overwrites the file at `path` in a single commit.
    ///
    /// `sha` must carry the current content hash when overwriting.
    async fn put_file(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
        sha: Option<&str>,
    ) -> Result<ContentEntry>;

    /// Deletes the file at `path` if its current content hash equals `sha`.
    async fn delete_file(&self, path: &str, message: &str, sha: &str) -> Result<()>;
}

#[async_trait]
impl<T: ContentStore + ?Sized> ContentStore for Arc<T> {
    async fn get_content(&self, path: &str) -> Result<ContentsResponse> {
        (**self).get_content(path).await
    }

    async fn put_file(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
        sha: Option<&str>,
    ) -> Result<ContentEntry> {
        (**self).put_file(path, content, message, sha).await
    }

    async fn delete_file(&self, path: &str, message: &str, sha: &str) -> Result<()> {
        (**self).delete_file(path, message, sha).await
    }
}

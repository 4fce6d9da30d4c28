//! Deletion of a single hosted file.

use repopix_store::{ContentStore, ContentsResponse};
use tracing::info;

use crate::error::{HostError, Result};
use crate::host::ImageHost;
use crate::validation::validate_path;

impl<S: ContentStore> ImageHost<S> {
    /// Deletes the file at `path`, resolving its current content hash first.
    ///
    /// Deletion is immediate; the repository history is the only way back.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NotAFile`] if `path` is a directory (no delete is
    /// issued), [`HostError::NotFound`] if it does not exist, and
    /// [`HostError::Configuration`] if the write credential is missing.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.config().ensure_writable()?;
        let path = path.trim().trim_matches('/');
        if path.is_empty() {
            return Err(HostError::Validation("path cannot be empty".to_string()));
        }
        validate_path(path)?;

        let entry = match self.store().get_content(path).await? {
            ContentsResponse::File(entry) if entry.is_file() => entry,
            _ => return Err(HostError::NotAFile(path.to_string())),
        };

        let name = path.rsplit('/').next().unwrap_or(path);
        self.store()
            .delete_file(path, &format!("Delete image: {name}"), &entry.sha)
            .await?;
        info!(%path, "image deleted");
        Ok(())
    }
}

//! Upload orchestration: provision the directory chain, then commit the file.

use once_cell::sync::Lazy;
use regex::Regex;
use repopix_store::{ContentStore, ContentsResponse, StoreError};
use tracing::{debug, info, warn};

use crate::category::MARKER_FILE;
use crate::config::join_path;
use crate::error::{HostError, Result};
use crate::host::ImageHost;
use crate::validation::{validate_category_name, validate_path};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("Invalid regex"));

/// Derives the stored file name: `{timestamp_ms}-{name}` with whitespace runs
/// collapsed to a single hyphen.
///
/// Two uploads of the same name within the same millisecond derive the same
/// name; the second commit is then rejected by the store.
#[must_use]
pub fn derive_file_name(timestamp_ms: i64, name: &str) -> String {
    format!("{timestamp_ms}-{}", WHITESPACE.replace_all(name, "-"))
}

impl<S: ContentStore> ImageHost<S> {
    /// Uploads `content` as `file_name`, returning its public URL.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Configuration`] if the write credential is missing,
    /// [`HostError::Validation`] for unusable names, and store errors if a
    /// directory marker or the file itself cannot be committed.
    pub async fn upload(
        &self,
        content: &[u8],
        file_name: &str,
        category: Option<&str>,
        subfolder: Option<&str>,
    ) -> Result<String> {
        let now = chrono::Utc::now().timestamp_millis();
        self.upload_at(now, content, file_name, category, subfolder)
            .await
    }

    /// [`upload`](Self::upload) with an explicit millisecond timestamp.
    ///
    /// # Errors
    ///
    /// See [`upload`](Self::upload).
    pub async fn upload_at(
        &self,
        timestamp_ms: i64,
        content: &[u8],
        file_name: &str,
        category: Option<&str>,
        subfolder: Option<&str>,
    ) -> Result<String> {
        self.config().ensure_writable()?;

        let file_name = file_name.trim();
        if file_name.is_empty() || file_name.contains(['/', '\\', '\0']) {
            return Err(HostError::Validation(format!(
                "invalid file name: {file_name:?}"
            )));
        }

        let category = category.map(str::trim).filter(|c| !c.is_empty());
        let mut dir = match category {
            Some(name) => {
                validate_category_name(name)?;
                self.config().path_under_root(name)
            }
            None => self.config().root.clone(),
        };

        if let Some(subfolder) = subfolder {
            validate_path(subfolder)?;
            for segment in subfolder.split('/').filter(|s| !s.is_empty()) {
                dir = join_path(&dir, segment);
                self.ensure_directory(&dir).await?;
            }
        }

        let derived = derive_file_name(timestamp_ms, file_name);
        let path = join_path(&dir, &derived);
        self.store()
            .put_file(&path, content, &format!("Upload image: {derived}"), None)
            .await?;
        info!(%path, bytes = content.len(), "image uploaded");

        Ok(self.config().raw_url(&path))
    }

    /// Creates `dir` with a marker file unless it already exists.
    ///
    /// A failed probe is treated as absence; if the directory was there after
    /// all, the marker write conflicts and is ignored.
    async fn ensure_directory(&self, dir: &str) -> Result<()> {
        match self.store().get_content(dir).await {
            Ok(ContentsResponse::Directory(_)) => {
                debug!(%dir, "directory exists");
                return Ok(());
            }
            Ok(ContentsResponse::File(_)) => {
                return Err(HostError::NotAFile(dir.to_string()));
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => warn!(%dir, error = %e, "directory probe failed, creating it anyway"),
        }

        let marker = join_path(dir, MARKER_FILE);
        match self
            .store()
            .put_file(&marker, b"", &format!("Create folder: {dir}"), None)
            .await
        {
            Ok(_) => {
                info!(%dir, "folder created");
                Ok(())
            }
            Err(StoreError::Conflict { .. }) => {
                debug!(%dir, "folder marker already present");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

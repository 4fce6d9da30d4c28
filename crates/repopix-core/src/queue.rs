//! Batch uploads: folder traversal and a sequential upload queue.

use repopix_store::ContentStore;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::error::Result;
use crate::host::ImageHost;
use crate::image::is_image_name;

/// Callback invoked whenever an item changes state.
pub type ProgressCallback = Box<dyn Fn(&UploadItem) + Send + Sync>;

/// Lifecycle of a queued upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Success,
    Error,
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Uploading => write!(f, "uploading"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One file waiting to be uploaded.
#[derive(Debug, Clone, Serialize)]
pub struct UploadItem {
    /// Random identifier, unique within a session.
    pub id: Uuid,
    /// Local file to read.
    pub source: PathBuf,
    /// Name the file is uploaded under, before timestamping.
    pub file_name: String,
    /// Directory chain below the category, for folder uploads.
    pub subfolder: Option<String>,
    pub status: UploadStatus,
    /// Completion percentage; only 0 or 100 since transfers are not metered.
    pub progress: u8,
    pub error: Option<String>,
    /// Public URL once uploaded.
    pub url: Option<String>,
}

impl UploadItem {
    /// A pending item for `source`.
    #[must_use]
    pub fn new(source: PathBuf, subfolder: Option<String>) -> Self {
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            id: Uuid::new_v4(),
            source,
            file_name,
            subfolder,
            status: UploadStatus::Pending,
            progress: 0,
            error: None,
            url: None,
        }
    }

    /// Returns true once the item has succeeded or failed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.status, UploadStatus::Success | UploadStatus::Error)
    }
}

/// Expands files and folders into upload items.
///
/// Folders are walked iteratively in name order. Each file's subfolder is the
/// dropped folder's own name followed by its parent directories inside it.
/// Files without an image extension are skipped.
///
/// # Errors
///
/// Returns [`crate::HostError::Io`] if a path cannot be read.
pub fn collect_uploads<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<UploadItem>> {
    let mut items = Vec::new();

    for path in paths {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;

        if metadata.is_file() {
            push_image(&mut items, path.to_path_buf(), None);
            continue;
        }

        let folder = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry.path().strip_prefix(path).unwrap_or(entry.path());
            let mut segments: Vec<String> = Vec::new();
            if !folder.is_empty() {
                segments.push(folder.clone());
            }
            if let Some(parent) = relative.parent() {
                segments.extend(
                    parent
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned()),
                );
            }

            let subfolder = (!segments.is_empty()).then(|| segments.join("/"));
            push_image(&mut items, entry.into_path(), subfolder);
        }
    }

    debug!(count = items.len(), "collected uploads");
    Ok(items)
}

fn push_image(items: &mut Vec<UploadItem>, source: PathBuf, subfolder: Option<String>) {
    let item = UploadItem::new(source, subfolder);
    if is_image_name(&item.file_name) {
        items.push(item);
    } else {
        debug!(path = ?item.source, "skipping non-image file");
    }
}

/// Outcome of a queue run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// Items that had already succeeded before this run.
    pub skipped: usize,
}

/// Uploads items strictly one at a time.
#[derive(Default)]
pub struct UploadQueue {
    items: Vec<UploadItem>,
    callback: Option<ProgressCallback>,
}

impl UploadQueue {
    /// Creates an empty queue reporting state changes to `callback`.
    #[must_use]
    pub fn with_callback(callback: ProgressCallback) -> Self {
        Self {
            items: Vec::new(),
            callback: Some(callback),
        }
    }

    /// Appends items.
    pub fn extend(&mut self, items: impl IntoIterator<Item = UploadItem>) {
        self.items.extend(items);
    }

    #[must_use]
    pub fn items(&self) -> &[UploadItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drops items that succeeded or failed.
    pub fn clear_finished(&mut self) {
        self.items.retain(|item| !item.is_finished());
    }

    /// Uploads every pending or failed item into `category`.
    ///
    /// A failure is recorded on its item and the run continues with the next.
    pub async fn run<S: ContentStore>(
        &mut self,
        host: &ImageHost<S>,
        category: Option<&str>,
    ) -> UploadSummary {
        let Self { items, callback } = self;
        let callback = callback.as_ref();
        let notify = |item: &UploadItem| {
            if let Some(cb) = callback {
                cb(item);
            }
        };

        let mut summary = UploadSummary::default();
        for item in items.iter_mut() {
            if item.status == UploadStatus::Success {
                summary.skipped += 1;
                continue;
            }

            item.status = UploadStatus::Uploading;
            item.progress = 0;
            item.error = None;
            notify(item);

            match upload_one(host, item, category).await {
                Ok(url) => {
                    item.status = UploadStatus::Success;
                    item.progress = 100;
                    item.url = Some(url);
                    summary.succeeded += 1;
                }
                Err(e) => {
                    warn!(file = %item.file_name, error = %e, "upload failed");
                    item.status = UploadStatus::Error;
                    item.error = Some(e.to_string());
                    summary.failed += 1;
                }
            }
            notify(item);
        }

        summary
    }
}

async fn upload_one<S: ContentStore>(
    host: &ImageHost<S>,
    item: &UploadItem,
    category: Option<&str>,
) -> Result<String> {
    let content = tokio::fs::read(&item.source).await?;
    host.upload(&content, &item.file_name, category, item.subfolder.as_deref())
        .await
}

//! Categories: immediate subdirectories of the content root.

use repopix_store::{ContentStore, ContentsResponse};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::join_path;
use crate::error::{HostError, Result};
use crate::host::ImageHost;
use crate::validation::validate_category_name;

/// Identifier of the implicit category for content directly under the root.
pub const DEFAULT_CATEGORY_ID: &str = "default";
/// Display name of the implicit category.
pub const UNCATEGORIZED: &str = "Uncategorized";
/// Placeholder that keeps an otherwise empty directory alive.
pub const MARKER_FILE: &str = ".keep";
/// Placeholder name used by repositories created with older tooling.
pub const LEGACY_MARKER_FILE: &str = ".gitkeep";

/// A named grouping of images backed by a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Stable identifier (content hash, or [`DEFAULT_CATEGORY_ID`]).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Full repository path of the directory.
    pub path: String,
}

impl Category {
    /// The implicit category covering files directly under `root`.
    #[must_use]
    pub fn uncategorized(root: &str) -> Self {
        Self {
            id: DEFAULT_CATEGORY_ID.to_string(),
            name: UNCATEGORIZED.to_string(),
            path: root.to_string(),
        }
    }

    /// Returns true for the implicit category.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_CATEGORY_ID
    }
}

/// Returns true if `name` is a directory placeholder.
#[must_use]
pub fn is_marker_file(name: &str) -> bool {
    name == MARKER_FILE || name == LEGACY_MARKER_FILE
}

impl<S: ContentStore> ImageHost<S> {
    /// Lists categories, the implicit default category always first.
    ///
    /// A missing root, or a root that is a file, yields only the default
    /// category. Rejected credentials propagate as a configuration error.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Configuration`] if owner or repository is unset or
    /// the store refuses the credentials.
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.config().ensure_readable()?;
        let root = self.config().root.as_str();
        let mut categories = vec![Category::uncategorized(root)];

        let entries = match self.store().get_content(root).await {
            Ok(ContentsResponse::Directory(entries)) => entries,
            Ok(ContentsResponse::File(_)) => {
                debug!(%root, "content root is a file");
                return Ok(categories);
            }
            Err(e) if e.is_not_found() => {
                debug!(%root, "content root does not exist yet");
                return Ok(categories);
            }
            Err(e) if e.is_unauthorized() => return Err(e.into()),
            Err(e) => {
                warn!(%root, error = %e, "failed to list content root, using default category only");
                return Ok(categories);
            }
        };

        categories.extend(entries.into_iter().filter(|e| e.is_dir()).map(|dir| Category {
            id: dir.sha,
            name: dir.name,
            path: dir.path,
        }));
        Ok(categories)
    }

    /// Creates a category by committing `{root}/{name}/.keep`.
    ///
    /// Creating a category that already exists overwrites its marker.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Validation`] for an unusable name,
    /// [`HostError::Configuration`] if the write credential is missing, and
    /// store errors otherwise.
    pub async fn create_category(&self, name: &str) -> Result<Category> {
        let name = name.trim();
        validate_category_name(name)?;
        self.config().ensure_writable()?;

        let dir = self.config().path_under_root(name);
        let marker = join_path(&dir, MARKER_FILE);

        let existing = match self.store().get_content(&marker).await {
            Ok(ContentsResponse::File(entry)) => Some(entry.sha),
            Ok(ContentsResponse::Directory(_)) => {
                return Err(HostError::NotAFile(marker));
            }
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e.into()),
        };

        let written = self
            .store()
            .put_file(
                &marker,
                b"",
                &format!("Create category: {name}"),
                existing.as_deref(),
            )
            .await?;
        info!(category = %name, path = %dir, "category created");

        let id = match self.store().get_content(&dir).await? {
            ContentsResponse::Directory(entries) => entries
                .into_iter()
                .find(|e| e.name == MARKER_FILE)
                .map_or(written.sha, |e| e.sha),
            ContentsResponse::File(_) => written.sha,
        };

        Ok(Category {
            id,
            name: name.to_string(),
            path: dir,
        })
    }
}

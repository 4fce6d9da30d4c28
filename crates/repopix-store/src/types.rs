//! Repository contents wire types.

use serde::{Deserialize, Serialize};

/// Content type for repository entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Regular file.
    File,
    /// Directory.
    Dir,
    /// Symbolic link.
    Symlink,
    /// Git submodule.
    Submodule,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Dir => write!(f, "dir"),
            Self::Symlink => write!(f, "symlink"),
            Self::Submodule => write!(f, "submodule"),
        }
    }
}

/// A content entry (file or directory) in a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    /// Entry type.
    #[serde(rename = "type")]
    pub content_type: ContentType,
    /// Size in bytes (0 for directories).
    #[serde(default)]
    pub size: u64,
    /// Entry name (filename or directory name).
    pub name: String,
    /// Full path from repository root.
    pub path: String,
    /// Content hash of the entry's current version.
    pub sha: String,
    /// URL to download raw content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    /// URL to view in web UI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
    /// Encoding of `content` (usually "base64").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    /// Encoded content, only present for single-file reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ContentEntry {
    /// Create a new file entry.
    pub fn file(name: String, path: String, sha: String, size: u64) -> Self {
        Self {
            content_type: ContentType::File,
            size,
            name,
            path,
            sha,
            download_url: None,
            html_url: None,
            encoding: None,
            content: None,
        }
    }

    /// Create a new directory entry.
    pub fn dir(name: String, path: String, sha: String) -> Self {
        Self {
            content_type: ContentType::Dir,
            size: 0,
            name,
            path,
            sha,
            download_url: None,
            html_url: None,
            encoding: None,
            content: None,
        }
    }

    /// Set the download URL.
    #[must_use]
    pub fn with_download_url(mut self, url: String) -> Self {
        self.download_url = Some(url);
        self
    }

    /// Returns true if this is a directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.content_type == ContentType::Dir
    }

    /// Returns true if this is a file.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.content_type == ContentType::File
    }
}

/// Contents response - either a single file or a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentsResponse {
    /// Directory listing.
    Directory(Vec<ContentEntry>),
    /// Single entry.
    File(ContentEntry),
}

impl ContentsResponse {
    /// Returns the listing if this response is a directory.
    #[must_use]
    pub fn into_directory(self) -> Option<Vec<ContentEntry>> {
        match self {
            Self::Directory(entries) => Some(entries),
            Self::File(_) => None,
        }
    }

    /// Returns the entry if this response is a single file.
    #[must_use]
    pub fn into_file(self) -> Option<ContentEntry> {
        match self {
            Self::File(entry) => Some(entry),
            Self::Directory(_) => None,
        }
    }
}

/// Body of a create-or-update file request.
#[derive(Debug, Clone, Serialize)]
pub struct PutFileRequest {
    /// Commit message.
    pub message: String,
    /// Base64-encoded file content.
    pub content: String,
    /// Target branch.
    pub branch: String,
    /// Current content hash when overwriting an existing file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// Body of a delete file request.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteFileRequest {
    /// Commit message.
    pub message: String,
    /// Current content hash of the file.
    pub sha: String,
    /// Target branch.
    pub branch: String,
}

/// Commit reference returned by write operations.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitRef {
    /// Commit SHA.
    pub sha: String,
}

/// Response to a create-or-update file request.
#[derive(Debug, Clone, Deserialize)]
pub struct PutFileResponse {
    /// Descriptor of the written file.
    pub content: ContentEntry,
    /// Commit that recorded the write.
    pub commit: CommitRef,
}

/// Error body returned by the remote API.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiMessage {
    pub(crate) message: String,
}

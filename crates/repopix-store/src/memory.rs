//! In-memory content store.
//!
//! Mirrors the contract of the remote store closely enough to exercise the
//! orchestration layer without a network: directories exist only while they
//! contain files, content hashes are git blob hashes, and overwrites or
//! deletes with a stale hash are rejected.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use sha1::{Digest, Sha1};
use std::collections::{BTreeMap, HashMap};

use crate::error::{Result, StoreError};
use crate::traits::ContentStore;
use crate::types::{ContentEntry, ContentsResponse};

/// A remote call observed by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `get_content(path)`.
    Get(String),
    /// `put_file(path, ..)`.
    Put(String),
    /// `delete_file(path, ..)`.
    Delete(String),
}

/// An in-memory, single-branch content store.
pub struct MemoryStore {
    files: RwLock<BTreeMap<String, Bytes>>,
    failures: RwLock<HashMap<String, u16>>,
    calls: RwLock<Vec<StoreCall>>,
    download_base: Option<String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            files: RwLock::new(BTreeMap::new()),
            failures: RwLock::new(HashMap::new()),
            calls: RwLock::new(Vec::new()),
            download_base: None,
        }
    }

    /// Sets the prefix used to build `download_url` for file entries.
    #[must_use]
    pub fn with_download_base(mut self, base: impl Into<String>) -> Self {
        self.download_base = Some(base.into().trim_end_matches('/').to_string());
        self
    }

    /// Seeds a file directly, without recording a call.
    pub fn insert(&self, path: &str, content: impl Into<Bytes>) {
        self.files.write().insert(normalize(path), content.into());
    }

    /// Makes every `get_content` on `path` fail with the given status.
    pub fn fail_reads(&self, path: &str, status: u16) {
        self.failures.write().insert(normalize(path), status);
    }

    /// Returns the stored bytes at `path`, if it is a file.
    #[must_use]
    pub fn read(&self, path: &str) -> Option<Bytes> {
        self.files.read().get(&normalize(path)).cloned()
    }

    /// Returns true if `path` is a file.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.files.read().contains_key(&normalize(path))
    }

    /// Returns the calls observed so far.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.read().clone()
    }

    /// Forgets the recorded calls.
    pub fn clear_calls(&self) {
        self.calls.write().clear();
    }

    /// Computes the git blob hash of `data`.
    #[must_use]
    pub fn blob_sha(data: &[u8]) -> String {
        let header = format!("blob {}\0", data.len());
        let mut hasher = Sha1::new();
        hasher.update(header.as_bytes());
        hasher.update(data);
        hex::encode(hasher.finalize())
    }

    fn record(&self, call: StoreCall) {
        self.calls.write().push(call);
    }

    fn file_entry(&self, path: &str, data: &[u8]) -> ContentEntry {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        let entry = ContentEntry::file(name, path.to_string(), Self::blob_sha(data), data.len() as u64);
        match &self.download_base {
            Some(base) => entry.with_download_url(format!("{base}/{path}")),
            None => entry,
        }
    }

    fn is_dir(files: &BTreeMap<String, Bytes>, path: &str) -> bool {
        if path.is_empty() {
            return !files.is_empty();
        }
        let prefix = format!("{path}/");
        files
            .range(prefix.clone()..)
            .next()
            .is_some_and(|(k, _)| k.starts_with(&prefix))
    }

    fn list_dir(&self, files: &BTreeMap<String, Bytes>, path: &str) -> Vec<ContentEntry> {
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{path}/")
        };

        let mut entries: Vec<ContentEntry> = Vec::new();
        let mut subdirs: BTreeMap<String, Sha1> = BTreeMap::new();

        for (key, data) in files.range(prefix.clone()..) {
            let Some(rest) = key.strip_prefix(&prefix) else {
                break;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    let hasher = subdirs.entry(dir.to_string()).or_default();
                    hasher.update(rest.as_bytes());
                    hasher.update(Self::blob_sha(data).as_bytes());
                }
                None => entries.push(self.file_entry(key, data)),
            }
        }

        let dirs = subdirs.into_iter().map(|(name, hasher)| {
            let path = format!("{prefix}{name}");
            ContentEntry::dir(name, path, hex::encode(hasher.finalize()))
        });

        let mut listing: Vec<ContentEntry> = dirs.chain(entries).collect();
        listing.sort_by(|a, b| a.name.cmp(&b.name));
        listing
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn get_content(&self, path: &str) -> Result<ContentsResponse> {
        let path = normalize(path);
        self.record(StoreCall::Get(path.clone()));

        if let Some(status) = self.failures.read().get(&path).copied() {
            return Err(StoreError::Api {
                status,
                message: "injected failure".to_string(),
            });
        }

        let files = self.files.read();
        if let Some(data) = files.get(&path) {
            return Ok(ContentsResponse::File(self.file_entry(&path, data)));
        }
        if Self::is_dir(&files, &path) {
            return Ok(ContentsResponse::Directory(self.list_dir(&files, &path)));
        }
        Err(StoreError::NotFound(path))
    }

    async fn put_file(
        &self,
        path: &str,
        content: &[u8],
        _message: &str,
        sha: Option<&str>,
    ) -> Result<ContentEntry> {
        let path = normalize(path);
        self.record(StoreCall::Put(path.clone()));

        let mut files = self.files.write();
        if Self::is_dir(&files, &path) {
            return Err(StoreError::Conflict {
                path,
                message: "path is a directory".to_string(),
            });
        }

        match (files.get(&path), sha) {
            (Some(_), None) => {
                return Err(StoreError::Conflict {
                    path,
                    message: "\"sha\" wasn't supplied".to_string(),
                });
            }
            (Some(existing), Some(sha)) if Self::blob_sha(existing) != sha => {
                return Err(StoreError::Conflict {
                    path,
                    message: format!("does not match {sha}"),
                });
            }
            (None, Some(sha)) => {
                return Err(StoreError::Conflict {
                    path,
                    message: format!("no file to overwrite at {sha}"),
                });
            }
            _ => {}
        }

        files.insert(path.clone(), Bytes::copy_from_slice(content));
        Ok(self.file_entry(&path, content))
    }

    async fn delete_file(&self, path: &str, _message: &str, sha: &str) -> Result<()> {
        let path = normalize(path);
        self.record(StoreCall::Delete(path.clone()));

        let mut files = self.files.write();
        let Some(existing) = files.get(&path) else {
            return Err(StoreError::NotFound(path));
        };
        if Self::blob_sha(existing) != sha {
            return Err(StoreError::Conflict {
                path,
                message: format!("does not match {sha}"),
            });
        }
        files.remove(&path);
        Ok(())
    }
}

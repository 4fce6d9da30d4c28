//! The image host: configuration plus a content store.

use repopix_store::{ContentStore, GitHubStore};

use crate::config::RepositoryConfig;
use crate::error::Result;

/// Entry point for every repository-backed operation.
///
/// Holds no state beyond the configuration and the store handle; each
/// operation re-derives categories and listings from the remote store.
pub struct ImageHost<S> {
    config: RepositoryConfig,
    store: S,
}

impl<S: ContentStore> ImageHost<S> {
    /// Creates a host over an existing store.
    pub fn new(config: RepositoryConfig, store: S) -> Self {
        Self { config, store }
    }

    /// Returns the repository configuration.
    #[must_use]
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl ImageHost<GitHubStore> {
    /// Creates a host talking to the GitHub Contents API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn github(config: RepositoryConfig) -> Result<Self> {
        let store = GitHubStore::new(
            config.owner.clone(),
            config.repo.clone(),
            config.branch.clone(),
            config.token.clone(),
        )?
        .with_api_url(config.api_url.clone());
        Ok(Self::new(config, store))
    }
}

//! Repository configuration.
//!
//! Read once at startup from an optional file layered beneath `GITHUB_*`
//! environment variables, then treated as immutable.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{HostError, Result};

/// Host serving raw file content for derived public URLs.
pub const RAW_CONTENT_HOST: &str = "raw.githubusercontent.com";

/// Environment variable prefix for repository settings.
pub const ENV_PREFIX: &str = "GITHUB";

/// Where images live and how to reach them.
#[derive(Clone, Deserialize, Serialize)]
pub struct RepositoryConfig {
    /// Repository owner (user or organization).
    #[serde(default)]
    pub owner: String,
    /// Repository name.
    #[serde(default)]
    pub repo: String,
    /// Branch every operation is scoped to.
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Content root holding the images; immediate subdirectories are categories.
    #[serde(default = "default_root", rename = "path")]
    pub root: String,
    /// Write credential.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    /// Contents API endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_root() -> String {
    "images".to_string()
}

fn default_api_url() -> String {
    repopix_store::DEFAULT_API_URL.to_string()
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            branch: default_branch(),
            root: default_root(),
            token: None,
            api_url: default_api_url(),
        }
    }
}

impl std::fmt::Debug for RepositoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryConfig")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("root", &self.root)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl RepositoryConfig {
    /// Creates a configuration for `owner/repo` with default branch and root.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            ..Self::default()
        }
    }

    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Configuration`] if a source cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::load(None, None)
    }

    /// Loads configuration from an optional file and the environment.
    ///
    /// `env` replaces the process environment when given, which keeps tests
    /// independent of the host shell.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Configuration`] if a source cannot be parsed.
    pub fn load(file: Option<&Path>, env: Option<config::Map<String, String>>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).source(env));

        let mut cfg: Self = builder.build()?.try_deserialize()?;
        cfg.root = normalize_root(&cfg.root);
        if cfg.branch.trim().is_empty() {
            cfg.branch = default_branch();
        }
        tracing::debug!(config = ?cfg, "loaded repository configuration");
        Ok(cfg)
    }

    /// Sets the branch.
    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Sets the content root.
    #[must_use]
    pub fn with_root(mut self, root: &str) -> Self {
        self.root = normalize_root(root);
        self
    }

    /// Sets the write credential.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the Contents API endpoint.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Fails unless owner and repository name are set.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Configuration`] naming the missing variables.
    pub fn ensure_readable(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.owner.trim().is_empty() {
            missing.push("GITHUB_OWNER");
        }
        if self.repo.trim().is_empty() {
            missing.push("GITHUB_REPO");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(HostError::Configuration(format!(
                "repository configuration is incomplete, set {}",
                missing.join(", ")
            )))
        }
    }

    /// Fails unless owner, repository name and write credential are set.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Configuration`] naming the missing variables.
    pub fn ensure_writable(&self) -> Result<()> {
        self.ensure_readable()?;
        if self.token.as_deref().is_none_or(|t| t.trim().is_empty()) {
            return Err(HostError::Configuration(
                "repository configuration is incomplete, set GITHUB_TOKEN".to_string(),
            ));
        }
        Ok(())
    }

    /// Public raw-content URL of a repository path.
    ///
    /// Derived from the configuration alone; no remote round-trip.
    #[must_use]
    pub fn raw_url(&self, path: &str) -> String {
        format!(
            "https://{RAW_CONTENT_HOST}/{}/{}/{}/{}",
            self.owner, self.repo, self.branch, path
        )
    }

    /// Joins `segment` onto the content root.
    #[must_use]
    pub fn path_under_root(&self, segment: &str) -> String {
        join_path(&self.root, segment)
    }
}

/// Joins two repository path fragments with a single `/`.
#[must_use]
pub fn join_path(base: &str, segment: &str) -> String {
    let base = base.trim_end_matches('/');
    let segment = segment.trim_start_matches('/');
    match (base.is_empty(), segment.is_empty()) {
        (true, _) => segment.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{base}/{segment}"),
    }
}

fn normalize_root(root: &str) -> String {
    root.trim().trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> config::Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_load_applies_defaults() {
        let cfg = RepositoryConfig::load(
            None,
            Some(env(&[("GITHUB_OWNER", "octo"), ("GITHUB_REPO", "pics")])),
        )
        .unwrap();

        assert_eq!(cfg.owner, "octo");
        assert_eq!(cfg.repo, "pics");
        assert_eq!(cfg.branch, "main");
        assert_eq!(cfg.root, "images");
        assert!(cfg.token.is_none());
        assert_eq!(cfg.api_url, "https://api.github.com");
    }

    #[test]
    fn test_load_reads_all_variables() {
        let cfg = RepositoryConfig::load(
            None,
            Some(env(&[
                ("GITHUB_OWNER", "octo"),
                ("GITHUB_REPO", "pics"),
                ("GITHUB_BRANCH", "gh-pages"),
                ("GITHUB_PATH", "/assets/img/"),
                ("GITHUB_TOKEN", "ghp_secret"),
                ("GITHUB_API_URL", "https://ghe.example/api/v3"),
            ])),
        )
        .unwrap();

        assert_eq!(cfg.branch, "gh-pages");
        assert_eq!(cfg.root, "assets/img");
        assert_eq!(cfg.token.as_deref(), Some("ghp_secret"));
        assert_eq!(cfg.api_url, "https://ghe.example/api/v3");
        assert!(cfg.ensure_writable().is_ok());
    }

    #[test]
    fn test_file_is_layered_beneath_env() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("repopix.toml");
        std::fs::write(&file, "owner = \"from-file\"\nrepo = \"pics\"\npath = \"photos\"\n").unwrap();

        let cfg = RepositoryConfig::load(
            Some(&file),
            Some(env(&[("GITHUB_OWNER", "from-env")])),
        )
        .unwrap();

        assert_eq!(cfg.owner, "from-env");
        assert_eq!(cfg.repo, "pics");
        assert_eq!(cfg.root, "photos");
    }

    #[test]
    fn test_missing_identifiers_fail_fast() {
        let cfg = RepositoryConfig::load(None, Some(env(&[]))).unwrap();
        let err = cfg.ensure_readable().unwrap_err();
        assert!(err.to_string().contains("GITHUB_OWNER"));
        assert!(err.to_string().contains("GITHUB_REPO"));

        let cfg = RepositoryConfig::new("octo", "pics").with_token("  ");
        assert!(cfg.ensure_readable().is_ok());
        assert!(matches!(
            cfg.ensure_writable(),
            Err(HostError::Configuration(_))
        ));
    }

    #[test]
    fn test_raw_url_template() {
        let cfg = RepositoryConfig::new("octo", "pics").with_branch("main");
        assert_eq!(
            cfg.raw_url("images/Pets/1-a.png"),
            "https://raw.githubusercontent.com/octo/pics/main/images/Pets/1-a.png"
        );
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("images", "Pets"), "images/Pets");
        assert_eq!(join_path("images/", "/Pets"), "images/Pets");
        assert_eq!(join_path("", "Pets"), "Pets");
        assert_eq!(join_path("images", ""), "images");
    }

    #[test]
    fn test_debug_redacts_token() {
        let cfg = RepositoryConfig::new("octo", "pics").with_token("ghp_secret");
        let printed = format!("{cfg:?}");
        assert!(!printed.contains("ghp_secret"));
        assert!(printed.contains("REDACTED"));
    }
}

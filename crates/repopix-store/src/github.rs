//! GitHub Contents API implementation of [`ContentStore`].

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::traits::ContentStore;
use crate::types::{
    ApiMessage, ContentEntry, ContentsResponse, DeleteFileRequest, PutFileRequest,
    PutFileResponse,
};

/// Default GitHub REST API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Client for a single repository branch on the GitHub Contents API.
///
/// The client is cheaply cloneable and can be shared across tasks.
///
/// # Examples
///
/// ```rust,ignore
/// use repopix_store::{ContentStore, GitHubStore};
///
/// let store = GitHubStore::new("octocat", "pictures", "main", Some(token))?;
/// let listing = store.get_content("images").await?;
/// ```
#[derive(Clone)]
pub struct GitHubStore {
    http: Client,
    api_url: String,
    owner: String,
    repo: String,
    branch: String,
    token: Option<String>,
}

impl GitHubStore {
    /// Creates a client for `owner/repo` scoped to `branch`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Network`] if the HTTP client cannot be built.
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
        token: Option<String>,
    ) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("repopix/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            api_url: DEFAULT_API_URL.to_string(),
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
            token,
        })
    }

    /// Points the client at a different API endpoint (GitHub Enterprise, test servers).
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    fn contents_url(&self, path: &str) -> Result<Url> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| StoreError::InvalidRequest(format!("{}: {e}", self.api_url)))?;
        url.path_segments_mut()
            .map_err(|()| StoreError::InvalidRequest(format!("{} cannot be a base", self.api_url)))?
            .pop_if_empty()
            .extend(["repos", self.owner.as_str(), self.repo.as_str(), "contents"])
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut request = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn check(res: Response, path: &str) -> Result<Response> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        let body = res.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiMessage>(&body)
            .map(|m| m.message)
            .unwrap_or(body);

        Err(match status.as_u16() {
            401 | 403 => StoreError::Unauthorized {
                status: status.as_u16(),
                message,
            },
            404 => StoreError::NotFound(path.to_string()),
            409 | 422 => StoreError::Conflict {
                path: path.to_string(),
                message,
            },
            code => StoreError::Api {
                status: code,
                message,
            },
        })
    }
}

#[async_trait]
impl ContentStore for GitHubStore {
    async fn get_content(&self, path: &str) -> Result<ContentsResponse> {
        let url = self.contents_url(path)?;
        debug!(%path, branch = %self.branch, "GET contents");

        let res = self
            .request(Method::GET, url)
            .query(&[("ref", self.branch.as_str())])
            .send()
            .await?;
        let res = Self::check(res, path).await?;

        res.json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))
    }

    async fn put_file(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
        sha: Option<&str>,
    ) -> Result<ContentEntry> {
        let url = self.contents_url(path)?;
        let body = PutFileRequest {
            message: message.to_string(),
            content: STANDARD.encode(content),
            branch: self.branch.clone(),
            sha: sha.map(str::to_string),
        };
        debug!(%path, bytes = content.len(), overwrite = sha.is_some(), "PUT contents");

        let res = self.request(Method::PUT, url).json(&body).send().await?;
        let res = Self::check(res, path).await?;

        let written: PutFileResponse = res
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        debug!(%path, commit = %written.commit.sha, "file committed");
        Ok(written.content)
    }

    async fn delete_file(&self, path: &str, message: &str, sha: &str) -> Result<()> {
        let url = self.contents_url(path)?;
        let body = DeleteFileRequest {
            message: message.to_string(),
            sha: sha.to_string(),
            branch: self.branch.clone(),
        };
        debug!(%path, %sha, "DELETE contents");

        let res = self.request(Method::DELETE, url).json(&body).send().await?;
        Self::check(res, path).await?;
        Ok(())
    }
}

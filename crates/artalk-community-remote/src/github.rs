//! GitHub REST API client

use serde::Deserialize;

use crate::client::HttpClient;
use crate::config::Endpoints;
use crate::error::{FetchError, Result};

/// Headers the GitHub REST API expects on every call
const API_HEADERS: [(&str, &str); 2] = [
    ("Accept", "application/vnd.github+json"),
    ("X-GitHub-Api-Version", "2022-11-28"),
];

/// Repository metadata; the build only needs to know it exists
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryInfo {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub archived: bool,
}

/// A published release
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Find an asset by exact file name
    pub fn asset(&self, name: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|a| a.name == name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// Client for the GitHub REST API
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: HttpClient,
    api_base: String,
}

impl GitHubClient {
    /// `http` should carry the API token scoped to `api_base`
    pub fn new(http: HttpClient, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Client with its own connection pool, token scoped per `endpoints`
    pub fn from_endpoints(endpoints: &Endpoints) -> Result<Self> {
        let http = HttpClient::new(endpoints.github_credentials(), endpoints.timeout)?;
        Ok(Self::new(http, endpoints.github_api.clone()))
    }

    /// `GET /repos/<owner>/<repo>`
    pub async fn repository(&self, repo: &str) -> Result<RepositoryInfo> {
        let url = format!("{}/repos/{}", self.api_base, checked_repo(repo)?);
        self.http.get_json(&url, &API_HEADERS).await
    }

    /// `GET /repos/<owner>/<repo>/releases/latest`
    pub async fn latest_release(&self, repo: &str) -> Result<Release> {
        let url = format!(
            "{}/repos/{}/releases/latest",
            self.api_base,
            checked_repo(repo)?
        );
        self.http.get_json(&url, &API_HEADERS).await
    }

    /// Download a release asset's contents
    ///
    /// The token goes along when the asset sits under the download origin;
    /// redirects to another host drop it.
    pub async fn download_asset(&self, asset: &ReleaseAsset) -> Result<Vec<u8>> {
        self.http.get_bytes(&asset.browser_download_url, &[]).await
    }
}

/// `owner/repo` with exactly one slash and no empty halves
fn checked_repo(repo: &str) -> Result<&str> {
    match repo.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok(repo)
        }
        _ => Err(FetchError::InvalidUrl {
            url: repo.to_string(),
            reason: "expected <owner>/<repo>".to_string(),
        }),
    }
}

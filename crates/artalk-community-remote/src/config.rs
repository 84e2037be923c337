//! Remote endpoint configuration

use std::time::Duration;

use crate::client::{BearerToken, ScopedCredentials};

pub const DEFAULT_NPM_REGISTRY: &str = "https://registry.npmjs.org";
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";
/// Origin serving release assets (`browser_download_url`)
pub const DEFAULT_GITHUB_DOWNLOADS: &str = "https://github.com";
pub const DEFAULT_CDN: &str = "https://cdn.jsdelivr.net";
/// Repository whose releases carry the published `registry.json`
pub const DEFAULT_RELEASE_REPO: &str = "ArtalkJS/Community";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Base URLs and credentials for every remote the build talks to
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub npm_registry: String,
    pub github_api: String,
    pub github_downloads: String,
    /// CDN serving npm package files (`<cdn>/npm/<pkg>@<version>/<file>`)
    pub cdn: String,
    /// Bearer token for the GitHub API and release downloads only
    pub github_token: Option<String>,
    pub timeout: Duration,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            npm_registry: DEFAULT_NPM_REGISTRY.to_string(),
            github_api: DEFAULT_GITHUB_API.to_string(),
            github_downloads: DEFAULT_GITHUB_DOWNLOADS.to_string(),
            cdn: DEFAULT_CDN.to_string(),
            github_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Endpoints {
    /// Point npm, GitHub and the CDN at one base URL (mock servers)
    pub fn single_host(base: &str) -> Self {
        Self {
            npm_registry: format!("{}/npm-registry", base),
            github_api: format!("{}/github", base),
            github_downloads: format!("{}/downloads", base),
            cdn: format!("{}/cdn", base),
            ..Default::default()
        }
    }

    /// Set the GitHub token, ignoring blank values
    pub fn with_github_token(mut self, token: Option<String>) -> Self {
        self.github_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Token scopes for the GitHub API and release downloads
    pub fn github_credentials(&self) -> ScopedCredentials {
        let mut scoped = ScopedCredentials::default();
        if let Some(token) = &self.github_token {
            scoped.add(&self.github_api, BearerToken::new(token.clone()));
            scoped.add(&self.github_downloads, BearerToken::new(token.clone()));
        }
        scoped
    }

    /// Base URL for a package version on the CDN
    pub fn cdn_package_base(&self, package: &str, version: &str) -> String {
        format!("{}/npm/{}@{}", self.cdn.trim_end_matches('/'), package, version)
    }
}

//! Metadata source trait
//!
//! Provides a single interface over everything the builder asks of the
//! outside world, so builds can run against the live services or a mock.

use async_trait::async_trait;

use crate::client::HttpClient;
use crate::config::Endpoints;
use crate::error::Result;
use crate::github::{GitHubClient, RepositoryInfo};
use crate::integrity::{IntegrityResolver, SriAlgorithm};
use crate::npm::{NpmClient, PackageDocument};

/// Everything a registry build needs from npm, GitHub and the CDN
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// npm package document
    async fn package(&self, name: &str) -> Result<PackageDocument>;

    /// GitHub repository liveness check
    async fn repository(&self, repo: &str) -> Result<RepositoryInfo>;

    /// SRI digest of a file, empty when it cannot be fetched
    async fn integrity(&self, url: &str) -> String;

    /// `url` if the options schema exists, empty otherwise
    async fn options_schema(&self, url: &str) -> String;

    /// CDN base URL for a package version
    fn cdn_package_base(&self, package: &str, version: &str) -> String;
}

/// The live services
#[derive(Debug, Clone)]
pub struct RemoteSources {
    endpoints: Endpoints,
    npm: NpmClient,
    github: GitHubClient,
    resolver: IntegrityResolver,
}

impl RemoteSources {
    pub fn new(endpoints: Endpoints, algorithm: SriAlgorithm) -> Result<Self> {
        let http = HttpClient::new(endpoints.github_credentials(), endpoints.timeout)?;

        Ok(Self {
            npm: NpmClient::new(http.clone(), endpoints.npm_registry.clone()),
            github: GitHubClient::new(http.clone(), endpoints.github_api.clone()),
            resolver: IntegrityResolver::new(http, algorithm),
            endpoints,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn npm(&self) -> &NpmClient {
        &self.npm
    }

    pub fn github(&self) -> &GitHubClient {
        &self.github
    }
}

#[async_trait]
impl MetadataSource for RemoteSources {
    async fn package(&self, name: &str) -> Result<PackageDocument> {
        self.npm.package(name).await
    }

    async fn repository(&self, repo: &str) -> Result<RepositoryInfo> {
        self.github.repository(repo).await
    }

    async fn integrity(&self, url: &str) -> String {
        self.resolver.from_url(url).await
    }

    async fn options_schema(&self, url: &str) -> String {
        self.resolver.options_schema(url).await
    }

    fn cdn_package_base(&self, package: &str, version: &str) -> String {
        self.endpoints.cdn_package_base(package, version)
    }
}

//! In-memory metadata source for testing
//!
//! Records every call so tests can assert which lookups a build performed.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use crate::error::{FetchError, Result};
use crate::github::RepositoryInfo;
use crate::integrity::{SriAlgorithm, sri_digest};
use crate::npm::PackageDocument;
use crate::source::MetadataSource;

pub const MOCK_CDN: &str = "https://cdn.test";

/// Metadata source backed by in-memory maps
#[derive(Debug, Default)]
pub struct MockSource {
    packages: RwLock<HashMap<String, PackageDocument>>,
    repos: RwLock<HashSet<String>>,
    files: RwLock<HashMap<String, Vec<u8>>>,
    schemas: RwLock<HashSet<String>>,
    calls: RwLock<Vec<String>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package document (JSON as the npm registry would serve it)
    pub fn with_package(self, name: &str, document: serde_json::Value) -> Self {
        let doc: PackageDocument =
            serde_json::from_value(document).expect("mock package document");
        self.packages
            .write()
            .expect("lock")
            .insert(name.to_string(), doc);
        self
    }

    pub fn with_repo(self, repo: &str) -> Self {
        self.repos.write().expect("lock").insert(repo.to_string());
        self
    }

    pub fn with_file(self, url: &str, content: &[u8]) -> Self {
        self.files
            .write()
            .expect("lock")
            .insert(url.to_string(), content.to_vec());
        self
    }

    pub fn with_schema(self, url: &str) -> Self {
        self.schemas.write().expect("lock").insert(url.to_string());
        self
    }

    /// Every call made so far, as `<kind> <argument>`
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().expect("lock").clone()
    }

    /// Calls of one kind (`package`, `repository`, `integrity`, `options_schema`)
    pub fn calls_of(&self, kind: &str) -> Vec<String> {
        let prefix = format!("{} ", kind);
        self.calls()
            .into_iter()
            .filter_map(|c| c.strip_prefix(&prefix).map(String::from))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.write().expect("lock").clear();
    }

    fn record(&self, kind: &str, arg: &str) {
        self.calls
            .write()
            .expect("lock")
            .push(format!("{} {}", kind, arg));
    }
}

#[async_trait]
impl MetadataSource for MockSource {
    async fn package(&self, name: &str) -> Result<PackageDocument> {
        self.record("package", name);
        self.packages
            .read()
            .expect("lock")
            .get(name)
            .cloned()
            .ok_or_else(|| FetchError::HttpError {
                status: 404,
                url: format!("mock://npm/{}", name),
            })
    }

    async fn repository(&self, repo: &str) -> Result<RepositoryInfo> {
        self.record("repository", repo);
        if self.repos.read().expect("lock").contains(repo) {
            Ok(RepositoryInfo {
                full_name: repo.to_string(),
                html_url: format!("https://github.com/{}", repo),
                archived: false,
            })
        } else {
            Err(FetchError::HttpError {
                status: 404,
                url: format!("mock://github/repos/{}", repo),
            })
        }
    }

    async fn integrity(&self, url: &str) -> String {
        self.record("integrity", url);
        self.files
            .read()
            .expect("lock")
            .get(url)
            .map(|content| sri_digest(content, SriAlgorithm::Sha512))
            .unwrap_or_default()
    }

    async fn options_schema(&self, url: &str) -> String {
        self.record("options_schema", url);
        if self.schemas.read().expect("lock").contains(url) {
            url.to_string()
        } else {
            String::new()
        }
    }

    fn cdn_package_base(&self, package: &str, version: &str) -> String {
        format!("{}/npm/{}@{}", MOCK_CDN, package, version)
    }
}

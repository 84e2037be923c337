//! npm registry client
//!
//! Only the parts of the packument the registry build needs are decoded:
//! dist-tags, per-version manifests and publish times. Manifests stay raw
//! until one is asked for, so an odd historical version never spoils the
//! whole document.

use serde::Deserialize;
use std::collections::HashMap;

use crate::client::HttpClient;
use crate::error::Result;

/// Peer dependency naming the Artalk client
pub const ARTALK_PEER: &str = "artalk";

/// Package document returned by `GET <registry>/<name>`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageDocument {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "dist-tags", default)]
    pub dist_tags: HashMap<String, String>,

    #[serde(default)]
    pub versions: HashMap<String, serde_json::Value>,

    /// Publish times by version, plus `created` / `modified`
    #[serde(default)]
    pub time: HashMap<String, serde_json::Value>,
}

impl PackageDocument {
    /// Version behind the `latest` dist-tag
    pub fn latest(&self) -> Option<&str> {
        self.dist_tags.get("latest").map(String::as_str)
    }

    /// Manifest of one published version
    pub fn manifest(&self, version: &str) -> Option<VersionManifest> {
        self.versions.get(version).map(VersionManifest::from_value)
    }

    /// When `version` was published, as npm reports it
    pub fn published_at(&self, version: &str) -> Option<&str> {
        self.time.get(version).and_then(|t| t.as_str())
    }
}

/// package.json of one published version
#[derive(Debug, Clone, Default)]
pub struct VersionManifest {
    pub main: Option<String>,
    pub peer_dependencies: Option<HashMap<String, String>>,
}

impl VersionManifest {
    /// Read `main` and `peerDependencies` from a raw manifest
    ///
    /// Values of an unexpected shape read as absent.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let main = value
            .get("main")
            .and_then(|m| m.as_str())
            .map(String::from);
        let peer_dependencies = value
            .get("peerDependencies")
            .and_then(|p| p.as_object())
            .map(|deps| {
                deps.iter()
                    .filter_map(|(name, range)| Some((name.clone(), range.as_str()?.to_string())))
                    .collect()
            });
        Self {
            main,
            peer_dependencies,
        }
    }

    /// Main file relative to the package root
    ///
    /// A single leading `./` or `/` is stripped; an empty result is `None`.
    pub fn main_file(&self) -> Option<&str> {
        let main = self.main.as_deref()?;
        let main = main
            .strip_prefix("./")
            .or_else(|| main.strip_prefix('/'))
            .unwrap_or(main);
        (!main.is_empty()).then_some(main)
    }

    /// Declared `artalk` peer dependency range
    pub fn artalk_peer_range(&self) -> Option<&str> {
        self.peer_dependencies
            .as_ref()?
            .get(ARTALK_PEER)
            .map(String::as_str)
    }

    /// Lowest Artalk version the package supports
    ///
    /// Everything but digits and dots is dropped from the peer range, so
    /// `^2.1.0` becomes `2.1.0`.
    pub fn min_artalk_version(&self) -> Option<String> {
        self.artalk_peer_range().map(|range| {
            range
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect()
        })
    }
}

/// Client for the npm registry
#[derive(Debug, Clone)]
pub struct NpmClient {
    http: HttpClient,
    registry: String,
}

impl NpmClient {
    pub fn new(http: HttpClient, registry: impl Into<String>) -> Self {
        Self {
            http,
            registry: registry.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the package document
    pub async fn package(&self, name: &str) -> Result<PackageDocument> {
        let url = format!("{}/{}", self.registry, name);
        self.http.get_json(&url, &[]).await
    }
}

//! Entry and catalog types
//!
//! `LocalEntry` is what maintainers write in `plugins.yaml` / `themes.yaml`.
//! `RegistryEntry` is what the client reads from `registry.json`: the local
//! fields plus everything resolved from npm and the CDN.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::Result;

/// npm scope reserved for packages maintained by the Artalk team
pub const VERIFIED_SCOPE: &str = "@artalk/";

/// Fields every local entry must declare with a non-blank value
pub const REQUIRED_FIELDS: [&str; 7] = [
    "id",
    "name",
    "description",
    "github_repo",
    "npm_package",
    "author_name",
    "author_link",
];

/// Which list an entry belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    #[default]
    Plugin,
    Theme,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Plugin => "plugin",
            EntryKind::Theme => "theme",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hand-authored plugin or theme declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    /// `owner/name` on GitHub
    pub github_repo: String,
    /// Package name as published on npm
    pub npm_package: String,
    pub author_name: String,
    pub author_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donate_link: Option<String>,
}

impl LocalEntry {
    /// Whether the package is published under the reserved `@artalk/` scope
    pub fn is_verified(&self) -> bool {
        self.npm_package.starts_with(VERIFIED_SCOPE)
    }

    /// Link to the GitHub repository
    pub fn repo_link(&self) -> String {
        format!("https://github.com/{}", self.github_repo)
    }
}

/// A catalog entry as published in `registry.json`
///
/// Field order is part of the artifact: it decides the byte layout the diff
/// check compares against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub id: String,
    pub name: String,
    pub description: String,
    pub author_name: String,
    pub author_link: String,
    pub donate_link: String,
    pub repo_name: String,
    pub repo_link: String,
    pub npm_name: String,
    pub verified: bool,
    pub version: String,
    /// CDN URL of the package's main file
    pub source: String,
    /// Subresource integrity digest of `source`
    pub integrity: String,
    /// URL of `artalk-plugin-options.schema.json`, empty when the package has none
    pub options_schema: String,
    /// Publish time of `version` as reported by npm
    pub updated_at: String,
    pub min_artalk_version: String,
}

impl RegistryEntry {
    /// Descriptive fields of a local entry, with nothing resolved yet
    pub fn from_local(local: &LocalEntry, kind: EntryKind) -> Self {
        Self {
            id: local.id.clone(),
            name: local.name.clone(),
            description: local.description.clone(),
            author_name: local.author_name.clone(),
            author_link: local.author_link.clone(),
            donate_link: local.donate_link.clone().unwrap_or_default(),
            repo_name: local.github_repo.clone(),
            repo_link: local.repo_link(),
            npm_name: local.npm_package.clone(),
            verified: local.is_verified(),
            kind,
            ..Default::default()
        }
    }
}

/// The published catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryData {
    #[serde(default)]
    pub plugins: Vec<RegistryEntry>,
    #[serde(default)]
    pub themes: Vec<RegistryEntry>,
}

impl RegistryData {
    /// Entries of one kind
    pub fn entries(&self, kind: EntryKind) -> &[RegistryEntry] {
        match kind {
            EntryKind::Plugin => &self.plugins,
            EntryKind::Theme => &self.themes,
        }
    }

    /// Find an entry by id within its own list
    pub fn find(&self, kind: EntryKind, id: &str) -> Option<&RegistryEntry> {
        self.entries(kind).iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.plugins.len() + self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty() && self.themes.is_empty()
    }

    /// Parse a catalog from JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Load a catalog file
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_slice(&bytes)
    }

    /// Render the catalog exactly as it is written to disk
    ///
    /// Two-space indentation with a trailing newline.
    pub fn to_json_pretty(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Write the catalog, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

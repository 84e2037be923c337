//! Locations of the declarative lists and the built catalog
//!
//! Everything is relative to a repository root:
//! `plugins.yaml`, `themes.yaml` and `dist/registry.json`.

use std::path::{Path, PathBuf};

use crate::entry::EntryKind;

pub const PLUGINS_FILE: &str = "plugins.yaml";
pub const THEMES_FILE: &str = "themes.yaml";
pub const REGISTRY_FILE: &str = "registry.json";
pub const DIST_DIR: &str = "dist";

/// Resolved file locations for one registry checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryPaths {
    pub plugins: PathBuf,
    pub themes: PathBuf,
    /// Built catalog, also read back as the build cache
    pub output: PathBuf,
}

impl RegistryPaths {
    /// Default layout under `root`
    pub fn from_root(root: &Path) -> Self {
        Self {
            plugins: root.join(PLUGINS_FILE),
            themes: root.join(THEMES_FILE),
            output: root.join(DIST_DIR).join(REGISTRY_FILE),
        }
    }

    /// Override individual locations
    pub fn with_overrides(
        mut self,
        plugins: Option<PathBuf>,
        themes: Option<PathBuf>,
        output: Option<PathBuf>,
    ) -> Self {
        if let Some(p) = plugins {
            self.plugins = p;
        }
        if let Some(p) = themes {
            self.themes = p;
        }
        if let Some(p) = output {
            self.output = p;
        }
        self
    }

    /// The list file for a kind of entry
    pub fn list(&self, kind: EntryKind) -> &Path {
        match kind {
            EntryKind::Plugin => &self.plugins,
            EntryKind::Theme => &self.themes,
        }
    }
}

impl Default for RegistryPaths {
    fn default() -> Self {
        Self::from_root(Path::new("."))
    }
}

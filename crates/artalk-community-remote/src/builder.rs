//! Registry builder
//!
//! Turns the declarative lists into the published catalog:
//! - every entry is built concurrently and independently
//! - an entry whose metadata cannot be resolved is dropped, never fatal
//! - an entry whose `latest` version matches the previous catalog reuses the
//!   previously resolved fields without touching GitHub or the CDN

use futures::future::join_all;
use std::path::Path;
use std::time::Instant;

use artalk_community_core::{
    EntryKind, LocalEntry, RegistryData, RegistryEntry, RegistryPaths, read_entries,
};

use crate::error::BuildError;
use crate::integrity::options_schema_url;
use crate::progress::{BuildEvent, Reporter};
use crate::source::MetadataSource;

/// The previous build's catalog, read once before building
///
/// Consulted by every entry build, never modified.
#[derive(Debug, Clone, Default)]
pub struct RegistryCache {
    data: RegistryData,
}

impl RegistryCache {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_data(data: RegistryData) -> Self {
        Self { data }
    }

    /// Load the catalog at `path`
    ///
    /// A missing or unreadable catalog gives an empty cache.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!("No previous catalog at {}", path.display());
            return Self::empty();
        }
        match RegistryData::load(path) {
            Ok(data) => {
                tracing::debug!(
                    "Loaded {} cached entries from {}",
                    data.len(),
                    path.display()
                );
                Self { data }
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable catalog {}: {}", path.display(), e);
                Self::empty()
            }
        }
    }

    pub fn lookup(&self, kind: EntryKind, id: &str) -> Option<&RegistryEntry> {
        self.data.find(kind, id)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Read both declarative lists as typed entries
///
/// Items that are not well-formed entries are reported and skipped; run the
/// validator to see why.
pub fn load_local_entries(
    paths: &RegistryPaths,
    reporter: &dyn Reporter,
) -> Result<Vec<(EntryKind, LocalEntry)>, BuildError> {
    let mut entries = Vec::new();

    for kind in [EntryKind::Plugin, EntryKind::Theme] {
        let path = paths.list(kind);
        for raw in read_entries(path)? {
            match raw.to_local() {
                Ok(local) => entries.push((kind, local)),
                Err(e) => {
                    let subject = path.display().to_string();
                    let reason = e.to_string();
                    reporter.report(BuildEvent::Failed {
                        subject: &subject,
                        reason: &reason,
                    });
                }
            }
        }
    }

    Ok(entries)
}

/// Builds catalog entries against a metadata source and a cache snapshot
pub struct RegistryBuilder<'a> {
    source: &'a dyn MetadataSource,
    cache: &'a RegistryCache,
    reporter: &'a dyn Reporter,
}

impl<'a> RegistryBuilder<'a> {
    pub fn new(
        source: &'a dyn MetadataSource,
        cache: &'a RegistryCache,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            source,
            cache,
            reporter,
        }
    }

    fn fail(&self, subject: &str, reason: impl AsRef<str>) -> Option<RegistryEntry> {
        self.reporter.report(BuildEvent::Failed {
            subject,
            reason: reason.as_ref(),
        });
        None
    }

    /// Build one entry
    ///
    /// `Ok(None)` means the entry was dropped. An error means the package is
    /// structurally broken and the whole build must stop.
    pub async fn build_entry(
        &self,
        local: &LocalEntry,
        kind: EntryKind,
    ) -> Result<Option<RegistryEntry>, BuildError> {
        let started = Instant::now();
        let package = &local.npm_package;

        let document = match self.source.package(package).await {
            Ok(doc) => doc,
            Err(e) => return Ok(self.fail(package, format!("Failed to fetch NPM: {}", e))),
        };

        let Some(version) = document.latest() else {
            return Ok(self.fail(package, "No `latest` dist-tag in package document"));
        };

        let mut entry = RegistryEntry::from_local(local, kind);

        let cached = match self.cache.lookup(kind, &local.id) {
            Some(hit) if hit.version == version => {
                tracing::debug!("{}@{} unchanged, reusing cached entry", package, version);
                entry.version = hit.version.clone();
                entry.source = hit.source.clone();
                entry.integrity = hit.integrity.clone();
                entry.options_schema = hit.options_schema.clone();
                entry.updated_at = hit.updated_at.clone();
                entry.min_artalk_version = hit.min_artalk_version.clone();
                true
            }
            _ => false,
        };

        if !cached {
            if let Err(e) = self.source.repository(&local.github_repo).await {
                return Ok(self.fail(
                    &local.github_repo,
                    format!("Failed to fetch GitHub repo: {}", e),
                ));
            }

            let Some(manifest) = document.manifest(version) else {
                return Ok(self.fail(
                    package,
                    format!("Version {} missing from package document", version),
                ));
            };

            let Some(main_file) = manifest.main_file() else {
                return Ok(self.fail(package, "No main file found in package.json"));
            };

            let cdn_base = self.source.cdn_package_base(package, version);
            let source = format!("{}/{}", cdn_base, main_file);

            let integrity = self.source.integrity(&source).await;
            if integrity.is_empty() {
                return Ok(self.fail(&source, "Failed to generate SRI"));
            }

            let options_schema = self
                .source
                .options_schema(&options_schema_url(&cdn_base, main_file))
                .await;

            let min_artalk_version =
                manifest
                    .min_artalk_version()
                    .ok_or_else(|| BuildError::MissingPeerDependency {
                        package: package.clone(),
                        version: version.to_string(),
                    })?;

            entry.version = version.to_string();
            entry.source = source;
            entry.integrity = integrity;
            entry.options_schema = options_schema;
            entry.updated_at = document.published_at(version).unwrap_or_default().to_string();
            entry.min_artalk_version = min_artalk_version;
        }

        self.reporter.report(BuildEvent::Done {
            entry: &entry,
            cached,
            elapsed: started.elapsed(),
        });

        Ok(Some(entry))
    }

    /// Build every entry concurrently and assemble the catalog
    ///
    /// All entries run to completion even when one fails fatally; the first
    /// fatal error (in declaration order) is returned afterwards.
    pub async fn build(
        &self,
        entries: &[(EntryKind, LocalEntry)],
    ) -> Result<RegistryData, BuildError> {
        let results = join_all(
            entries
                .iter()
                .map(|(kind, local)| self.build_entry(local, *kind)),
        )
        .await;

        let mut data = RegistryData::default();
        for result in results {
            let Some(entry) = result? else {
                continue;
            };
            match entry.kind {
                EntryKind::Plugin => data.plugins.push(entry),
                EntryKind::Theme => data.themes.push(entry),
            }
        }

        tracing::info!(
            "Built {} of {} entries ({} plugins, {} themes)",
            data.len(),
            entries.len(),
            data.plugins.len(),
            data.themes.len()
        );

        Ok(data)
    }
}

/// Read the lists, build, and write the catalog to `paths.output`
///
/// The existing catalog at `paths.output` serves as the cache unless
/// `use_cache` is false. Nothing is written when the build fails.
pub async fn build_registry(
    source: &dyn MetadataSource,
    paths: &RegistryPaths,
    use_cache: bool,
    reporter: &dyn Reporter,
) -> Result<RegistryData, BuildError> {
    let cache = if use_cache {
        RegistryCache::load(&paths.output)
    } else {
        RegistryCache::empty()
    };

    let entries = load_local_entries(paths, reporter)?;
    let data = RegistryBuilder::new(source, &cache, reporter)
        .build(&entries)
        .await?;

    data.save(&paths.output)?;
    Ok(data)
}

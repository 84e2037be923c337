//! Published-release diff checker
//!
//! Decides whether a freshly built catalog differs from the `registry.json`
//! attached to the latest release, so publishing can be skipped when nothing
//! changed.

use similar::{ChangeTag, TextDiff};
use std::path::Path;

use artalk_community_core::paths::REGISTRY_FILE;

use crate::error::Result;
use crate::github::GitHubClient;

/// Result of comparing the local catalog with the published one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    /// The repository has no release yet
    NoRelease,
    /// The latest release carries no `registry.json` asset
    NoAsset { tag: String },
    /// Nothing has been built locally
    NoLocal,
    Identical { tag: String },
    Changed {
        tag: String,
        published: String,
        local: String,
    },
}

impl DiffOutcome {
    /// Whether a new release should be published
    pub fn is_diff(&self) -> bool {
        !matches!(self, DiffOutcome::Identical { .. })
    }

    /// One-line explanation for humans
    pub fn summary(&self) -> String {
        match self {
            DiffOutcome::NoRelease => "No GitHub release found.".to_string(),
            DiffOutcome::NoAsset { tag } => {
                format!("No {} found in the assets of release {}.", REGISTRY_FILE, tag)
            }
            DiffOutcome::NoLocal => format!("Local {} does not exist.", REGISTRY_FILE),
            DiffOutcome::Identical { tag } => {
                format!("Local {} is identical to release {}.", REGISTRY_FILE, tag)
            }
            DiffOutcome::Changed { tag, .. } => {
                format!("Local {} differs from release {}.", REGISTRY_FILE, tag)
            }
        }
    }
}

/// Compare `local_path` with the catalog published in `repo`'s latest release
///
/// A missing release is an outcome, not an error. Any other failure talking
/// to GitHub is returned.
pub async fn check_diff(
    github: &GitHubClient,
    repo: &str,
    local_path: &Path,
) -> Result<DiffOutcome> {
    let release = match github.latest_release(repo).await {
        Ok(release) => release,
        Err(e) if e.is_not_found() => {
            tracing::debug!("No release in {}: {}", repo, e);
            return Ok(DiffOutcome::NoRelease);
        }
        Err(e) => return Err(e),
    };

    let Some(asset) = release.asset(REGISTRY_FILE) else {
        return Ok(DiffOutcome::NoAsset {
            tag: release.tag_name,
        });
    };

    let published = github.download_asset(asset).await?;

    if !local_path.exists() {
        return Ok(DiffOutcome::NoLocal);
    }
    let local = std::fs::read(local_path)?;

    tracing::debug!(
        "Comparing {} ({} bytes) with {} from {} ({} bytes)",
        local_path.display(),
        local.len(),
        asset.name,
        release.tag_name,
        published.len()
    );

    if local == published {
        Ok(DiffOutcome::Identical {
            tag: release.tag_name,
        })
    } else {
        Ok(DiffOutcome::Changed {
            tag: release.tag_name,
            published: String::from_utf8_lossy(&published).into_owned(),
            local: String::from_utf8_lossy(&local).into_owned(),
        })
    }
}

/// Type of diff line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    Added,
    Removed,
    Context,
}

/// A single line in a diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub line_type: LineType,
    pub content: String,
}

impl DiffLine {
    pub fn prefix(&self) -> &'static str {
        match self.line_type {
            LineType::Added => "+",
            LineType::Removed => "-",
            LineType::Context => " ",
        }
    }
}

/// Changed lines between two texts, with `context` unchanged lines around
/// each change. Hunks are separated by `None`.
pub fn line_diff(old: &str, new: &str, context: usize) -> Vec<Option<DiffLine>> {
    let diff = TextDiff::from_lines(old, new);
    let mut lines = Vec::new();

    for (idx, group) in diff.grouped_ops(context).iter().enumerate() {
        if idx > 0 {
            lines.push(None);
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let line_type = match change.tag() {
                    ChangeTag::Delete => LineType::Removed,
                    ChangeTag::Insert => LineType::Added,
                    ChangeTag::Equal => LineType::Context,
                };
                lines.push(Some(DiffLine {
                    line_type,
                    content: change.value().trim_end_matches(['\r', '\n']).to_string(),
                }));
            }
        }
    }

    lines
}

/// Plain unified-style rendering of [`line_diff`]
pub fn to_unified_diff(old: &str, new: &str, context: usize) -> String {
    let mut output = String::new();
    for line in line_diff(old, new, context) {
        match line {
            Some(line) => {
                output.push_str(line.prefix());
                output.push_str(&line.content);
            }
            None => output.push_str("..."),
        }
        output.push('\n');
    }
    output
}

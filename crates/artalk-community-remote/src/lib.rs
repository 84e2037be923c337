//! Artalk Community Remote
//!
//! Everything in the registry pipeline that talks to the network:
//!
//! - **npm**: package documents (dist-tags, manifests, publish times)
//! - **GitHub**: repository liveness and the latest published release
//! - **Integrity**: SRI digests of CDN distributables, options-schema HEAD checks
//! - **Builder**: concurrent per-entry builds against a cached catalog
//! - **Diff**: compare the local catalog with the published release asset
//!
//! ## Example
//!
//! ```rust,no_run
//! use artalk_community_core::RegistryPaths;
//! use artalk_community_remote::{
//!     ConsoleReporter, Endpoints, RemoteSources, SriAlgorithm, build_registry,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sources = RemoteSources::new(Endpoints::default(), SriAlgorithm::default())?;
//! let paths = RegistryPaths::from_root(std::path::Path::new("."));
//!
//! let data = build_registry(&sources, &paths, true, &ConsoleReporter).await?;
//! println!("{} entries", data.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Security Notes
//!
//! - The GitHub token is scoped to the API base URL
//! - Credentials are NEVER sent after cross-origin redirects

pub mod builder;
pub mod client;
pub mod config;
pub mod diff;
pub mod error;
pub mod github;
pub mod integrity;
pub mod mock;
pub mod npm;
pub mod progress;
pub mod source;

// Re-exports for convenience
pub use builder::{RegistryBuilder, RegistryCache, build_registry, load_local_entries};
pub use client::{BearerToken, HttpClient, ScopedCredentials};
pub use config::{DEFAULT_RELEASE_REPO, Endpoints};
pub use diff::{DiffOutcome, check_diff};
pub use error::{BuildError, FetchError, Result};
pub use github::{GitHubClient, Release, ReleaseAsset, RepositoryInfo};
pub use integrity::{IntegrityResolver, SriAlgorithm, sri_digest};
pub use mock::MockSource;
pub use npm::{NpmClient, PackageDocument, VersionManifest};
pub use progress::{BuildEvent, ConsoleReporter, QuietReporter, RecordingReporter, Reporter};
pub use source::{MetadataSource, RemoteSources};

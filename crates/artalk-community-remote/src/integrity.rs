//! Subresource integrity digests and options-schema probing

use base64::Engine;
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;
use std::str::FromStr;

use crate::client::HttpClient;

/// File name a plugin may ship next to its main file to describe its options
pub const OPTIONS_SCHEMA_FILE: &str = "artalk-plugin-options.schema.json";

/// Hash algorithms allowed in an SRI digest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SriAlgorithm {
    Sha256,
    Sha384,
    #[default]
    Sha512,
}

impl SriAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            SriAlgorithm::Sha256 => "sha256",
            SriAlgorithm::Sha384 => "sha384",
            SriAlgorithm::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for SriAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SriAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" => Ok(SriAlgorithm::Sha256),
            "sha384" => Ok(SriAlgorithm::Sha384),
            "sha512" => Ok(SriAlgorithm::Sha512),
            other => Err(format!(
                "unsupported integrity algorithm '{}' (expected sha256, sha384 or sha512)",
                other
            )),
        }
    }
}

/// Compute `<algorithm>-<base64 digest>` of some bytes
pub fn sri_digest(content: &[u8], algorithm: SriAlgorithm) -> String {
    let digest = match algorithm {
        SriAlgorithm::Sha256 => Sha256::digest(content).to_vec(),
        SriAlgorithm::Sha384 => Sha384::digest(content).to_vec(),
        SriAlgorithm::Sha512 => Sha512::digest(content).to_vec(),
    };
    format!(
        "{}-{}",
        algorithm,
        base64::engine::general_purpose::STANDARD.encode(digest)
    )
}

/// Options-schema URL next to a package's main file
///
/// The directory follows POSIX `dirname`, so a main file at the package root
/// yields `<base>/./artalk-plugin-options.schema.json`.
pub fn options_schema_url(cdn_base: &str, main_file: &str) -> String {
    format!("{}/{}/{}", cdn_base, dirname(main_file), OPTIONS_SCHEMA_FILE)
}

fn dirname(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) => "/",
        Some(idx) => trimmed[..idx].trim_end_matches('/'),
        None => ".",
    }
}

/// Downloads distributables to hash them, and checks optional files with HEAD
#[derive(Debug, Clone)]
pub struct IntegrityResolver {
    http: HttpClient,
    algorithm: SriAlgorithm,
}

impl IntegrityResolver {
    pub fn new(http: HttpClient, algorithm: SriAlgorithm) -> Self {
        Self { http, algorithm }
    }

    pub fn algorithm(&self) -> SriAlgorithm {
        self.algorithm
    }

    /// SRI digest of the file at `url`
    ///
    /// Returns an empty string when the file cannot be downloaded.
    pub async fn from_url(&self, url: &str) -> String {
        match self.http.get_bytes(url, &[]).await {
            Ok(content) => sri_digest(&content, self.algorithm),
            Err(e) => {
                tracing::warn!("Failed to generate SRI for {}: {}", url, e);
                String::new()
            }
        }
    }

    /// `url` if it exists, an empty string otherwise
    pub async fn options_schema(&self, url: &str) -> String {
        match self.http.head(url).await {
            Ok(_) => url.to_string(),
            Err(e) => {
                tracing::debug!("No options schema at {}: {}", url, e);
                String::new()
            }
        }
    }
}

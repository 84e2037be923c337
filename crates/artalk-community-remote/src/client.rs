//! HTTP client with scoped bearer credentials
//!
//! Key security features:
//! - Tokens scoped to specific URL prefixes (the GitHub API, never the CDN)
//! - NEVER sends credentials after cross-origin redirect

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

use crate::error::{FetchError, Result};

const MAX_REDIRECTS: u32 = 10;

/// Bearer token ready to be attached to requests
#[derive(Clone)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// Scoped credentials - maps URL prefixes to tokens
/// SECURITY: Never sends credentials to URLs outside the scope
#[derive(Debug, Clone, Default)]
pub struct ScopedCredentials {
    scopes: HashMap<String, BearerToken>,
}

impl ScopedCredentials {
    /// Add a token for a URL scope
    pub fn add(&mut self, url_prefix: &str, token: BearerToken) {
        let prefix = url_prefix.trim_end_matches('/').to_string();
        self.scopes.insert(prefix, token);
    }

    /// Get the token for a URL (by longest matching prefix)
    pub fn for_url(&self, url: &str) -> Option<&BearerToken> {
        self.scopes
            .iter()
            .filter(|(prefix, _)| {
                url.strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?']))
            })
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, token)| token)
    }

    /// Check if two URLs are same-origin (for redirect safety)
    pub fn same_origin(url1: &str, url2: &str) -> bool {
        match (Url::parse(url1), Url::parse(url2)) {
            (Ok(u1), Ok(u2)) => {
                u1.scheme() == u2.scheme()
                    && u1.host() == u2.host()
                    && u1.port_or_known_default() == u2.port_or_known_default()
            }
            _ => false,
        }
    }
}

/// HTTP client shared by the npm, GitHub and CDN clients
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    credentials: ScopedCredentials,
}

impl HttpClient {
    pub fn new(credentials: ScopedCredentials, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            // Redirects are followed manually so credentials never leak cross-origin
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::NetworkError {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            credentials,
        })
    }

    /// Client without any credentials
    pub fn public(timeout: Duration) -> Result<Self> {
        Self::new(ScopedCredentials::default(), timeout)
    }

    /// GET a URL, failing on any non-success status
    pub async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<Response> {
        self.send(Method::GET, url, headers).await
    }

    /// HEAD a URL, failing on any non-success status
    pub async fn head(&self, url: &str) -> Result<Response> {
        self.send(Method::HEAD, url, &[]).await
    }

    /// Fetch bytes from URL
    pub async fn get_bytes(&self, url: &str, headers: &[(&str, &str)]) -> Result<Vec<u8>> {
        let response = self.get(url, headers).await?;
        let bytes = response.bytes().await.map_err(|e| FetchError::NetworkError {
            message: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }

    /// Fetch and decode a JSON document
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<T> {
        let bytes = self.get_bytes(url, headers).await?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::InvalidResponse {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn send(&self, method: Method, url: &str, headers: &[(&str, &str)]) -> Result<Response> {
        let original_url = url.to_string();
        let mut current_url = url.to_string();
        let mut redirects = 0;
        let extra = header_map(headers)?;

        loop {
            tracing::debug!("{} {}", method, current_url);
            let mut request = self
                .client
                .request(method.clone(), &current_url)
                .headers(extra.clone());

            // Add auth ONLY if same origin as original URL
            if ScopedCredentials::same_origin(&original_url, &current_url) {
                if let Some(token) = self.credentials.for_url(&current_url) {
                    request = request.header(reqwest::header::AUTHORIZATION, token.auth_header());
                }
            } else if self.credentials.for_url(&original_url).is_some() {
                tracing::warn!(
                    "Cross-origin redirect from {} to {} - credentials not forwarded",
                    original_url,
                    current_url
                );
            }

            let response = request.send().await?;
            let status = response.status();

            if status.is_redirection() {
                redirects += 1;
                if redirects > MAX_REDIRECTS {
                    return Err(FetchError::NetworkError {
                        message: format!("Too many redirects (max {})", MAX_REDIRECTS),
                    });
                }

                let location = response
                    .headers()
                    .get(reqwest::header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| FetchError::NetworkError {
                        message: "Redirect without Location header".to_string(),
                    })?;

                let base = Url::parse(&current_url)?;
                current_url = base.join(location)?.to_string();
                continue;
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);

                return Err(FetchError::RateLimited { retry_after });
            }

            if status == StatusCode::UNAUTHORIZED {
                return Err(FetchError::AuthRequired { url: current_url });
            }
            if status == StatusCode::FORBIDDEN {
                return Err(FetchError::AuthFailed {
                    message: format!("Access denied to {}", current_url),
                });
            }

            if !status.is_success() {
                return Err(FetchError::HttpError {
                    status: status.as_u16(),
                    url: current_url,
                });
            }

            return Ok(response);
        }
    }
}

fn header_map(headers: &[(&str, &str)]) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            FetchError::NetworkError {
                message: format!("Invalid header name {}: {}", name, e),
            }
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| FetchError::NetworkError {
            message: format!("Invalid header value: {}", e),
        })?;
        map.insert(name, value);
    }
    Ok(map)
}

// Copyright (c) 2025-2026 the fisca-editor contributors
// SPDX-License-Identifier: Apache-2.0

//! Fetching rule-description pages.
//!
//! [`RuleFetcher`] returns the raw text body of a page, consulting a shared
//! [`PageCache`] first so a URL is requested from the network at most once
//! per cache lifetime. Bodies are taken as-is regardless of content type.

pub mod rewrite;

use crate::generator::rules::RuleDescriptor;
use crate::utils::cache::PageCache;
use crate::utils::error::EditorError;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

pub use rewrite::UrlRewrite;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str = concat!("fisca-editor/", env!("CARGO_PKG_VERSION"));

/// Transport settings for page fetches.
#[derive(Clone)]
pub struct FetchSettings {
    pub timeout: Duration,
    pub user_agent: String,
    pub rewrite: UrlRewrite,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            rewrite: rewrite::identity(),
        }
    }
}

impl std::fmt::Debug for FetchSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchSettings")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

pub struct RuleFetcher {
    client: Client,
    cache: Arc<PageCache>,
    rewrite: UrlRewrite,
}

impl RuleFetcher {
    /// Create a fetcher over `cache` with the given transport settings.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::Config` if the HTTP client cannot be built
    /// (e.g. the TLS backend fails to initialize).
    pub fn new(cache: Arc<PageCache>, settings: FetchSettings) -> Result<Self, EditorError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent)
            .build()
            .map_err(|e| EditorError::Config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self::with_client(client, cache, settings.rewrite))
    }

    /// Create a fetcher around an already configured client.
    pub fn with_client(client: Client, cache: Arc<PageCache>, rewrite: UrlRewrite) -> Self {
        Self {
            client,
            cache,
            rewrite,
        }
    }

    pub fn cache(&self) -> &Arc<PageCache> {
        &self.cache
    }

    /// Return the text body of the page at `url`.
    ///
    /// A cached entry is returned without any network I/O. Otherwise one GET
    /// is issued (to the rewritten URL), and a non-empty body is stored under
    /// the original `url` before being returned.
    ///
    /// # Errors
    ///
    /// `EditorError::Fetch` on transport failure, non-success status, or an
    /// empty body. Nothing is cached in that case.
    pub async fn fetch(&self, url: &str) -> Result<Arc<str>, EditorError> {
        if let Some(content) = self.cache.get(url) {
            tracing::debug!(url, bytes = content.len(), "page cache hit");
            return Ok(content);
        }

        let request_url = (self.rewrite)(url);
        if request_url != url {
            tracing::debug!(url, request_url = %request_url, "rewrote page URL");
        }
        tracing::debug!(url, "page cache miss, fetching");

        let response = self
            .client
            .get(&request_url)
            .send()
            .await
            .map_err(|e| EditorError::fetch_transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EditorError::fetch(url, format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| EditorError::fetch_transport(url, e))?;

        if body.is_empty() {
            return Err(EditorError::fetch(url, "response body was empty"));
        }

        tracing::debug!(url, bytes = body.len(), "fetched page");
        Ok(self.cache.put(url, body))
    }

    /// Fetch `url` and pair its body with a display name.
    pub async fn fetch_rule(&self, name: &str, url: &str) -> Result<RuleDescriptor, EditorError> {
        let content = self.fetch(url).await?;
        Ok(RuleDescriptor::new(name, content))
    }
}

// Copyright (c) 2025-2026 the fisca-editor contributors
// SPDX-License-Identifier: Apache-2.0

//! URL transforms applied just before a page request goes out.
//!
//! Browser-hosted builds reach third-party pages through a local relay that
//! accepts `<prefix>/path` and forwards it to one upstream origin. The fetcher
//! itself knows nothing about that relay; it only applies whatever
//! [`UrlRewrite`] it was given.

use std::sync::Arc;

/// A pure `url -> url` function injected into [`super::RuleFetcher`].
pub type UrlRewrite = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Leave every URL unchanged.
pub fn identity() -> UrlRewrite {
    Arc::new(|url: &str| url.to_string())
}

/// Route URLs under `upstream` through a relay mounted at `prefix`.
///
/// `relay("http://localhost:5173/proxy", "https://www.fukushi.metro.tokyo.lg.jp")`
/// turns `https://www.fukushi.metro.tokyo.lg.jp/a/b.html` into
/// `http://localhost:5173/proxy/a/b.html`. URLs on any other origin pass
/// through untouched.
pub fn relay(prefix: impl Into<String>, upstream: impl Into<String>) -> UrlRewrite {
    let prefix = prefix.into().trim_end_matches('/').to_string();
    let upstream = upstream.into().trim_end_matches('/').to_string();

    Arc::new(move |url: &str| match url.strip_prefix(upstream.as_str()) {
        // Only match on an origin boundary, not e.g. `https://host.example.evil`.
        Some(rest) if rest.is_empty() || rest.starts_with(['/', '?', '#']) => {
            format!("{prefix}{rest}")
        }
        _ => url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_noop() {
        let rewrite = identity();
        assert_eq!(rewrite("https://example.test/a?b=c"), "https://example.test/a?b=c");
    }

    #[test]
    fn test_relay_rewrites_upstream_urls() {
        let rewrite = relay("http://localhost:5173/proxy/", "https://upstream.test/");
        assert_eq!(
            rewrite("https://upstream.test/kodomo/teate.html"),
            "http://localhost:5173/proxy/kodomo/teate.html"
        );
        assert_eq!(rewrite("https://upstream.test"), "http://localhost:5173/proxy");
    }

    #[test]
    fn test_relay_ignores_other_origins() {
        let rewrite = relay("/proxy", "https://upstream.test");
        assert_eq!(rewrite("https://other.test/a"), "https://other.test/a");
        assert_eq!(
            rewrite("https://upstream.test.evil/a"),
            "https://upstream.test.evil/a"
        );
    }
}

// Copyright (c) 2025-2026 the fisca-editor contributors
// SPDX-License-Identifier: Apache-2.0

//! The fixed few-shot exemplar.
//!
//! Its source code is compiled in, while its description is fetched live from
//! the municipality page. The two are related but not guaranteed to agree in
//! every detail.

use crate::fetch::RuleFetcher;
use crate::generator::rules::RuleDescriptor;
use crate::utils::error::EditorError;

/// Display name of the exemplar rule (child-rearing allowance).
pub const EXEMPLAR_NAME: &str = "児童育成手当";

/// Page describing the exemplar rule.
pub const EXEMPLAR_URL: &str =
    "https://www.city.shibuya.tokyo.jp/kodomo/kodomo-teate-josei/hitorioya/hitorioya_teate.html";

/// Reference source for the exemplar.
///
/// Taken from OpenFisca-Japan (<https://github.com/project-inclusive/OpenFisca-Japan>),
/// GNU AGPL v3.
pub fn exemplar_source() -> &'static str {
    include_str!("../../prompts/exemplar.py")
}

/// A few-shot exemplar: name, description URL and reference source.
///
/// `Default` yields the compiled-in exemplar used by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExemplarRecord {
    pub name: String,
    pub url: String,
    pub source: String,
}

impl Default for ExemplarRecord {
    fn default() -> Self {
        Self::new(EXEMPLAR_NAME, EXEMPLAR_URL, exemplar_source())
    }
}

impl ExemplarRecord {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            source: source.into(),
        }
    }

    /// Fetch the exemplar's live description.
    ///
    /// # Errors
    ///
    /// Propagates `EditorError::Fetch` when the description page cannot be
    /// retrieved.
    pub async fn describe(&self, fetcher: &RuleFetcher) -> Result<RuleDescriptor, EditorError> {
        tracing::info!(name = %self.name, "fetching exemplar description");
        fetcher.fetch_rule(&self.name, &self.url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchSettings;
    use crate::utils::cache::PageCache;
    use std::sync::Arc;

    #[test]
    fn test_exemplar_source_is_compiled_in() {
        let source = exemplar_source();
        assert!(source.contains("class 児童育成手当(Variable):"));
        assert!(source.contains("def formula("));
    }

    #[test]
    fn test_default_record_uses_constants() {
        let record = ExemplarRecord::default();
        assert_eq!(record.name, EXEMPLAR_NAME);
        assert_eq!(record.url, EXEMPLAR_URL);
        assert_eq!(record.source, exemplar_source());
    }

    #[tokio::test]
    async fn test_describe_reads_through_cache() {
        let cache = Arc::new(PageCache::with_entries([(EXEMPLAR_URL, "DESC_A")]));
        let fetcher =
            RuleFetcher::new(cache, FetchSettings::default()).expect("client should build");

        let described = ExemplarRecord::default()
            .describe(&fetcher)
            .await
            .expect("cached description");
        assert_eq!(described.name, EXEMPLAR_NAME);
        assert_eq!(described.content(), "DESC_A");
    }
}

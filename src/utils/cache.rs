// Copyright (c) 2025-2026 the fisca-editor contributors
// SPDX-License-Identifier: Apache-2.0

//! In-memory page cache keyed by URL.
//!
//! Entries live for as long as the cache does. There is no eviction and no
//! refresh: once a URL has content, every later lookup returns that same
//! content. The cache is passed explicitly to [`crate::fetch::RuleFetcher`]
//! so each test (or each process) owns its own instance.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Memoized page bodies keyed by URL.
///
/// Content is stored as `Arc<str>` so repeated lookups hand out the very same
/// allocation; callers can rely on `Arc::ptr_eq` between two hits.
#[derive(Debug, Default)]
pub struct PageCache {
    entries: Mutex<HashMap<String, Arc<str>>>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cache already holding the given `(url, content)` pairs.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Arc<str>>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(map),
        }
    }

    /// Pure lookup, never performs I/O.
    pub fn get(&self, url: &str) -> Option<Arc<str>> {
        self.lock().get(url).cloned()
    }

    /// Store `content` for `url`, replacing whatever was there.
    ///
    /// Storing the same value twice leaves the existing allocation in place,
    /// so handles returned by earlier `get` calls stay pointer-equal.
    pub fn put(&self, url: impl Into<String>, content: impl Into<Arc<str>>) -> Arc<str> {
        let content = content.into();
        let mut entries = self.lock();
        let slot = entries.entry(url.into()).or_insert_with(|| Arc::clone(&content));
        if **slot != *content {
            *slot = content;
        }
        Arc::clone(slot)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// URLs currently cached, sorted for stable output.
    pub fn urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.lock().keys().cloned().collect();
        urls.sort();
        urls
    }

    // A panic while holding the lock cannot leave the map half-written
    // (every mutation is a single insert), so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<str>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

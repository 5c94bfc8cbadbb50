//! Word tokenization and a cache of per-span token sets.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use moka::sync::Cache;
use regex::Regex;

static WORD_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\w+").ok());

/// Lowercase `\w+` tokens of `text`, in order.
pub fn tokenize(text: &str) -> Vec<String> {
    match WORD_RE.as_ref() {
        Some(re) => re
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .collect(),
        None => Vec::new(),
    }
}

/// Span token sets keyed by blake3 of the span text.
pub struct TokenCache {
    cache: Cache<String, Arc<HashSet<String>>>,
}

impl TokenCache {
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_idle(Duration::from_secs(600))
            .build();
        Self { cache }
    }

    /// Token set of `text`, computed once per distinct text.
    pub fn token_set(&self, text: &str) -> Arc<HashSet<String>> {
        let key = blake3::hash(text.as_bytes()).to_hex().to_string();
        self.cache
            .get_with(key, || Arc::new(tokenize(text).into_iter().collect()))
    }

    /// Approximate number of cached sets.
    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

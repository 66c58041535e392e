// src/crawl/visited.rs
// =============================================================================
// The set of URLs that some worker has already claimed.
//
// Claiming is a single DashSet::insert: the check and the mark happen under
// the same shard lock, so two workers racing on one URL can never both win.
// Entries are never removed while a crawl is running.
// =============================================================================

use dashmap::DashSet;
use url::Url;

/// Normalizes a URL string for deduplication: trims whitespace, rejects empty
/// input and, when the string parses as a URL, uses the serialized form the
/// extractors produce (lowercase host, `/` for an empty path). Identity is
/// exact string equality after that.
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match Url::parse(trimmed) {
        Ok(url) => Some(url.into()),
        Err(_) => Some(trimmed.to_string()),
    }
}

#[derive(Debug, Default)]
pub struct VisitedSet {
    claimed: DashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `url` for the caller. Returns `false` if it was claimed before.
    pub fn try_claim(&self, url: &str) -> bool {
        // Cheap read path for the common duplicate case
        if self.claimed.contains(url) {
            return false;
        }
        self.claimed.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.claimed.contains(url)
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }

    /// All claimed URLs, sorted.
    pub fn snapshot(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.claimed.iter().map(|entry| entry.key().clone()).collect();
        urls.sort();
        urls
    }
}

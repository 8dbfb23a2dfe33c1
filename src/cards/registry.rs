//! Parse cache for card records.
//!
//! The `CardCache` remembers the outcome of turning a `CardRecord` into a
//! `Card`, keyed by card name. It is owned by the caller and passed by
//! reference into deck loading, so several decks sharing staples parse each
//! one once. Failed parses are cached too: the same broken record yields the
//! same error every time.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::definition::Card;
use super::record::CardRecord;
use crate::core::SimResult;

/// Name-keyed cache of parsed cards.
///
/// ## Example
///
/// ```
/// use rust_goldfish::cards::{CardCache, CardRecord};
///
/// let mut cache = CardCache::new();
/// let plains = CardRecord::new("Plains", &["land"]).with_produces(&["W"]);
///
/// let first = cache.get_or_parse(&plains).unwrap();
/// let second = cache.get_or_parse(&plains).unwrap();
///
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// assert_eq!(cache.len(), 1);
/// assert_eq!(cache.hits(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardCache {
    cards: FxHashMap<String, SimResult<Arc<Card>>>,
    hits: u64,
    misses: u64,
}

impl CardCache {
    /// Create a new empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `record`, or return the cached outcome for its name.
    pub fn get_or_parse(&mut self, record: &CardRecord) -> SimResult<Arc<Card>> {
        let key = record.name.trim();
        if let Some(cached) = self.cards.get(key) {
            self.hits += 1;
            return cached.clone();
        }
        self.misses += 1;
        let parsed = Card::from_record(record).map(Arc::new);
        self.cards.insert(key.to_string(), parsed.clone());
        parsed
    }

    /// Look up an already parsed card.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SimResult<Arc<Card>>> {
        self.cards.get(name)
    }

    /// Check if a name has been parsed.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.cards.contains_key(name)
    }

    /// Number of distinct names cached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Lookups served from the cache.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that had to parse.
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Drop every cached entry.
    pub fn clear(&mut self) {
        self.cards.clear();
    }
}

//! In-memory caches for the index, content shards, and the dictionary.
//!
//! Everything is fetched through a [`DataSource`] on first use and kept for
//! the lifetime of the store. There is no eviction, no TTL and no size bound:
//! the working set is whatever the caller has touched.
//!
//! # Concurrency
//!
//! Locks are never held across a fetch. A cache miss reads the slot, drops the
//! lock, fetches, then re-locks to insert. Two tasks missing on the same shard
//! at the same time both fetch it and the later insert overwrites the earlier
//! one with equivalent content. Sequential callers see exactly one fetch per
//! resource. Failed fetches are not cached, so a later call retries.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::dictionary::{Dictionary, RawDictionaryEntry};
use crate::error::{Error, Result};
use crate::poem::{IndexEntry, RawPoem};
use crate::source::DataSource;

/// Default locator of the metadata index.
pub const DEFAULT_INDEX_LOCATOR: &str = "/data/index.json";

/// Default locator of the dictionary file.
pub const DEFAULT_DICTIONARY_LOCATOR: &str = "/data/dictionary.json";

/// A content shard, loaded whole.
///
/// `null` slots in the file are kept as `None` so offsets stay aligned.
#[derive(Debug, Default)]
pub struct Shard {
    records: Vec<Option<RawPoem>>,
}

impl Shard {
    pub fn new(records: Vec<Option<RawPoem>>) -> Self {
        Self { records }
    }

    /// The record at `offset`, if the shard has one there.
    pub fn get(&self, offset: usize) -> Option<&RawPoem> {
        self.records.get(offset).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Snapshot of what the store currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub index_loaded: bool,
    pub index_entries: usize,
    pub shards_cached: usize,
    pub dictionary_loaded: bool,
}

/// Lazily populated dataset caches over a data source.
pub struct DataStore {
    source: Arc<dyn DataSource>,
    index_locator: String,
    dictionary_locator: String,
    index: RwLock<Option<Arc<Vec<IndexEntry>>>>,
    shards: RwLock<HashMap<String, Arc<Shard>>>,
    dictionary: RwLock<Option<Arc<Dictionary>>>,
}

impl DataStore {
    /// Create a store using the default index and dictionary locators.
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self::with_locators(source, DEFAULT_INDEX_LOCATOR, DEFAULT_DICTIONARY_LOCATOR)
    }

    pub fn with_locators(
        source: Arc<dyn DataSource>,
        index_locator: impl Into<String>,
        dictionary_locator: impl Into<String>,
    ) -> Self {
        Self {
            source,
            index_locator: index_locator.into(),
            dictionary_locator: dictionary_locator.into(),
            index: RwLock::new(None),
            shards: RwLock::new(HashMap::new()),
            dictionary: RwLock::new(None),
        }
    }

    /// The metadata index, fetched on first call.
    pub async fn load_index(&self) -> Result<Arc<Vec<IndexEntry>>> {
        if let Some(index) = self.index.read().await.as_ref() {
            return Ok(Arc::clone(index));
        }

        let entries: Vec<IndexEntry> = self.fetch_json(&self.index_locator).await?;
        debug!("loaded index: {} entries", entries.len());
        let index = Arc::new(entries);
        *self.index.write().await = Some(Arc::clone(&index));
        Ok(index)
    }

    /// The shard at `locator`, fetched on first call for that locator.
    pub async fn load_shard(&self, locator: &str) -> Result<Arc<Shard>> {
        if let Some(shard) = self.shards.read().await.get(locator) {
            debug!("shard cache hit: {}", locator);
            return Ok(Arc::clone(shard));
        }

        let records: Vec<Option<RawPoem>> = self.fetch_json(locator).await?;
        debug!("loaded shard {}: {} records", locator, records.len());
        let shard = Arc::new(Shard::new(records));
        self.shards
            .write()
            .await
            .insert(locator.to_string(), Arc::clone(&shard));
        Ok(shard)
    }

    /// The normalized dictionary, fetched and normalized on first call.
    pub async fn load_dictionary(&self) -> Result<Arc<Dictionary>> {
        if let Some(dict) = self.dictionary.read().await.as_ref() {
            return Ok(Arc::clone(dict));
        }

        let raw: Vec<RawDictionaryEntry> = self.fetch_json(&self.dictionary_locator).await?;
        let dict = Arc::new(Dictionary::from_raw(raw));
        debug!("loaded dictionary: {} entries", dict.len());
        *self.dictionary.write().await = Some(Arc::clone(&dict));
        Ok(dict)
    }

    /// Drop every cached resource. The next call of each loader fetches again.
    pub async fn reset(&self) {
        *self.index.write().await = None;
        self.shards.write().await.clear();
        *self.dictionary.write().await = None;
    }

    pub async fn stats(&self) -> CacheStats {
        let index = self.index.read().await;
        CacheStats {
            index_loaded: index.is_some(),
            index_entries: index.as_ref().map_or(0, |i| i.len()),
            shards_cached: self.shards.read().await.len(),
            dictionary_loaded: self.dictionary.read().await.is_some(),
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, locator: &str) -> Result<T> {
        let bytes = self.source.fetch(locator).await?;
        serde_json::from_slice(&bytes).map_err(|e| Error::malformed(locator, e))
    }
}

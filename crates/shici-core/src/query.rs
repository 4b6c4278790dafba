//! Query layer: lookup, search, popular list and category filter.
//!
//! Every query resolves against the index first and only then touches the
//! shards it needs. Missing records (an index row pointing past the end of its
//! shard, or at a `null` slot) are dropped from results rather than failing
//! the query; fetch and parse errors still propagate.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use futures_util::future::try_join_all;
use log::{debug, warn};

use crate::error::Result;
use crate::poem::{IndexEntry, Poem, normalize_poem};
use crate::store::{DataStore, Shard};

/// Category id that selects the whole index.
pub const ALL_CATEGORIES: &str = "all";

/// Default number of entries returned by [`QueryLayer::popular`].
pub const DEFAULT_POPULAR_LIMIT: usize = 4;

/// Built-in category table: category id -> dynasty value in the index.
pub fn default_categories() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("tang".to_string(), "唐".to_string()),
        ("song".to_string(), "宋".to_string()),
    ])
}

/// Read-only queries over a [`DataStore`].
pub struct QueryLayer {
    store: Arc<DataStore>,
    categories: BTreeMap<String, String>,
}

impl QueryLayer {
    pub fn new(store: Arc<DataStore>, categories: BTreeMap<String, String>) -> Self {
        Self { store, categories }
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.store
    }

    /// Look up a poem by id. `None` if the id is not indexed (no shard is
    /// fetched) or its record is missing from the shard.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Poem>> {
        let index = self.store.load_index().await?;
        let Some(meta) = index.iter().find(|entry| entry.id == id) else {
            debug!("id not in index: {}", id);
            return Ok(None);
        };
        let shard = self.store.load_shard(&meta.shard).await?;
        Ok(resolve(&shard, meta))
    }

    /// Case-insensitive substring search over titles and authors, in index
    /// order. An empty keyword returns nothing without loading the index.
    pub async fn search(&self, keyword: &str) -> Result<Vec<Poem>> {
        if keyword.is_empty() {
            return Ok(Vec::new());
        }
        let needle = keyword.to_lowercase();
        let index = self.store.load_index().await?;

        let hits: Vec<&IndexEntry> = index
            .iter()
            .filter(|entry| {
                entry.title.to_lowercase().contains(&needle)
                    || entry.author.to_lowercase().contains(&needle)
            })
            .collect();
        debug!("search '{}': {} index hits", keyword, hits.len());

        self.resolve_all(&hits).await
    }

    /// The first `limit` index entries, resolved. Index order is the
    /// curated popularity order.
    pub async fn popular(&self, limit: usize) -> Result<Vec<Poem>> {
        let index = self.store.load_index().await?;
        let head: Vec<&IndexEntry> = index.iter().take(limit).collect();
        self.resolve_all(&head).await
    }

    /// Index entries in a category, metadata only.
    ///
    /// `None` or [`ALL_CATEGORIES`] returns the whole index. A known category
    /// keeps entries whose dynasty equals its value. An unknown category
    /// matches everything.
    pub async fn filter_by_category(&self, category: Option<&str>) -> Result<Vec<IndexEntry>> {
        let index = self.store.load_index().await?;
        let value = match category {
            None | Some(ALL_CATEGORIES) => None,
            Some(id) => match self.categories.get(id) {
                Some(value) => Some(value.as_str()),
                None => {
                    warn!("unknown category '{}', returning all entries", id);
                    None
                }
            },
        };

        Ok(match value {
            None => index.to_vec(),
            Some(value) => index
                .iter()
                .filter(|entry| entry.dynasty == value)
                .cloned()
                .collect(),
        })
    }

    /// Category ids known to this layer, sorted.
    pub fn category_ids(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Load every distinct shard the entries need (concurrently, one load per
    /// locator), then resolve entries in their original order.
    async fn resolve_all(&self, entries: &[&IndexEntry]) -> Result<Vec<Poem>> {
        let mut locators: Vec<&str> = Vec::new();
        for entry in entries {
            if !locators.contains(&entry.shard.as_str()) {
                locators.push(&entry.shard);
            }
        }

        let shards = try_join_all(locators.iter().map(|locator| self.store.load_shard(locator)))
            .await?;
        let by_locator: HashMap<&str, Arc<Shard>> = locators.into_iter().zip(shards).collect();

        Ok(entries
            .iter()
            .filter_map(|entry| {
                let shard = by_locator.get(entry.shard.as_str())?;
                resolve(shard, entry)
            })
            .collect())
    }
}

fn resolve(shard: &Shard, meta: &IndexEntry) -> Option<Poem> {
    match shard.get(meta.offset) {
        Some(raw) => Some(normalize_poem(raw, meta)),
        None => {
            debug!("no record at {}[{}] for {}", meta.shard, meta.offset, meta.id);
            None
        }
    }
}

//! High-level facade for embedding shici.
//!
//! The `Shici` struct wires a data source, the dataset caches, the query
//! layer and the lookup history together from one [`Config`].
//!
//! # Example
//!
//! ```no_run
//! use shici_core::{LoadOptions, Shici};
//!
//! #[tokio::main]
//! async fn main() -> shici_core::Result<()> {
//!     let shici = Shici::load(LoadOptions::default())?;
//!     for poem in shici.popular().await? {
//!         println!("{} · {}", poem.title, poem.author);
//!     }
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{Config, resolve_home};
use crate::dictionary::DictionaryEntry;
use crate::error::Result;
use crate::history::HistoryStore;
use crate::mode::ExamMode;
use crate::poem::{IndexEntry, Poem};
use crate::query::QueryLayer;
use crate::source::{DataSource, source_for};
use crate::store::{CacheStats, DataStore};

/// Options for loading a Shici instance.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Override the home directory.
    /// If `None`, uses `SHICI_HOME` env var or `~/.shici`.
    pub home: Option<PathBuf>,
    /// Override the configured data location (URL or directory).
    pub data_location: Option<String>,
}

/// High-level facade over the dataset access layer.
pub struct Shici {
    pub config: Config,
    home: PathBuf,
    query: QueryLayer,
    history: HistoryStore,
    exam_mode: ExamMode,
}

impl Shici {
    /// Load config from the home directory and build the data source it names.
    ///
    /// Data location precedence: `options.data_location` > `SHICI_DATA` env >
    /// `data_location` in config.toml.
    pub fn load(options: LoadOptions) -> Result<Self> {
        let home = resolve_home(options.home)?;
        let mut config = Config::load(&home)?;
        config.apply_env();
        if let Some(location) = options.data_location {
            config.data_location = location;
        }
        let source = source_for(&config.data_location, config.fetch_timeout())?;
        Ok(Self::with_source(config, home, source))
    }

    /// Build from explicit parts.
    pub fn with_source(config: Config, home: PathBuf, source: Arc<dyn DataSource>) -> Self {
        let store = Arc::new(DataStore::with_locators(
            source,
            config.index_locator.clone(),
            config.dictionary_locator.clone(),
        ));
        let query = QueryLayer::new(store, config.categories.clone());
        let history =
            HistoryStore::with_capacity(config.history_path(&home), config.history_capacity);
        Self {
            config,
            home,
            query,
            history,
            exam_mode: ExamMode::default(),
        }
    }

    pub fn home_dir(&self) -> &Path {
        &self.home
    }

    pub fn query(&self) -> &QueryLayer {
        &self.query
    }

    pub fn store(&self) -> &Arc<DataStore> {
        self.query.store()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn exam_mode(&self) -> &ExamMode {
        &self.exam_mode
    }

    // === Poems ===

    pub async fn load_index(&self) -> Result<Arc<Vec<IndexEntry>>> {
        self.store().load_index().await
    }

    pub async fn get_poem(&self, id: &str) -> Result<Option<Poem>> {
        self.query.get_by_id(id).await
    }

    pub async fn search(&self, keyword: &str) -> Result<Vec<Poem>> {
        self.query.search(keyword).await
    }

    /// The configured number of popular poems.
    pub async fn popular(&self) -> Result<Vec<Poem>> {
        self.query.popular(self.config.popular_limit).await
    }

    pub async fn popular_n(&self, limit: usize) -> Result<Vec<Poem>> {
        self.query.popular(limit).await
    }

    pub async fn category(&self, category: Option<&str>) -> Result<Vec<IndexEntry>> {
        self.query.filter_by_category(category).await
    }

    // === Dictionary ===

    /// Exact-match dictionary lookup. An empty word returns `None` without
    /// loading the dictionary.
    pub async fn search_dictionary(&self, word: &str) -> Result<Option<DictionaryEntry>> {
        if word.is_empty() {
            return Ok(None);
        }
        let dict = self.store().load_dictionary().await?;
        Ok(dict.lookup(word).cloned())
    }

    /// Look a word up and, when found, record it in the history.
    pub async fn lookup_word(&self, word: &str) -> Result<Option<DictionaryEntry>> {
        let entry = self.search_dictionary(word).await?;
        if entry.is_some() {
            self.history.add(word).await?;
        }
        Ok(entry)
    }

    // === History ===

    pub async fn get_history(&self) -> Vec<String> {
        self.history.get().await
    }

    pub async fn add_history(&self, word: &str) -> Result<Vec<String>> {
        self.history.add(word).await
    }

    pub async fn clear_history(&self) -> Result<()> {
        self.history.clear().await
    }

    // === Caches ===

    pub async fn cache_stats(&self) -> CacheStats {
        self.store().stats().await
    }

    /// Drop all cached index, shard and dictionary data.
    pub async fn reset_caches(&self) {
        self.store().reset().await
    }
}

//! shici-core: lazy dataset access for a classical poetry corpus and dictionary.
//!
//! The corpus is split into content shards plus one lightweight metadata
//! index. Queries resolve against the index and fetch only the shards they
//! need; index, shards and dictionary are each fetched once and cached.
//!
//! # Quick Start
//!
//! ```no_run
//! use shici_core::{LoadOptions, Shici};
//!
//! #[tokio::main]
//! async fn main() -> shici_core::Result<()> {
//!     let shici = Shici::load(LoadOptions {
//!         data_location: Some("https://poems.example.org".to_string()),
//!         ..Default::default()
//!     })?;
//!     if let Some(poem) = shici.get_poem("tang-0-0").await? {
//!         println!("{}\n{}", poem.title, poem.content.join("\n"));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! For lower-level access, use [`DataStore`] and [`QueryLayer`] directly.

pub mod config;
pub mod dictionary;
pub mod error;
pub mod history;
pub mod mode;
pub mod poem;
pub mod query;
pub mod safe_io;
mod shici;
pub mod source;
pub mod store;

// Re-export the facade
pub use shici::{LoadOptions, Shici};

// Re-export commonly used types
pub use config::Config;
pub use dictionary::{Dictionary, DictionaryEntry, Meaning};
pub use error::{Error, Result};
pub use history::HistoryStore;
pub use mode::ExamMode;
pub use poem::{IndexEntry, Poem, RawPoem};
pub use query::{ALL_CATEGORIES, QueryLayer};
pub use source::{DataSource, HttpSource, LocalSource};
pub use store::{CacheStats, DataStore, Shard};

/// Shared test helpers for tests across shici-core modules.
#[cfg(test)]
pub(crate) mod test_support {
    use crate::Shici;
    use crate::config::Config;
    use crate::error::{Error, Result};
    use crate::source::{BoxFuture, DataSource};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// In-memory data source that counts fetches per locator.
    #[derive(Default)]
    pub(crate) struct MemorySource {
        files: Mutex<HashMap<String, Vec<u8>>>,
        fetches: Mutex<HashMap<String, usize>>,
    }

    impl MemorySource {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn with_json(self, locator: &str, value: serde_json::Value) -> Self {
            self.insert_json(locator, value);
            self
        }

        pub(crate) fn with_bytes(self, locator: &str, bytes: &[u8]) -> Self {
            self.files
                .lock()
                .unwrap()
                .insert(locator.to_string(), bytes.to_vec());
            self
        }

        pub(crate) fn insert_json(&self, locator: &str, value: serde_json::Value) {
            self.files
                .lock()
                .unwrap()
                .insert(locator.to_string(), serde_json::to_vec(&value).unwrap());
        }

        pub(crate) fn fetch_count(&self, locator: &str) -> usize {
            self.fetches
                .lock()
                .unwrap()
                .get(locator)
                .copied()
                .unwrap_or(0)
        }

        pub(crate) fn total_fetches(&self) -> usize {
            self.fetches.lock().unwrap().values().sum()
        }
    }

    impl DataSource for MemorySource {
        fn fetch<'a>(&'a self, locator: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
            Box::pin(async move {
                *self
                    .fetches
                    .lock()
                    .unwrap()
                    .entry(locator.to_string())
                    .or_insert(0) += 1;
                self.files
                    .lock()
                    .unwrap()
                    .get(locator)
                    .cloned()
                    .ok_or_else(|| Error::fetch(self.describe(locator), "HTTP 404 Not Found"))
            })
        }

        fn describe(&self, locator: &str) -> String {
            format!("memory://{}", locator)
        }
    }

    /// Build a `Shici` over `source` with a temporary home directory.
    ///
    /// Returns `(Shici, TempDir)` — the `TempDir` must outlive `Shici`.
    pub(crate) fn create_test_shici(source: Arc<MemorySource>) -> (Shici, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let shici = Shici::with_source(
            Config::default(),
            temp_dir.path().to_path_buf(),
            source as Arc<dyn DataSource>,
        );
        (shici, temp_dir)
    }
}

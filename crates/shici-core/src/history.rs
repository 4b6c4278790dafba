//! Dictionary lookup history.
//!
//! A most-recent-first list of looked-up words, bounded to a fixed capacity
//! and persisted as a JSON array in one file. The file is the only copy:
//! every call reads it again, so separate processes see each other's updates.

use std::path::{Path, PathBuf};

use log::warn;

use crate::error::{Error, Result};
use crate::safe_io::atomic_write_json;

/// Default number of words kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Persisted MRU list of dictionary lookups.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    capacity: usize,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self::with_capacity(path, DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(path: PathBuf, capacity: usize) -> Self {
        Self { path, capacity }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The persisted list, most recent first.
    ///
    /// A missing slot is an empty history. So is an unreadable or malformed
    /// one; that case is logged and otherwise ignored.
    pub async fn get(&self) -> Vec<String> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("cannot read history {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };
        match serde_json::from_slice::<Vec<String>>(&bytes) {
            Ok(words) => words,
            Err(e) => {
                warn!("ignoring malformed history {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Move `word` to the front, dropping older duplicates and anything past
    /// capacity. Empty words are ignored. Returns the list as persisted.
    pub async fn add(&self, word: &str) -> Result<Vec<String>> {
        let mut words = self.get().await;
        if word.is_empty() {
            return Ok(words);
        }
        words.retain(|w| w != word);
        words.insert(0, word.to_string());
        words.truncate(self.capacity);
        self.persist(&words).await?;
        Ok(words)
    }

    /// Persist an empty list.
    pub async fn clear(&self) -> Result<()> {
        self.persist(&[]).await
    }

    async fn persist(&self, words: &[String]) -> Result<()> {
        let path = self.path.clone();
        let words = words.to_vec();
        tokio::task::spawn_blocking(move || atomic_write_json(&path, &words))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(format!("join error: {}", e))))??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_history() -> (HistoryStore, TempDir) {
        let tmp = TempDir::new().unwrap();
        let store = HistoryStore::new(tmp.path().join("history.json"));
        (store, tmp)
    }

    #[tokio::test]
    async fn test_missing_slot_is_empty() {
        let (history, _tmp) = create_test_history();
        assert!(history.get().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_slot_is_empty() {
        let (history, _tmp) = create_test_history();
        std::fs::write(history.path(), "{not json").unwrap();
        assert!(history.get().await.is_empty());

        std::fs::write(history.path(), "[1, 2, 3]").unwrap();
        assert!(history.get().await.is_empty());
    }

    #[tokio::test]
    async fn test_add_after_malformed_starts_fresh() {
        let (history, _tmp) = create_test_history();
        std::fs::write(history.path(), "garbage").unwrap();
        assert_eq!(history.add("之").await.unwrap(), vec!["之"]);
        assert_eq!(history.get().await, vec!["之"]);
    }

    #[tokio::test]
    async fn test_add_most_recent_first() {
        let (history, _tmp) = create_test_history();
        history.add("之").await.unwrap();
        history.add("乎").await.unwrap();
        history.add("者").await.unwrap();
        assert_eq!(history.get().await, vec!["者", "乎", "之"]);
    }

    #[tokio::test]
    async fn test_capacity_keeps_ten_most_recent() {
        let (history, _tmp) = create_test_history();
        for i in 0..11 {
            history.add(&format!("w{i}")).await.unwrap();
        }
        let words = history.get().await;
        let expected: Vec<String> = (1..11).rev().map(|i| format!("w{i}")).collect();
        assert_eq!(words, expected);
    }

    #[tokio::test]
    async fn test_readd_moves_to_front_without_growing() {
        let (history, _tmp) = create_test_history();
        for word in ["也", "矣", "焉"] {
            history.add(word).await.unwrap();
        }
        let words = history.add("也").await.unwrap();
        assert_eq!(words, vec!["也", "焉", "矣"]);
        assert_eq!(history.get().await.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_word_is_noop() {
        let (history, _tmp) = create_test_history();
        history.add("之").await.unwrap();
        assert_eq!(history.add("").await.unwrap(), vec!["之"]);
        assert_eq!(history.get().await, vec!["之"]);
    }

    #[tokio::test]
    async fn test_empty_word_does_not_create_slot() {
        let (history, _tmp) = create_test_history();
        history.add("").await.unwrap();
        assert!(!history.path().exists());
    }

    #[tokio::test]
    async fn test_clear_persists_empty_array() {
        let (history, _tmp) = create_test_history();
        history.add("之").await.unwrap();
        history.clear().await.unwrap();
        assert!(history.get().await.is_empty());
        assert_eq!(std::fs::read_to_string(history.path()).unwrap().trim(), "[]");
    }

    #[tokio::test]
    async fn test_clear_without_slot_creates_it() {
        let (history, _tmp) = create_test_history();
        history.clear().await.unwrap();
        assert!(history.path().exists());
    }

    #[tokio::test]
    async fn test_custom_capacity() {
        let tmp = TempDir::new().unwrap();
        let history = HistoryStore::with_capacity(tmp.path().join("h.json"), 2);
        for word in ["a", "b", "c"] {
            history.add(word).await.unwrap();
        }
        assert_eq!(history.get().await, vec!["c", "b"]);
        assert_eq!(history.capacity(), 2);
    }

    #[tokio::test]
    async fn test_two_stores_share_slot() {
        let (history, tmp) = create_test_history();
        let other = HistoryStore::new(tmp.path().join("history.json"));
        history.add("之").await.unwrap();
        assert_eq!(other.get().await, vec!["之"]);
    }
}

//! Classical-language dictionary entries.
//!
//! The dictionary file mixes two shapes:
//! 1. canonical: `{ word, meanings: [{type, content}], examples, source }`
//! 2. legacy: `{ word, explain: { pinyin: [lines...] }, url? }`
//!
//! [`normalize_entry`] turns both into [`DictionaryEntry`]; legacy entries get
//! one meaning per pronunciation with HTML stripped from the text.

use std::collections::HashMap;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static WS_BEFORE_NEWLINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+\n").unwrap());

/// One sense of a word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meaning {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub content: String,
}

/// A dictionary entry in canonical shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DictionaryEntry {
    pub word: String,
    pub meanings: Vec<Meaning>,
    pub examples: Vec<Value>,
    pub source: String,
}

/// An entry as stored on disk, in either shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDictionaryEntry {
    #[serde(default)]
    pub word: String,
    #[serde(default)]
    pub meanings: Option<Vec<Meaning>>,
    /// Pronunciation tag -> text lines, in document order. A non-object
    /// value is treated as absent.
    #[serde(default, deserialize_with = "lenient_explain")]
    pub explain: Option<IndexMap<String, Value>>,
    #[serde(default)]
    pub examples: Option<Vec<Value>>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExplainField {
    Map(IndexMap<String, Value>),
    Other(IgnoredAny),
}

fn lenient_explain<'de, D>(deserializer: D) -> Result<Option<IndexMap<String, Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<ExplainField>::deserialize(deserializer)? {
        Some(ExplainField::Map(map)) => Some(map),
        Some(ExplainField::Other(_)) | None => None,
    })
}

/// Remove tag markup, fold whitespace runs ending in a newline, and trim.
pub fn strip_html(text: &str) -> String {
    let without_tags = TAG_RE.replace_all(text, "");
    WS_BEFORE_NEWLINE_RE
        .replace_all(&without_tags, "\n")
        .trim()
        .to_string()
}

/// Bring a raw entry into canonical shape.
///
/// Entries that already carry `meanings` are taken as canonical. Legacy
/// entries yield one meaning per `explain` key whose value is a non-empty
/// array; other values are skipped.
pub fn normalize_entry(raw: RawDictionaryEntry) -> DictionaryEntry {
    let examples = raw.examples.unwrap_or_default();

    if let Some(meanings) = raw.meanings {
        return DictionaryEntry {
            word: raw.word,
            meanings,
            examples,
            source: raw.source.unwrap_or_default(),
        };
    }

    let meanings = raw
        .explain
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(pinyin, lines)| {
            let lines = lines.as_array().filter(|l| !l.is_empty())?;
            let joined = lines.iter().map(line_text).collect::<Vec<_>>().join("\n");
            Some(Meaning {
                kind: pinyin,
                content: strip_html(&joined),
            })
        })
        .collect();

    DictionaryEntry {
        word: raw.word,
        meanings,
        examples,
        source: raw.url.unwrap_or_default(),
    }
}

fn line_text(line: &Value) -> String {
    match line {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// The normalized dictionary with an exact-match word lookup.
#[derive(Debug, Default)]
pub struct Dictionary {
    entries: Vec<DictionaryEntry>,
    by_word: HashMap<String, usize>,
}

impl Dictionary {
    /// Normalize every raw entry. When a word repeats, lookups return the
    /// first occurrence.
    pub fn from_raw(raw: Vec<RawDictionaryEntry>) -> Self {
        let entries: Vec<DictionaryEntry> = raw.into_iter().map(normalize_entry).collect();
        let mut by_word = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            by_word.entry(entry.word.clone()).or_insert(i);
        }
        Self { entries, by_word }
    }

    pub fn lookup(&self, word: &str) -> Option<&DictionaryEntry> {
        self.by_word.get(word).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

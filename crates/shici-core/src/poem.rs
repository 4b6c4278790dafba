//! Poem records: index metadata, raw shard records, and the normalized shape.
//!
//! Shards come from two upstream corpora (Tang poetry and Song ci) whose
//! records disagree on field names. [`normalize_poem`] merges a raw record with
//! its index metadata into one [`Poem`].

use serde::{Deserialize, Deserializer, Serialize};

/// Title used when neither the index nor the record names the poem.
pub const UNTITLED: &str = "未命名";

/// Author used when neither the index nor the record names one.
pub const ANONYMOUS: &str = "佚名";

/// One row of the metadata index.
///
/// Built offline; immutable at runtime. `offset` is the record's position in
/// the shard named by `shard`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IndexRow")]
pub struct IndexEntry {
    pub id: String,
    pub title: String,
    pub author: String,
    /// Dynasty or free-form tag; the category filter matches on this.
    pub dynasty: String,
    #[serde(rename = "file")]
    pub shard: String,
    #[serde(rename = "idx")]
    pub offset: usize,
}

/// Index row as written by the index builder. Older builds name the dynasty
/// `tag`; a non-empty `dynasty` wins when a row carries both.
#[derive(Deserialize)]
struct IndexRow {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    dynasty: String,
    #[serde(default)]
    tag: String,
    file: String,
    idx: usize,
}

impl From<IndexRow> for IndexEntry {
    fn from(row: IndexRow) -> Self {
        let dynasty = if row.dynasty.is_empty() { row.tag } else { row.dynasty };
        Self {
            id: row.id,
            title: row.title,
            author: row.author,
            dynasty,
            shard: row.file,
            offset: row.idx,
        }
    }
}

/// A raw shard record in either upstream schema.
///
/// Unknown fields are ignored. Some extracted records carry their text as a
/// single string rather than a list of lines; that string becomes one line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawPoem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub rhythmic: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub dynasty: Option<String>,
    #[serde(default, deserialize_with = "lenient_lines")]
    pub paragraphs: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_lines")]
    pub content: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lines {
    Many(Vec<String>),
    One(String),
}

fn lenient_lines<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Lines>::deserialize(deserializer)?.map(|lines| match lines {
        Lines::Many(lines) => lines,
        Lines::One(line) => vec![line],
    }))
}

/// A poem as handed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Poem {
    pub id: String,
    pub title: String,
    pub author: String,
    pub dynasty: String,
    pub content: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rhythmic: Option<String>,
}

/// Merge a raw record with its index metadata.
///
/// Empty strings count as absent, so an index row with a blank title still
/// falls back to the record's `title`, then `rhythmic`, then [`UNTITLED`].
pub fn normalize_poem(raw: &RawPoem, meta: &IndexEntry) -> Poem {
    let title = first_present([
        Some(meta.title.as_str()),
        raw.title.as_deref(),
        raw.rhythmic.as_deref(),
    ])
    .unwrap_or(UNTITLED);

    let author =
        first_present([Some(meta.author.as_str()), raw.author.as_deref()]).unwrap_or(ANONYMOUS);

    let dynasty =
        first_present([Some(meta.dynasty.as_str()), raw.dynasty.as_deref()]).unwrap_or_default();

    let content = raw
        .paragraphs
        .as_ref()
        .or(raw.content.as_ref())
        .cloned()
        .unwrap_or_default();

    Poem {
        id: meta.id.clone(),
        title: title.to_string(),
        author: author.to_string(),
        dynasty: dynasty.to_string(),
        content,
        rhythmic: raw.rhythmic.clone(),
    }
}

fn first_present<'a, const N: usize>(candidates: [Option<&'a str>; N]) -> Option<&'a str> {
    candidates.into_iter().flatten().find(|s| !s.is_empty())
}

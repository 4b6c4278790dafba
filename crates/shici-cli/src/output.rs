//! Plain-text and JSON rendering of query results.

use serde::Serialize;
use shici_core::{DictionaryEntry, IndexEntry, Poem};
use std::io::{self, Write};

/// Writes results to stdout in the selected format.
pub struct OutputHandler {
    json: bool,
    exam_mode: bool,
}

impl OutputHandler {
    pub fn new(json: bool, exam_mode: bool) -> Self {
        Self { json, exam_mode }
    }

    pub fn poem(&self, out: &mut impl Write, poem: &Poem) -> io::Result<()> {
        if self.json {
            return write_json(out, poem);
        }
        writeln!(out, "{}", poem.title)?;
        writeln!(out, "{} · {}", poem.dynasty, poem.author)?;
        writeln!(out)?;
        if self.exam_mode {
            writeln!(out, "[exam mode: {} lines hidden]", poem.content.len())?;
        } else {
            for line in &poem.content {
                writeln!(out, "{}", line)?;
            }
        }
        Ok(())
    }

    pub fn poems(&self, out: &mut impl Write, poems: &[Poem]) -> io::Result<()> {
        if self.json {
            return write_json(out, &poems);
        }
        for poem in poems {
            writeln!(out, "{}\t{}\t{} · {}", poem.id, poem.title, poem.dynasty, poem.author)?;
        }
        Ok(())
    }

    pub fn entries(&self, out: &mut impl Write, entries: &[IndexEntry]) -> io::Result<()> {
        if self.json {
            return write_json(out, &entries);
        }
        for entry in entries {
            writeln!(
                out,
                "{}\t{}\t{} · {}",
                entry.id, entry.title, entry.dynasty, entry.author
            )?;
        }
        Ok(())
    }

    pub fn dictionary_entry(
        &self,
        out: &mut impl Write,
        entry: &DictionaryEntry,
    ) -> io::Result<()> {
        if self.json {
            return write_json(out, entry);
        }
        writeln!(out, "{}", entry.word)?;
        for meaning in &entry.meanings {
            writeln!(out)?;
            writeln!(out, "[{}]", meaning.kind)?;
            writeln!(out, "{}", meaning.content)?;
        }
        if !entry.source.is_empty() {
            writeln!(out)?;
            writeln!(out, "source: {}", entry.source)?;
        }
        Ok(())
    }

    pub fn words(&self, out: &mut impl Write, words: &[String]) -> io::Result<()> {
        if self.json {
            return write_json(out, &words);
        }
        for word in words {
            writeln!(out, "{}", word)?;
        }
        Ok(())
    }
}

fn write_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poem() -> Poem {
        Poem {
            id: "tang-0-0".into(),
            title: "静夜思".into(),
            author: "李白".into(),
            dynasty: "唐".into(),
            content: vec!["床前明月光".into(), "疑是地上霜".into()],
            rhythmic: None,
        }
    }

    fn render(
        handler: &OutputHandler,
        f: impl Fn(&OutputHandler, &mut Vec<u8>) -> io::Result<()>,
    ) -> String {
        let mut buf = Vec::new();
        f(handler, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_poem_text() {
        let text = render(&OutputHandler::new(false, false), |h, out| h.poem(out, &poem()));
        assert!(text.starts_with("静夜思\n唐 · 李白\n"));
        assert!(text.contains("疑是地上霜"));
    }

    #[test]
    fn test_poem_exam_mode_hides_content() {
        let text = render(&OutputHandler::new(false, true), |h, out| h.poem(out, &poem()));
        assert!(!text.contains("床前明月光"));
        assert!(text.contains("2 lines hidden"));
    }

    #[test]
    fn test_poems_json() {
        let text = render(&OutputHandler::new(true, false), |h, out| h.poems(out, &[poem()]));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["id"], "tang-0-0");
        assert_eq!(value[0]["content"][1], "疑是地上霜");
    }

    #[test]
    fn test_words_text() {
        let words = vec!["之".to_string(), "乎".to_string()];
        let text = render(&OutputHandler::new(false, false), |h, out| h.words(out, &words));
        assert_eq!(text, "之\n乎\n");
    }
}

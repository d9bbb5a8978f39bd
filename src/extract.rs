use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lesson::Lesson;

const COMMENT_MARKER: char = '#';
const WORD_OPEN: char = '[';
const WORD_CLOSE: char = ']';
const MEANING_DELIMITER: char = '/';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DelimiterError {
    #[error("no opening '{0}' found")]
    MissingOpen(char),
    #[error("no closing '{0}' found")]
    MissingClose(char),
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("line {line_number}: {field} {source}")]
    Malformed {
        line_number: usize,
        field: &'static str,
        #[source]
        source: DelimiterError,
    },
}

/// How lines that lack a delimiter pair are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountingMode {
    /// Every non-comment line consumes an id; missing fields come out empty.
    #[default]
    Legacy,
    /// Only fully parsed lines become records.
    Strict,
    /// The first malformed line aborts the run.
    Deny,
}

impl std::str::FromStr for CountingMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(raw.trim(), true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    Comment,
    Entry {
        word: Result<&'a str, DelimiterError>,
        meaning: Result<&'a str, DelimiterError>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub records: usize,
    pub comments: usize,
    pub malformed: usize,
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub lesson: Lesson,
    pub stats: ExtractStats,
}

/// Byte index of the first `needle` at or after `from`.
pub fn find_from(haystack: &str, needle: char, from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .find(needle)
        .map(|offset| offset + from)
}

/// Text strictly between the first `open` and the next `close` after it.
pub fn delimited(line: &str, open: char, close: char) -> Result<&str, DelimiterError> {
    let start = line.find(open).ok_or(DelimiterError::MissingOpen(open))? + open.len_utf8();
    let end = find_from(line, close, start).ok_or(DelimiterError::MissingClose(close))?;
    Ok(&line[start..end])
}

pub fn classify_line(line: &str) -> LineKind<'_> {
    if line.contains(COMMENT_MARKER) {
        return LineKind::Comment;
    }

    LineKind::Entry {
        word: delimited(line, WORD_OPEN, WORD_CLOSE),
        meaning: delimited(line, MEANING_DELIMITER, MEANING_DELIMITER),
    }
}

pub fn extract_lesson<'a, I>(
    lesson_id: u32,
    course: &str,
    lines: I,
    mode: CountingMode,
) -> Result<Extraction, ExtractError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut stats = ExtractStats::default();
    let mut entries = Vec::new();

    for (idx, line) in lines.into_iter().enumerate() {
        let line_number = idx + 1;
        let (word, meaning) = match classify_line(line) {
            LineKind::Comment => {
                stats.comments += 1;
                continue;
            }
            LineKind::Entry { word, meaning } => (word, meaning),
        };

        let failure = match (&word, &meaning) {
            (Err(err), _) => Some(("word", *err)),
            (_, Err(err)) => Some(("meaning", *err)),
            _ => None,
        };

        match failure {
            None => {
                entries.push((
                    word.unwrap_or_default().to_string(),
                    meaning.unwrap_or_default().to_string(),
                ));
            }
            Some((field, source)) => {
                stats.malformed += 1;
                match mode {
                    CountingMode::Deny => {
                        return Err(ExtractError::Malformed {
                            line_number,
                            field,
                            source,
                        });
                    }
                    CountingMode::Strict => {
                        tracing::warn!("Skipping line {}: {} {}", line_number, field, source);
                    }
                    CountingMode::Legacy => {
                        tracing::warn!(
                            "Line {} is malformed ({} {}); keeping it with empty fields",
                            line_number,
                            field,
                            source
                        );
                        entries.push((
                            word.unwrap_or_default().to_string(),
                            meaning.unwrap_or_default().to_string(),
                        ));
                    }
                }
            }
        }
    }

    stats.records = entries.len();
    tracing::debug!(
        "Extracted {} records for lesson {} ({} comments, {} malformed)",
        stats.records,
        lesson_id,
        stats.comments,
        stats.malformed
    );

    Ok(Extraction {
        lesson: Lesson::new(lesson_id, course, entries),
        stats,
    })
}

use anyhow::{Context, Result};
use clap::ValueEnum;
use thiserror::Error;

use crate::lesson::{Lesson, LessonError, VocabRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Object literal ready to paste into a source file
    #[default]
    Literal,
    /// Pretty-printed JSON lesson document
    Json,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("expected {expected} at offset {offset}")]
    Expected { expected: String, offset: usize },
    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },
    #[error("invalid number at offset {offset}")]
    InvalidNumber { offset: usize },
    #[error("unexpected trailing input at offset {offset}")]
    TrailingInput { offset: usize },
    #[error(transparent)]
    Lesson(#[from] LessonError),
}

pub fn render(lesson: &Lesson, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Literal => Ok(to_object_literal(lesson)),
        OutputFormat::Json => to_json(lesson),
    }
}

pub fn to_object_literal(lesson: &Lesson) -> String {
    let mut out = format!(
        "{{ lesson_id: {},\n course: {},\n name: {},\n vocab_size: {},\n vocab: [\n",
        lesson.lesson_id,
        quote(&lesson.course),
        quote(&lesson.name),
        lesson.vocab_size(),
    );

    let records: Vec<String> = lesson.vocab.iter().map(record_literal).collect();
    if !records.is_empty() {
        out.push_str(&records.join(",\n"));
        out.push('\n');
    }
    out.push_str("]}");
    out
}

pub fn to_json(lesson: &Lesson) -> Result<String> {
    serde_json::to_string_pretty(lesson).context("failed to serialize lesson to JSON")
}

fn record_literal(record: &VocabRecord) -> String {
    format!(
        "{{ id: {}, word: {} ,meaning: {} }}",
        record.id,
        quote(&record.word),
        quote(&record.meaning)
    )
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

/// Read a block produced by [`to_object_literal`] back into a [`Lesson`].
pub fn parse_object_literal(text: &str) -> Result<Lesson, FormatError> {
    let mut cursor = Cursor::new(text);

    cursor.expect("{")?;
    let lesson_id = cursor.field("lesson_id", Cursor::number)?;
    cursor.expect(",")?;
    let course = cursor.field("course", Cursor::string)?;
    cursor.expect(",")?;
    let name = cursor.field("name", Cursor::string)?;
    cursor.expect(",")?;
    let vocab_size = cursor.field("vocab_size", Cursor::number)? as usize;
    cursor.expect(",")?;
    cursor.key("vocab")?;
    cursor.expect("[")?;

    let mut vocab = Vec::new();
    if !cursor.eat("]") {
        loop {
            vocab.push(cursor.record()?);

            if cursor.eat(",") {
                continue;
            }
            cursor.expect("]")?;
            break;
        }
    }
    cursor.expect("}")?;
    cursor.finish()?;

    Lesson::from_parts(lesson_id, course, name, vocab_size, vocab).map_err(FormatError::from)
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_whitespace();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), FormatError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(FormatError::Expected {
                expected: format!("'{token}'"),
                offset: self.pos,
            })
        }
    }

    fn key(&mut self, name: &str) -> Result<(), FormatError> {
        self.expect(name)?;
        self.expect(":")
    }

    fn field<T>(
        &mut self,
        name: &str,
        value: impl FnOnce(&mut Self) -> Result<T, FormatError>,
    ) -> Result<T, FormatError> {
        self.key(name)?;
        value(self)
    }

    fn number(&mut self) -> Result<u32, FormatError> {
        self.skip_whitespace();
        let start = self.pos;
        let digits = self
            .rest()
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.rest().len());
        let raw = &self.rest()[..digits];
        let parsed = raw
            .parse()
            .map_err(|_| FormatError::InvalidNumber { offset: start })?;
        self.pos += digits;
        Ok(parsed)
    }

    fn string(&mut self) -> Result<String, FormatError> {
        self.skip_whitespace();
        let start = self.pos;
        if !self.rest().starts_with('\'') {
            return Err(FormatError::Expected {
                expected: "quoted string".to_string(),
                offset: start,
            });
        }

        let mut value = String::new();
        let mut chars = self.rest().char_indices().skip(1);
        while let Some((idx, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, escaped)) => value.push(escaped),
                    None => break,
                },
                '\'' => {
                    self.pos += idx + 1;
                    return Ok(value);
                }
                _ => value.push(c),
            }
        }

        Err(FormatError::UnterminatedString { offset: start })
    }

    fn record(&mut self) -> Result<VocabRecord, FormatError> {
        self.expect("{")?;
        let id = self.field("id", Cursor::number)?;
        self.expect(",")?;
        let word = self.field("word", Cursor::string)?;
        self.expect(",")?;
        let meaning = self.field("meaning", Cursor::string)?;
        self.expect("}")?;
        Ok(VocabRecord { id, word, meaning })
    }

    fn finish(&mut self) -> Result<(), FormatError> {
        self.skip_whitespace();
        if self.rest().is_empty() {
            Ok(())
        } else {
            Err(FormatError::TrailingInput { offset: self.pos })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesson::DEFAULT_COURSE;

    fn sample() -> Lesson {
        Lesson::new(
            3,
            DEFAULT_COURSE,
            vec![
                ("neko".to_string(), "cat".to_string()),
                ("inu".to_string(), "dog".to_string()),
            ],
        )
    }

    #[test]
    fn literal_matches_expected_layout() {
        let expected = "{ lesson_id: 3,\n course: 'Minna no Nihongo',\n name: 'Lesson 3',\n vocab_size: 2,\n vocab: [\n{ id: 1, word: 'neko' ,meaning: 'cat' },\n{ id: 2, word: 'inu' ,meaning: 'dog' }\n]}";
        assert_eq!(to_object_literal(&sample()), expected);
    }

    #[test]
    fn empty_lesson_renders_empty_vocab() {
        let lesson = Lesson::new(7, DEFAULT_COURSE, Vec::new());
        let literal = to_object_literal(&lesson);
        assert!(literal.contains(" vocab_size: 0,\n"));
        assert!(literal.ends_with("vocab: [\n]}"));
    }

    #[test]
    fn quotes_are_escaped() {
        let lesson = Lesson::new(
            1,
            DEFAULT_COURSE,
            vec![("o'cha".to_string(), "tea \\ green".to_string())],
        );
        let literal = to_object_literal(&lesson);
        assert!(literal.contains(r"word: 'o\'cha'"));
        assert!(literal.contains(r"meaning: 'tea \\ green'"));
    }

    #[test]
    fn literal_reads_back_into_same_lesson() {
        let lesson = Lesson::new(
            12,
            DEFAULT_COURSE,
            vec![
                ("ある".to_string(), "to exist".to_string()),
                ("o'cha".to_string(), "green tea".to_string()),
                (String::new(), String::new()),
            ],
        );

        let parsed = parse_object_literal(&to_object_literal(&lesson)).unwrap();
        assert_eq!(parsed, lesson);
    }

    #[test]
    fn empty_literal_reads_back() {
        let lesson = Lesson::new(4, DEFAULT_COURSE, Vec::new());
        let parsed = parse_object_literal(&to_object_literal(&lesson)).unwrap();
        assert_eq!(parsed.vocab_size(), 0);
        assert!(parsed.vocab.is_empty());
    }

    #[test]
    fn reader_rejects_size_mismatch() {
        let text = "{ lesson_id: 1, course: 'c', name: 'Lesson 1', vocab_size: 2, vocab: [\n{ id: 1, word: 'a' ,meaning: 'b' }\n]}";
        assert_eq!(
            parse_object_literal(text),
            Err(FormatError::Lesson(LessonError::SizeMismatch {
                declared: 2,
                actual: 1
            }))
        );
    }

    #[test]
    fn reader_rejects_out_of_order_ids() {
        let text = "{ lesson_id: 1, course: 'c', name: 'Lesson 1', vocab_size: 1, vocab: [{ id: 2, word: 'a' ,meaning: 'b' }]}";
        assert_eq!(
            parse_object_literal(text),
            Err(FormatError::Lesson(LessonError::IdOutOfOrder {
                expected: 1,
                found: 2
            }))
        );
    }

    #[test]
    fn reader_rejects_unterminated_string() {
        let text = "{ lesson_id: 1, course: 'Minna";
        assert!(matches!(
            parse_object_literal(text),
            Err(FormatError::UnterminatedString { .. })
        ));
    }

    #[test]
    fn reader_rejects_trailing_input() {
        let mut text = to_object_literal(&sample());
        text.push_str(" extra");
        assert!(matches!(
            parse_object_literal(&text),
            Err(FormatError::TrailingInput { .. })
        ));
    }

    #[test]
    fn json_output_parses_as_lesson() {
        let json = render(&sample(), OutputFormat::Json).unwrap();
        let back: Lesson = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample());
    }
}

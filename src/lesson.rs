use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_COURSE: &str = "Minna no Nihongo";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabRecord {
    pub id: u32,
    pub word: String,
    pub meaning: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LessonError {
    #[error("vocab_size declares {declared} records but {actual} are listed")]
    SizeMismatch { declared: usize, actual: usize },
    #[error("record id {found} out of order, expected {expected}")]
    IdOutOfOrder { expected: u32, found: u32 },
}

/// A lesson document. `vocab_size` is derived from `vocab` and only exists
/// in the serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "LessonDocument", try_from = "LessonDocument")]
pub struct Lesson {
    pub lesson_id: u32,
    pub course: String,
    pub name: String,
    pub vocab: Vec<VocabRecord>,
}

#[derive(Serialize, Deserialize)]
struct LessonDocument {
    lesson_id: u32,
    course: String,
    name: String,
    vocab_size: usize,
    vocab: Vec<VocabRecord>,
}

impl Lesson {
    /// Build a lesson from (word, meaning) pairs, assigning ids in order.
    pub fn new<I>(lesson_id: u32, course: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vocab = entries
            .into_iter()
            .zip(1u32..)
            .map(|((word, meaning), id)| VocabRecord { id, word, meaning })
            .collect();

        Self {
            lesson_id,
            course: course.into(),
            name: lesson_name(lesson_id),
            vocab,
        }
    }

    /// Assemble a lesson read from serialized text, checking the declared
    /// size and the id sequence against the records.
    pub fn from_parts(
        lesson_id: u32,
        course: String,
        name: String,
        declared_size: usize,
        vocab: Vec<VocabRecord>,
    ) -> Result<Self, LessonError> {
        for (expected, record) in (1u32..).zip(&vocab) {
            if record.id != expected {
                return Err(LessonError::IdOutOfOrder {
                    expected,
                    found: record.id,
                });
            }
        }

        if declared_size != vocab.len() {
            return Err(LessonError::SizeMismatch {
                declared: declared_size,
                actual: vocab.len(),
            });
        }

        Ok(Self {
            lesson_id,
            course,
            name,
            vocab,
        })
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    #[cfg(test)]
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.vocab
            .iter()
            .map(|record| (record.word.as_str(), record.meaning.as_str()))
            .collect()
    }
}

impl From<Lesson> for LessonDocument {
    fn from(lesson: Lesson) -> Self {
        Self {
            vocab_size: lesson.vocab_size(),
            lesson_id: lesson.lesson_id,
            course: lesson.course,
            name: lesson.name,
            vocab: lesson.vocab,
        }
    }
}

impl TryFrom<LessonDocument> for Lesson {
    type Error = LessonError;

    fn try_from(doc: LessonDocument) -> Result<Self, Self::Error> {
        Lesson::from_parts(doc.lesson_id, doc.course, doc.name, doc.vocab_size, doc.vocab)
    }
}

pub fn lesson_name(lesson_id: u32) -> String {
    format!("Lesson {lesson_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_sequential_ids_and_size() {
        let lesson = Lesson::new(
            3,
            DEFAULT_COURSE,
            vec![
                ("neko".to_string(), "cat".to_string()),
                ("inu".to_string(), "dog".to_string()),
            ],
        );

        assert_eq!(lesson.name, "Lesson 3");
        assert_eq!(lesson.vocab_size(), 2);
        assert_eq!(lesson.vocab[0].id, 1);
        assert_eq!(lesson.vocab[1].id, 2);
        assert_eq!(lesson.pairs(), vec![("neko", "cat"), ("inu", "dog")]);
    }

    #[test]
    fn empty_lesson_has_zero_size() {
        let lesson = Lesson::new(1, DEFAULT_COURSE, Vec::new());
        assert_eq!(lesson.vocab_size(), 0);
        assert!(lesson.vocab.is_empty());
    }

    #[test]
    fn size_follows_record_list() {
        let mut lesson = Lesson::new(
            1,
            DEFAULT_COURSE,
            vec![("aru".to_string(), "to exist".to_string())],
        );
        lesson.vocab.clear();

        let value = serde_json::to_value(&lesson).unwrap();
        assert_eq!(lesson.vocab_size(), 0);
        assert_eq!(value["vocab_size"], 0);
    }

    #[test]
    fn json_uses_document_field_names() {
        let lesson = Lesson::new(
            2,
            DEFAULT_COURSE,
            vec![("aru".to_string(), "to exist".to_string())],
        );
        let value = serde_json::to_value(&lesson).unwrap();

        assert_eq!(value["lesson_id"], 2);
        assert_eq!(value["course"], "Minna no Nihongo");
        assert_eq!(value["vocab_size"], 1);
        assert_eq!(value["vocab"][0]["word"], "aru");
        assert_eq!(value["vocab"][0]["meaning"], "to exist");
    }

    #[test]
    fn json_with_wrong_size_is_rejected() {
        let raw = r#"{"lesson_id":1,"course":"c","name":"Lesson 1","vocab_size":3,
            "vocab":[{"id":1,"word":"a","meaning":"b"}]}"#;
        let err = serde_json::from_str::<Lesson>(raw).unwrap_err();
        assert!(err.to_string().contains("vocab_size declares 3"));
    }

    #[test]
    fn json_with_gapped_ids_is_rejected() {
        let raw = r#"{"lesson_id":1,"course":"c","name":"Lesson 1","vocab_size":1,
            "vocab":[{"id":4,"word":"a","meaning":"b"}]}"#;
        assert!(serde_json::from_str::<Lesson>(raw).is_err());
    }

    #[test]
    fn from_parts_checks_ids_before_size() {
        let vocab = vec![VocabRecord {
            id: 2,
            word: "a".to_string(),
            meaning: "b".to_string(),
        }];
        assert_eq!(
            Lesson::from_parts(1, "c".to_string(), "Lesson 1".to_string(), 5, vocab),
            Err(LessonError::IdOutOfOrder {
                expected: 1,
                found: 2
            })
        );
    }
}

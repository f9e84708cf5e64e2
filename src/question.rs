use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::{LoadError, RecordError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    /// Answer stays hidden until the user asks for it.
    Reveal { answer: String },
    Choice {
        options: Vec<String>,
        correct_index: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    kind: QuestionKind,
}

impl Question {
    #[cfg(test)]
    pub fn reveal(text: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: QuestionKind::Reveal {
                answer: answer.into(),
            },
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> &QuestionKind {
        &self.kind
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            QuestionKind::Reveal { .. } => write!(f, "{} (reveal)", self.text),
            QuestionKind::Choice { options, .. } => {
                write!(f, "{} ({} options)", self.text, options.len())
            }
        }
    }
}

/// One entry of the question file as it is written on disk.
#[derive(Debug, Deserialize)]
struct QuestionRecord {
    question: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    answer: Option<String>,
    options: Option<Vec<String>>,
    correct_index: Option<i64>,
}

impl QuestionRecord {
    fn validate(self) -> Result<Question, RecordError> {
        let text = self.question.ok_or(RecordError::MissingField("question"))?;
        let kind = match self.kind.as_deref() {
            Some("spoiler") => QuestionKind::Reveal {
                answer: self.answer.ok_or(RecordError::MissingField("answer"))?,
            },
            Some("quiz") => {
                let options = self.options.ok_or(RecordError::MissingField("options"))?;
                let index = self
                    .correct_index
                    .ok_or(RecordError::MissingField("correct_index"))?;
                let correct_index = usize::try_from(index)
                    .ok()
                    .filter(|i| *i < options.len())
                    .ok_or(RecordError::CorrectIndexOutOfRange {
                        index,
                        len: options.len(),
                    })?;
                QuestionKind::Choice {
                    options,
                    correct_index,
                }
            }
            Some(other) => return Err(RecordError::UnknownKind(other.to_owned())),
            None => return Err(RecordError::MissingField("type")),
        };

        Ok(Question { text, kind })
    }
}

/// The full question set. Never empty and never mutated after loading.
#[derive(Debug, Clone)]
pub struct QuestionStore {
    questions: Vec<Question>,
}

impl QuestionStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, LoadError> {
        let records: Vec<QuestionRecord> = serde_json::from_str(contents)?;
        let questions = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                record
                    .validate()
                    .map_err(|reason| LoadError::InvalidRecord { index, reason })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(questions)
    }

    pub fn new(questions: Vec<Question>) -> Result<Self, LoadError> {
        if questions.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(Self { questions })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }
}

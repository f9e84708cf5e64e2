use std::net::AddrParseError;
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read question file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("question file is not a valid JSON array of questions: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question file contains no questions")]
    Empty,
    #[error("question #{index} is invalid: {reason}")]
    InvalidRecord { index: usize, reason: RecordError },
}

/// Why a single question record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("unknown question type `{0}`")]
    UnknownKind(String),
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("correct_index {index} is out of range for {len} options")]
    CorrectIndexOutOfRange { index: i64, len: usize },
}

#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("TELOXIDE_TOKEN should be set")]
    MissingToken,
    #[error("PORT `{value}` can't be parsed: {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("WEBHOOK_URL `{value}` can't be parsed: {source}")]
    InvalidWebhookUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("WEBHOOK_ADDR `{value}` can't be parsed: {source}")]
    InvalidWebhookAddr {
        value: String,
        #[source]
        source: AddrParseError,
    },
    #[error("WEBHOOK_URL and WEBHOOK_ADDR must be set together")]
    IncompleteWebhook,
}

/// An `answer_<index>` tag that does not name an option of the current question.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("selection `{raw}` is not an option index: {source}")]
    NotANumber {
        raw: String,
        #[source]
        source: ParseIntError,
    },
    #[error("selection {index} is out of range for {len} options")]
    OutOfRange { index: usize, len: usize },
}

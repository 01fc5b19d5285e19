//! Error types for exam loading and evaluation sessions.

use std::path::PathBuf;

use thiserror::Error;

/// Reasons an exam document cannot be turned into an [`ExamDefinition`].
///
/// Any of these means no session may be started for the document.
///
/// [`ExamDefinition`]: crate::model::ExamDefinition
#[derive(Debug, Error)]
pub enum LoadError {
    /// The exam file does not exist.
    #[error("exam file not found: {0}")]
    NotFound(PathBuf),

    /// The exam file exists but could not be read.
    #[error("failed to read exam file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The content is not well-formed JSON.
    #[error("exam document is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The top-level value is not a JSON object.
    #[error("exam document must be a JSON object")]
    NotAMapping,

    /// There is no `questions` array.
    #[error("exam document has no `questions` array")]
    MissingQuestions,

    /// Every entry of `questions` was rejected during normalization.
    #[error("exam document contains no valid questions")]
    NoValidQuestions,
}

/// Errors raised by [`ExamSession`] transitions.
///
/// None of these change the session state; the caller reports them in place.
///
/// [`ExamSession`]: crate::session::ExamSession
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// `check` was requested before any answer was selected.
    #[error("select an answer before checking")]
    NoSelection,

    /// The current question has already been checked and is frozen.
    #[error("question {0} has already been checked")]
    AlreadyChecked(usize),

    /// The selected answer index does not exist for the current question.
    #[error("answer {answer} is out of range (question has {count} answers)")]
    AnswerOutOfRange { answer: usize, count: usize },

    /// Finishing was requested away from the last question.
    #[error("question {0} is not the last question")]
    NotLastQuestion(usize),

    /// The session has reached its summary or was cancelled.
    #[error("the evaluation is no longer in progress")]
    NotInProgress,
}

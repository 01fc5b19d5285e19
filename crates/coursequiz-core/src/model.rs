//! Core data model types for coursequiz.
//!
//! An [`ExamDefinition`] is the immutable, normalized form of an exam
//! document. Sessions derive [`RuntimeQuestion`]s from it and track one
//! [`QuestionState`] per question; completed sessions produce an
//! [`AttemptRecord`].

use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Percentage at or above which an attempt counts as passed.
pub const PASS_PERCENT: f64 = 60.0;

/// Timestamp format used for [`AttemptRecord::date`].
pub const ATTEMPT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A validated exam, immutable after loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamDefinition {
    /// Exam title shown to the user.
    pub title: String,
    /// Questions in authoring order. Never empty.
    pub questions: Vec<QuestionSpec>,
    /// How many questions a session presents. At most `questions.len()`.
    pub num_questions_to_run: usize,
    /// Shuffle question order per session.
    pub random_questions: bool,
    /// Shuffle answer order per question per session.
    pub random_answers: bool,
    /// Message shown when the attempt passes.
    pub final_message_pass: String,
    /// Message shown when the attempt fails.
    pub final_message_fail: String,
}

impl ExamDefinition {
    /// Total number of authored questions.
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Number of questions a session will present. Zero means all.
    pub fn run_count(&self) -> usize {
        match self.num_questions_to_run {
            0 => self.questions.len(),
            n => n.min(self.questions.len()),
        }
    }

    /// Sum of all question weights.
    pub fn total_score(&self) -> f64 {
        self.questions.iter().map(|q| q.score).sum()
    }
}

/// A single authored question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSpec {
    /// Question prompt.
    pub text: String,
    /// Answer options, at least two.
    pub answers: Vec<String>,
    /// Index of the correct option in `answers`.
    pub correct_index: usize,
    /// Point weight of this question.
    pub score: f64,
    /// Feedback shown after the answer is checked.
    #[serde(default)]
    pub explanation: String,
}

/// A question as presented in one session.
///
/// Answers may be reordered relative to the source question, in which case
/// `correct_index` has been remapped to follow the correct answer.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeQuestion {
    /// Position of the source question in [`ExamDefinition::questions`].
    pub source_index: usize,
    pub text: String,
    pub answers: Vec<String>,
    pub correct_index: usize,
    pub score: f64,
    pub explanation: String,
}

impl RuntimeQuestion {
    /// The text of the correct answer.
    pub fn correct_answer(&self) -> &str {
        self.answers
            .get(self.correct_index)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// Per-question progress within a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestionState {
    /// The answer currently selected, if any.
    pub selected_index: Option<usize>,
    /// Set once the answer has been checked; freezes `selected_index`.
    pub checked: bool,
    /// Whether the checked answer was correct. Meaningless until `checked`.
    pub correct: bool,
}

impl QuestionState {
    pub fn is_answered(&self) -> bool {
        self.selected_index.is_some()
    }
}

/// Identity under which attempts are recorded: course plus exam name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExamIdentity {
    /// Root folder of the course the exam belongs to.
    pub course_path: PathBuf,
    /// Exam name, conventionally the exam file stem.
    pub exam_name: String,
}

impl ExamIdentity {
    pub fn new(course_path: impl Into<PathBuf>, exam_name: impl Into<String>) -> Self {
        Self {
            course_path: course_path.into(),
            exam_name: exam_name.into(),
        }
    }

    /// Build an identity from an exam file, naming the exam after its stem.
    pub fn from_exam_file(course_path: impl Into<PathBuf>, exam_file: &Path) -> Self {
        let exam_name = exam_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(course_path, exam_name)
    }
}

/// One completed evaluation, as persisted in the attempt history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Local completion time, formatted with [`ATTEMPT_DATE_FORMAT`].
    pub date: String,
    /// Points obtained.
    pub score: f64,
    /// Points available.
    pub max: f64,
    /// `score / max * 100`, or 0 when `max` is 0.
    pub percent: f64,
}

impl AttemptRecord {
    /// Create a record dated now.
    pub fn now(score: f64, max: f64) -> Self {
        Self::with_date(Local::now().format(ATTEMPT_DATE_FORMAT).to_string(), score, max)
    }

    pub fn with_date(date: impl Into<String>, score: f64, max: f64) -> Self {
        Self {
            date: date.into(),
            score,
            max,
            percent: percent_of(score, max),
        }
    }

    pub fn is_pass(&self) -> bool {
        self.percent >= PASS_PERCENT
    }
}

/// Percentage of `score` over `max`; 0 when `max` is not positive.
pub fn percent_of(score: f64, max: f64) -> f64 {
    if max > 0.0 {
        score / max * 100.0
    } else {
        0.0
    }
}

//! Attempt history reader.

use serde::{Deserialize, Serialize};

use crate::model::{AttemptRecord, ExamIdentity};
use crate::traits::AttemptStore;

/// The recorded attempts of one exam, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttemptHistory {
    pub attempts: Vec<AttemptRecord>,
}

impl AttemptHistory {
    /// Read the history of `identity` from `store`.
    pub fn load<S>(store: &S, identity: &ExamIdentity) -> Self
    where
        S: AttemptStore + ?Sized,
    {
        Self {
            attempts: store.test_history(&identity.course_path, &identity.exam_name),
        }
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Highest percentage reached, `None` without attempts.
    pub fn best_percent(&self) -> Option<f64> {
        self.attempts
            .iter()
            .map(|a| a.percent)
            .fold(None, |best, p| Some(best.map_or(p, |b: f64| b.max(p))))
    }

    /// Most recent attempt.
    pub fn latest(&self) -> Option<&AttemptRecord> {
        self.attempts.last()
    }

    /// Number of attempts at or above the pass mark.
    pub fn passed_count(&self) -> usize {
        self.attempts.iter().filter(|a| a.is_pass()).count()
    }

    /// One-line status as shown before starting an exam.
    pub fn headline(&self) -> String {
        match self.best_percent() {
            None => "This evaluation has not been taken yet.".to_string(),
            Some(best) => format!(
                "History: {} attempt(s) | Best score: {best:.2}%",
                self.len()
            ),
        }
    }
}

//! Persistence contract consumed by the exam engine.
//!
//! The engine never sees the storage layout; it only reads whole attempt
//! histories and appends whole records. Implemented by the JSON store in
//! `coursequiz-store` and by [`MemoryStore`](crate::memory::MemoryStore).

use std::path::Path;

use crate::model::AttemptRecord;

/// Attempt history storage keyed by `(course_path, exam_name)`.
pub trait AttemptStore {
    /// All recorded attempts for an exam, oldest first. Unknown keys yield
    /// an empty list.
    fn test_history(&self, course_path: &Path, exam_name: &str) -> Vec<AttemptRecord>;

    /// Append an attempt, creating the course and exam entries on first use.
    ///
    /// Returns only once the record is durable, so a following
    /// [`test_history`](Self::test_history) call observes it.
    fn add_test_attempt(
        &mut self,
        course_path: &Path,
        exam_name: &str,
        attempt: AttemptRecord,
    ) -> anyhow::Result<()>;
}

impl<S: AttemptStore + ?Sized> AttemptStore for &mut S {
    fn test_history(&self, course_path: &Path, exam_name: &str) -> Vec<AttemptRecord> {
        (**self).test_history(course_path, exam_name)
    }

    fn add_test_attempt(
        &mut self,
        course_path: &Path,
        exam_name: &str,
        attempt: AttemptRecord,
    ) -> anyhow::Result<()> {
        (**self).add_test_attempt(course_path, exam_name, attempt)
    }
}

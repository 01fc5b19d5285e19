//! In-memory attempt store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::model::AttemptRecord;
use crate::traits::AttemptStore;

/// An [`AttemptStore`] that keeps histories in a map.
///
/// Useful for tests and for running an exam without recording anything to
/// disk. [`MemoryStore::failing`] builds a store whose writes always fail.
#[derive(Debug, Default)]
pub struct MemoryStore {
    histories: HashMap<(PathBuf, String), Vec<AttemptRecord>>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every append.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Number of attempts stored across all exams.
    pub fn attempt_count(&self) -> usize {
        self.histories.values().map(Vec::len).sum()
    }
}

impl AttemptStore for MemoryStore {
    fn test_history(&self, course_path: &Path, exam_name: &str) -> Vec<AttemptRecord> {
        self.histories
            .get(&(course_path.to_path_buf(), exam_name.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn add_test_attempt(
        &mut self,
        course_path: &Path,
        exam_name: &str,
        attempt: AttemptRecord,
    ) -> anyhow::Result<()> {
        if self.fail_writes {
            anyhow::bail!("attempt store is read-only");
        }
        self.histories
            .entry((course_path.to_path_buf(), exam_name.to_string()))
            .or_default()
            .push(attempt);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_in_order_per_exam() {
        let mut store = MemoryStore::new();
        let course = Path::new("/courses/rust");
        store
            .add_test_attempt(course, "intro", AttemptRecord::with_date("d1", 1.0, 2.0))
            .unwrap();
        store
            .add_test_attempt(course, "intro", AttemptRecord::with_date("d2", 2.0, 2.0))
            .unwrap();
        store
            .add_test_attempt(course, "other", AttemptRecord::with_date("d3", 0.0, 2.0))
            .unwrap();

        let history = store.test_history(course, "intro");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].date, "d1");
        assert_eq!(history[1].date, "d2");
        assert_eq!(store.attempt_count(), 3);
        assert!(store.test_history(course, "missing").is_empty());
    }

    #[test]
    fn failing_store_rejects_writes() {
        let mut store = MemoryStore::failing();
        let result = store.add_test_attempt(
            Path::new("/c"),
            "e",
            AttemptRecord::with_date("d", 1.0, 1.0),
        );
        assert!(result.is_err());
        assert_eq!(store.attempt_count(), 0);
    }
}

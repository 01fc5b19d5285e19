//! Weighted scoring, result tiers and attempt recording.

use std::fmt;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::model::{
    percent_of, AttemptRecord, ExamDefinition, ExamIdentity, QuestionState, RuntimeQuestion,
    PASS_PERCENT,
};
use crate::traits::AttemptStore;

/// Result of scoring one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Points obtained.
    pub score: f64,
    /// Points available.
    pub max: f64,
    /// `score / max * 100`, 0 when `max` is 0.
    pub percent: f64,
    /// "Question N: text" for each correctly answered question.
    pub correct: Vec<String>,
    /// "Question N: text" for each wrong or unanswered question.
    pub incorrect: Vec<String>,
}

impl ScoreSummary {
    pub fn band(&self) -> Band {
        Band::from_percent(self.percent)
    }

    pub fn is_pass(&self) -> bool {
        self.percent >= PASS_PERCENT
    }

    /// The attempt record for this result, dated now.
    pub fn to_attempt(&self) -> AttemptRecord {
        AttemptRecord::now(self.score, self.max)
    }
}

/// Score a session from its questions and their states.
///
/// A question counts as correct only when an answer is selected and equals
/// the runtime correct index; every question adds its weight to `max`.
pub fn score_session(questions: &[RuntimeQuestion], states: &[QuestionState]) -> ScoreSummary {
    let mut score = 0.0;
    let mut max = 0.0;
    let mut correct = Vec::new();
    let mut incorrect = Vec::new();

    for (i, question) in questions.iter().enumerate() {
        max += question.score;
        let selected = states.get(i).and_then(|s| s.selected_index);
        let label = format!("Question {}: {}", i + 1, question.text);
        if selected == Some(question.correct_index) {
            score += question.score;
            correct.push(label);
        } else {
            incorrect.push(label);
        }
    }

    ScoreSummary {
        score,
        max,
        percent: percent_of(score, max),
        correct,
        incorrect,
    }
}

/// Presentation tier of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    /// Below 60%.
    Fail,
    /// 60% up to 75%.
    Weak,
    /// 75% up to and including 95%.
    Good,
    /// Above 95%.
    Excellent,
}

impl Band {
    pub fn from_percent(percent: f64) -> Self {
        if percent < PASS_PERCENT {
            Band::Fail
        } else if percent < 75.0 {
            Band::Weak
        } else if percent <= 95.0 {
            Band::Good
        } else {
            Band::Excellent
        }
    }

    pub fn is_pass(self) -> bool {
        self != Band::Fail
    }

    /// Fixed feedback line for the tier.
    pub fn message(self) -> &'static str {
        match self {
            Band::Fail => "The knowledge evaluation was not passed.",
            Band::Weak => "The knowledge evaluation was passed, although several gaps are evident.",
            Band::Good => "You passed the knowledge evaluation, though you can still improve your results.",
            Band::Excellent => "You fully passed the knowledge evaluation. Excellent work!",
        }
    }

    /// The exam's own closing message for this tier.
    pub fn final_message(self, exam: &ExamDefinition) -> &str {
        if self.is_pass() {
            &exam.final_message_pass
        } else {
            &exam.final_message_fail
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::Fail => write!(f, "fail"),
            Band::Weak => write!(f, "pass (weak)"),
            Band::Good => write!(f, "pass (good)"),
            Band::Excellent => write!(f, "pass (excellent)"),
        }
    }
}

/// Append an attempt to the history of `identity`.
pub fn record_attempt<S>(
    store: &mut S,
    identity: &ExamIdentity,
    attempt: &AttemptRecord,
) -> anyhow::Result<()>
where
    S: AttemptStore + ?Sized,
{
    store
        .add_test_attempt(&identity.course_path, &identity.exam_name, attempt.clone())
        .with_context(|| format!("failed to record attempt for exam '{}'", identity.exam_name))?;
    tracing::info!(
        exam = %identity.exam_name,
        score = attempt.score,
        max = attempt.max,
        percent = attempt.percent,
        "attempt recorded"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn question(text: &str, correct_index: usize, score: f64) -> RuntimeQuestion {
        RuntimeQuestion {
            source_index: 0,
            text: text.into(),
            answers: vec!["a".into(), "b".into()],
            correct_index,
            score,
            explanation: String::new(),
        }
    }

    fn answered(selected: Option<usize>) -> QuestionState {
        QuestionState {
            selected_index: selected,
            ..QuestionState::default()
        }
    }

    fn two_questions() -> Vec<RuntimeQuestion> {
        vec![question("first", 0, 1.0), question("second", 1, 1.0)]
    }

    #[test]
    fn all_correct_scores_full() {
        let summary = score_session(&two_questions(), &[answered(Some(0)), answered(Some(1))]);
        assert_eq!(summary.score, 2.0);
        assert_eq!(summary.max, 2.0);
        assert_eq!(summary.percent, 100.0);
        assert_eq!(summary.correct.len(), 2);
        assert!(summary.incorrect.is_empty());
    }

    #[test]
    fn one_wrong_scores_half() {
        let summary = score_session(&two_questions(), &[answered(Some(1)), answered(Some(1))]);
        assert_eq!(summary.score, 1.0);
        assert_eq!(summary.max, 2.0);
        assert_eq!(summary.percent, 50.0);
        assert_eq!(summary.incorrect, vec!["Question 1: first"]);
        assert_eq!(summary.correct, vec!["Question 2: second"]);
    }

    #[test]
    fn unanswered_counts_as_incorrect() {
        let summary = score_session(&two_questions(), &[answered(None), answered(Some(1))]);
        assert_eq!(summary.score, 1.0);
        assert_eq!(summary.incorrect.len(), 1);
    }

    #[test]
    fn weights_are_applied() {
        let questions = vec![question("heavy", 0, 3.0), question("light", 0, 1.0)];
        let summary = score_session(&questions, &[answered(Some(0)), answered(Some(1))]);
        assert_eq!(summary.score, 3.0);
        assert_eq!(summary.max, 4.0);
        assert_eq!(summary.percent, 75.0);
    }

    #[test]
    fn zero_weights_give_zero_percent() {
        let questions = vec![question("free", 0, 0.0)];
        let summary = score_session(&questions, &[answered(Some(0))]);
        assert_eq!(summary.max, 0.0);
        assert_eq!(summary.percent, 0.0);
    }

    #[test]
    fn scoring_is_deterministic() {
        let states = [answered(Some(0)), answered(None)];
        assert_eq!(
            score_session(&two_questions(), &states),
            score_session(&two_questions(), &states)
        );
    }

    #[test]
    fn band_thresholds() {
        assert_eq!(Band::from_percent(0.0), Band::Fail);
        assert_eq!(Band::from_percent(59.0), Band::Fail);
        assert_eq!(Band::from_percent(59.5), Band::Fail);
        assert_eq!(Band::from_percent(60.0), Band::Weak);
        assert_eq!(Band::from_percent(74.0), Band::Weak);
        assert_eq!(Band::from_percent(74.5), Band::Weak);
        assert_eq!(Band::from_percent(75.0), Band::Good);
        assert_eq!(Band::from_percent(95.0), Band::Good);
        assert_eq!(Band::from_percent(95.5), Band::Excellent);
        assert_eq!(Band::from_percent(100.0), Band::Excellent);
    }

    #[test]
    fn band_picks_final_message() {
        let exam = ExamDefinition {
            title: "t".into(),
            questions: vec![],
            num_questions_to_run: 0,
            random_questions: false,
            random_answers: false,
            final_message_pass: "pass".into(),
            final_message_fail: "fail".into(),
        };
        assert_eq!(Band::Fail.final_message(&exam), "fail");
        assert_eq!(Band::Weak.final_message(&exam), "pass");
        assert_eq!(Band::Excellent.final_message(&exam), "pass");
    }

    #[test]
    fn record_attempt_appends() {
        let mut store = MemoryStore::new();
        let identity = ExamIdentity::new("/course", "intro");
        let attempt = AttemptRecord::with_date("2025-01-01 00:00:00", 1.0, 2.0);
        record_attempt(&mut store, &identity, &attempt).unwrap();
        assert_eq!(store.test_history(&identity.course_path, "intro"), vec![attempt]);
    }

    #[test]
    fn record_attempt_surfaces_write_failure() {
        let mut store = MemoryStore::failing();
        let identity = ExamIdentity::new("/course", "intro");
        let err = record_attempt(&mut store, &identity, &AttemptRecord::now(1.0, 1.0)).unwrap_err();
        assert!(format!("{err:#}").contains("intro"));
    }
}

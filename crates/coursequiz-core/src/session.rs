//! Evaluation session state machine.
//!
//! A session starts at the first question and moves strictly one question at
//! a time. Selecting an answer writes it immediately; checking freezes it and
//! emits feedback. Advancing past the last question scores the session,
//! records the attempt and enters the summary, which happens at most once.

use rand::Rng;
use uuid::Uuid;

use crate::builder::build_runtime_questions;
use crate::error::SessionError;
use crate::history::AttemptHistory;
use crate::model::{AttemptRecord, ExamDefinition, ExamIdentity, QuestionState, RuntimeQuestion};
use crate::scoring::{record_attempt, score_session, Band, ScoreSummary};
use crate::traits::AttemptStore;

/// Where a session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Showing the question at this index.
    InProgress(usize),
    /// Scored and recorded. Terminal.
    Summary,
    /// Abandoned before the summary. Terminal, nothing recorded.
    Cancelled,
}

/// Feedback emitted when an answer is checked.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    /// Index of the checked question.
    pub question: usize,
    pub correct: bool,
    /// Text of the correct answer.
    pub correct_answer: String,
    /// Author's explanation, possibly empty.
    pub explanation: String,
}

/// The result of a finished session.
#[derive(Debug)]
pub struct ExamOutcome {
    pub summary: ScoreSummary,
    pub band: Band,
    /// The record that was (or should have been) appended to the history.
    pub attempt: AttemptRecord,
    /// The exam's closing message for this band.
    pub final_message: String,
    /// Set when the attempt could not be recorded. The score stays valid.
    pub record_error: Option<anyhow::Error>,
}

impl ExamOutcome {
    pub fn recorded(&self) -> bool {
        self.record_error.is_none()
    }
}

/// What a navigation request did.
#[derive(Debug)]
pub enum Step {
    /// Now showing the question at this index.
    Question(usize),
    /// Nothing happened (e.g. `previous` on the first question).
    Unchanged,
    /// Finishing needs confirmation because these questions are unanswered.
    /// The session stays on the last question; call
    /// [`ExamSession::finish`] with `allow_incomplete` to proceed.
    ConfirmIncomplete { unanswered: Vec<usize> },
    /// The session was scored and entered its summary.
    Finished(ExamOutcome),
}

/// Receives session events, typically to render them.
pub trait SessionObserver {
    fn on_question(&self, index: usize, question: &RuntimeQuestion, state: &QuestionState);
    fn on_feedback(&self, feedback: &Feedback);
    fn on_finished(&self, outcome: &ExamOutcome);
    fn on_cancelled(&self);
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_question(&self, _: usize, _: &RuntimeQuestion, _: &QuestionState) {}
    fn on_feedback(&self, _: &Feedback) {}
    fn on_finished(&self, _: &ExamOutcome) {}
    fn on_cancelled(&self) {}
}

/// One run of an exam.
///
/// Owns its runtime questions and their states; borrows the exam definition
/// and the attempt store for its lifetime.
pub struct ExamSession<'a> {
    id: Uuid,
    exam: &'a ExamDefinition,
    identity: ExamIdentity,
    questions: Vec<RuntimeQuestion>,
    states: Vec<QuestionState>,
    state: SessionState,
    store: &'a mut dyn AttemptStore,
    observer: &'a dyn SessionObserver,
}

impl<'a> ExamSession<'a> {
    /// Start a session, shuffling with the thread-local generator.
    pub fn start(
        exam: &'a ExamDefinition,
        identity: ExamIdentity,
        store: &'a mut dyn AttemptStore,
    ) -> Self {
        Self::start_with_rng(exam, identity, store, &mut rand::thread_rng())
    }

    /// Start a session, shuffling with `rng`.
    pub fn start_with_rng<R>(
        exam: &'a ExamDefinition,
        identity: ExamIdentity,
        store: &'a mut dyn AttemptStore,
        rng: &mut R,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        let questions = build_runtime_questions(exam, rng);
        Self::from_questions(exam, identity, questions, store)
    }

    /// Start a session over an already built question set.
    pub fn from_questions(
        exam: &'a ExamDefinition,
        identity: ExamIdentity,
        questions: Vec<RuntimeQuestion>,
        store: &'a mut dyn AttemptStore,
    ) -> Self {
        let id = Uuid::new_v4();
        tracing::info!(
            session = %id,
            exam = %identity.exam_name,
            questions = questions.len(),
            "evaluation started"
        );
        Self {
            id,
            exam,
            identity,
            states: vec![QuestionState::default(); questions.len()],
            questions,
            state: SessionState::InProgress(0),
            store,
            observer: &NoopObserver,
        }
    }

    /// Route events to `observer`.
    pub fn with_observer(mut self, observer: &'a dyn SessionObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn exam(&self) -> &ExamDefinition {
        self.exam
    }

    pub fn identity(&self) -> &ExamIdentity {
        &self.identity
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn questions(&self) -> &[RuntimeQuestion] {
        &self.questions
    }

    pub fn question_states(&self) -> &[QuestionState] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Index of the question on screen, if the session is in progress.
    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            SessionState::InProgress(index) => Some(index),
            _ => None,
        }
    }

    /// The question on screen and its state.
    pub fn current(&self) -> Option<(&RuntimeQuestion, &QuestionState)> {
        let index = self.current_index()?;
        Some((self.questions.get(index)?, self.states.get(index)?))
    }

    pub fn is_last(&self) -> bool {
        self.current_index() == Some(self.last_index())
    }

    /// Indices of questions with no selected answer.
    pub fn unanswered(&self) -> Vec<usize> {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_answered())
            .map(|(i, _)| i)
            .collect()
    }

    /// Prior attempts of this exam.
    pub fn history(&self) -> AttemptHistory {
        AttemptHistory::load(&*self.store, &self.identity)
    }

    /// Re-emit the current question to the observer.
    pub fn show_current(&self) {
        if let Some(index) = self.current_index() {
            if let (Some(question), Some(state)) = (self.questions.get(index), self.states.get(index)) {
                self.observer.on_question(index, question, state);
            }
        }
    }

    /// Select `answer` for the current question.
    ///
    /// May be repeated freely until the question is checked.
    pub fn select(&mut self, answer: usize) -> Result<(), SessionError> {
        let index = self.in_progress()?;
        let count = self.questions.get(index).map_or(0, |q| q.answers.len());
        let state = self.states.get_mut(index).ok_or(SessionError::NotInProgress)?;

        if state.checked {
            return Err(SessionError::AlreadyChecked(index));
        }
        if answer >= count {
            return Err(SessionError::AnswerOutOfRange { answer, count });
        }

        state.selected_index = Some(answer);
        tracing::debug!(session = %self.id, question = index, answer, "answer selected");
        Ok(())
    }

    /// Check the current answer.
    ///
    /// Returns the feedback the first time. Checking an already checked
    /// question changes nothing and returns `None`.
    pub fn check(&mut self) -> Result<Option<Feedback>, SessionError> {
        let index = self.in_progress()?;
        let question = self.questions.get(index).ok_or(SessionError::NotInProgress)?;
        let state = self.states.get_mut(index).ok_or(SessionError::NotInProgress)?;

        if state.checked {
            return Ok(None);
        }
        let selected = state.selected_index.ok_or(SessionError::NoSelection)?;

        state.checked = true;
        state.correct = selected == question.correct_index;

        let feedback = Feedback {
            question: index,
            correct: state.correct,
            correct_answer: question.correct_answer().to_string(),
            explanation: question.explanation.clone(),
        };
        tracing::debug!(session = %self.id, question = index, correct = feedback.correct, "answer checked");
        self.observer.on_feedback(&feedback);
        Ok(Some(feedback))
    }

    /// Move to the next question, or finish on the last one.
    pub fn next(&mut self) -> Result<Step, SessionError> {
        let index = self.in_progress()?;
        if index < self.last_index() {
            Ok(self.go_to(index + 1))
        } else {
            self.finish(false)
        }
    }

    /// Move to the previous question. No-op on the first one.
    pub fn previous(&mut self) -> Result<Step, SessionError> {
        let index = self.in_progress()?;
        if index == 0 {
            return Ok(Step::Unchanged);
        }
        Ok(self.go_to(index - 1))
    }

    /// Score and record the session from its last question.
    ///
    /// With unanswered questions and `allow_incomplete == false` this stays
    /// on the last question and asks for confirmation instead. Unanswered
    /// questions score as incorrect.
    pub fn finish(&mut self, allow_incomplete: bool) -> Result<Step, SessionError> {
        let index = self.in_progress()?;
        if index != self.last_index() {
            return Err(SessionError::NotLastQuestion(index));
        }

        let unanswered = self.unanswered();
        if !unanswered.is_empty() && !allow_incomplete {
            tracing::debug!(session = %self.id, unanswered = unanswered.len(), "finish needs confirmation");
            return Ok(Step::ConfirmIncomplete { unanswered });
        }

        let summary = score_session(&self.questions, &self.states);
        let band = summary.band();
        let attempt = summary.to_attempt();
        let record_error = match record_attempt(&mut *self.store, &self.identity, &attempt) {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(session = %self.id, "attempt not recorded: {e:#}");
                Some(e)
            }
        };

        self.state = SessionState::Summary;
        tracing::info!(
            session = %self.id,
            score = summary.score,
            max = summary.max,
            percent = summary.percent,
            band = %band,
            "evaluation finished"
        );

        let outcome = ExamOutcome {
            final_message: band.final_message(self.exam).to_string(),
            summary,
            band,
            attempt,
            record_error,
        };
        self.observer.on_finished(&outcome);
        Ok(Step::Finished(outcome))
    }

    /// Ask to close the session. Returns whether it is closed.
    ///
    /// Before the summary this needs `confirmed`; afterwards closing is
    /// unconditional.
    pub fn cancel(&mut self, confirmed: bool) -> bool {
        match self.state {
            SessionState::Summary | SessionState::Cancelled => true,
            SessionState::InProgress(_) if confirmed => {
                self.state = SessionState::Cancelled;
                tracing::info!(session = %self.id, "evaluation cancelled");
                self.observer.on_cancelled();
                true
            }
            SessionState::InProgress(_) => false,
        }
    }

    fn in_progress(&self) -> Result<usize, SessionError> {
        self.current_index().ok_or(SessionError::NotInProgress)
    }

    fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }

    fn go_to(&mut self, index: usize) -> Step {
        self.state = SessionState::InProgress(index);
        tracing::debug!(session = %self.id, question = index, "navigated");
        self.show_current();
        Step::Question(index)
    }
}

//! coursequiz-core — Exam engine for course evaluations.
//!
//! This crate loads declarative exam documents, derives the randomized
//! question set for a session, drives the question-by-question evaluation
//! state machine, and scores and records attempts through the
//! [`traits::AttemptStore`] contract.

pub mod builder;
pub mod error;
pub mod history;
pub mod memory;
pub mod model;
pub mod parser;
pub mod scoring;
pub mod session;
pub mod traits;

pub use error::{LoadError, SessionError};
pub use model::{AttemptRecord, ExamDefinition, ExamIdentity, QuestionSpec, RuntimeQuestion};
pub use session::ExamSession;
pub use traits::AttemptStore;

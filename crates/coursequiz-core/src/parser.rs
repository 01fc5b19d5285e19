//! Exam document loader.
//!
//! Reads `.test` JSON documents, normalizes loosely-typed fields into an
//! [`ExamDefinition`], discovers exam files inside a course tree, and lints
//! loaded exams.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::error::LoadError;
use crate::model::{ExamDefinition, QuestionSpec};

/// Title used when the document has none.
pub const DEFAULT_TITLE: &str = "Evaluation";

/// Minimum number of answer options per question.
pub const MIN_ANSWERS: usize = 2;

/// A note about an exam, produced while loading or by [`validate_exam`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    /// Zero-based question position (in the raw `questions` array for load
    /// notes, in the normalized list for lint warnings).
    pub question: Option<usize>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn question(index: usize, message: impl Into<String>) -> Self {
        Self {
            question: Some(index),
            message: message.into(),
        }
    }

    fn exam(message: impl Into<String>) -> Self {
        Self {
            question: None,
            message: message.into(),
        }
    }
}

/// A loaded exam together with what normalization had to change or drop.
#[derive(Debug, Clone)]
pub struct LoadedExam {
    pub definition: ExamDefinition,
    pub notes: Vec<ValidationWarning>,
}

/// Load and normalize an exam file.
pub fn load_exam(path: &Path) -> Result<ExamDefinition, LoadError> {
    read_exam(path).map(|loaded| loaded.definition)
}

/// Load an exam file, keeping the normalization notes.
pub fn read_exam(path: &Path) -> Result<LoadedExam, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let loaded = parse_exam_str(&content)?;
    tracing::debug!(
        path = %path.display(),
        questions = loaded.definition.question_count(),
        notes = loaded.notes.len(),
        "exam loaded"
    );
    Ok(loaded)
}

/// Parse and normalize an exam document from a string.
pub fn parse_exam_str(content: &str) -> Result<LoadedExam, LoadError> {
    let value: Value = serde_json::from_str(content)?;
    let Value::Object(doc) = value else {
        return Err(LoadError::NotAMapping);
    };
    let Some(Value::Array(raw_questions)) = doc.get("questions") else {
        return Err(LoadError::MissingQuestions);
    };

    let mut notes = Vec::new();
    let questions: Vec<QuestionSpec> = raw_questions
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| normalize_question(i, raw, &mut notes))
        .collect();

    if questions.is_empty() {
        return Err(LoadError::NoValidQuestions);
    }

    let total = questions.len();
    let num_questions_to_run = match non_null(&doc, "num_questions_to_run") {
        None => total,
        Some(v) => match coerce_int(v) {
            Some(n) if n >= 1 => {
                let n = usize::try_from(n).unwrap_or(usize::MAX);
                if n > total {
                    notes.push(ValidationWarning::exam(format!(
                        "num_questions_to_run ({n}) exceeds the {total} available questions; clamped"
                    )));
                }
                n.min(total)
            }
            _ => {
                notes.push(ValidationWarning::exam(format!(
                    "num_questions_to_run ({v}) is not a positive integer; using all {total} questions"
                )));
                total
            }
        },
    };

    let legacy_message = text_field(&doc, "final_message");
    let final_message_pass = Some(text_field(&doc, "final_message_pass"))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| legacy_message.clone());
    let final_message_fail = Some(text_field(&doc, "final_message_fail"))
        .filter(|m| !m.is_empty())
        .unwrap_or(legacy_message);

    let title = non_null(&doc, "title")
        .map(coerce_string)
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    for note in &notes {
        tracing::warn!(question = ?note.question, "{}", note.message);
    }

    Ok(LoadedExam {
        definition: ExamDefinition {
            title,
            questions,
            num_questions_to_run,
            random_questions: non_null(&doc, "random_questions").is_some_and(truthy),
            random_answers: non_null(&doc, "random_answers").is_some_and(truthy),
            final_message_pass,
            final_message_fail,
        },
        notes,
    })
}

fn normalize_question(
    index: usize,
    raw: &Value,
    notes: &mut Vec<ValidationWarning>,
) -> Option<QuestionSpec> {
    let Value::Object(map) = raw else {
        notes.push(ValidationWarning::question(index, "entry is not an object; dropped"));
        return None;
    };

    let mut answers: Vec<String> = match map.get("answers") {
        Some(Value::Array(items)) => items.iter().map(answer_text).collect(),
        _ => Vec::new(),
    };
    if answers.len() < MIN_ANSWERS {
        notes.push(ValidationWarning::question(
            index,
            format!(
                "only {} answer(s); padded with empty answers to {MIN_ANSWERS}",
                answers.len()
            ),
        ));
        answers.resize(MIN_ANSWERS, String::new());
    }

    let score = match non_null(map, "score") {
        None => 1.0,
        Some(v) => match coerce_float(v) {
            Some(score) => score,
            None => {
                notes.push(ValidationWarning::question(
                    index,
                    format!("score {v} is not a number; dropped"),
                ));
                return None;
            }
        },
    };

    let correct_index = match non_null(map, "correct_index") {
        None => 0,
        Some(v) => match coerce_int(v) {
            Some(n) => n,
            None => {
                notes.push(ValidationWarning::question(
                    index,
                    format!("correct_index {v} is not an integer; dropped"),
                ));
                return None;
            }
        },
    };
    let correct_index = match usize::try_from(correct_index) {
        Ok(n) if n < answers.len() => n,
        _ => {
            notes.push(ValidationWarning::question(
                index,
                format!(
                    "correct_index {correct_index} is outside 0..{}; dropped",
                    answers.len()
                ),
            ));
            return None;
        }
    };

    Some(QuestionSpec {
        text: text_field(map, "text"),
        answers,
        correct_index,
        score,
        explanation: text_field(map, "explanation"),
    })
}

/// Answers are either plain values or `{ "text": ... }` records.
fn answer_text(value: &Value) -> String {
    match value {
        Value::Object(record) => text_field(record, "text"),
        other => coerce_string(other),
    }
}

fn non_null<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

fn text_field(map: &Map<String, Value>, key: &str) -> String {
    non_null(map, key).map(coerce_string).unwrap_or_default()
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn coerce_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// An exam file found inside a course tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamEntry {
    /// Exam name (file stem).
    pub name: String,
    /// Full path of the exam file.
    pub path: PathBuf,
}

/// Find every exam file under `course_root`.
///
/// Exams live in directories named `tests_dir_name` (e.g. `Tests`) anywhere
/// in the course tree and carry the `extension` suffix (e.g. `test`). Results
/// are grouped by directory in traversal order and sorted by file name
/// within each directory.
pub fn discover_exams(
    course_root: &Path,
    tests_dir_name: &str,
    extension: &str,
) -> Result<Vec<ExamEntry>> {
    if !course_root.is_dir() {
        anyhow::bail!("not a directory: {}", course_root.display());
    }

    let mut found = Vec::new();
    walk_course(course_root, tests_dir_name, extension, &mut found)?;
    Ok(found)
}

fn walk_course(
    dir: &Path,
    tests_dir_name: &str,
    extension: &str,
    found: &mut Vec<ExamEntry>,
) -> Result<()> {
    let mut subdirs = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_dir() {
            subdirs.push(path);
        }
    }
    subdirs.sort();

    for sub in subdirs {
        if sub.file_name().is_some_and(|n| n == tests_dir_name) {
            found.extend(exams_in(&sub, extension)?);
        } else {
            walk_course(&sub, tests_dir_name, extension, found)?;
        }
    }
    Ok(())
}

fn exams_in(tests_dir: &Path, extension: &str) -> Result<Vec<ExamEntry>> {
    let mut exams = Vec::new();
    for entry in std::fs::read_dir(tests_dir)
        .with_context(|| format!("failed to read directory: {}", tests_dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            exams.push(ExamEntry { name, path });
        }
    }
    exams.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(exams)
}

/// Lint a loaded exam for authoring mistakes that loading tolerates.
pub fn validate_exam(exam: &ExamDefinition) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for (i, q) in exam.questions.iter().enumerate() {
        if q.text.trim().is_empty() {
            warnings.push(ValidationWarning::question(i, "question text is empty"));
        }

        let empty = q.answers.iter().filter(|a| a.trim().is_empty()).count();
        if empty > 0 {
            warnings.push(ValidationWarning::question(
                i,
                format!("{empty} empty answer option(s)"),
            ));
        }

        let mut seen = HashSet::new();
        for answer in q.answers.iter().filter(|a| !a.trim().is_empty()) {
            if !seen.insert(answer.trim()) {
                warnings.push(ValidationWarning::question(
                    i,
                    format!("duplicate answer: {answer}"),
                ));
            }
        }

        if q.score < 0.0 {
            warnings.push(ValidationWarning::question(i, "score is negative"));
        }
    }

    if exam.total_score() <= 0.0 {
        warnings.push(ValidationWarning::exam(
            "total score is zero; every attempt will score 0%",
        ));
    }

    if exam.run_count() < exam.question_count() && !exam.random_questions {
        warnings.push(ValidationWarning::exam(format!(
            "only the first {} of {} questions are ever asked (random_questions is off)",
            exam.run_count(),
            exam.question_count()
        )));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_EXAM: &str = r#"{
        "title": "Ownership basics",
        "questions": [
            {
                "text": "Which keyword moves a closure's captures?",
                "answers": ["move", "ref", "static"],
                "correct_index": 0,
                "score": 2,
                "explanation": "`move` forces captures by value."
            },
            {
                "text": "Is String Copy?",
                "answers": [{"text": "Yes"}, {"text": "No"}],
                "correct_index": 1
            }
        ],
        "num_questions_to_run": 2,
        "random_questions": true,
        "random_answers": false,
        "final_message_pass": "Well done",
        "final_message_fail": "Review chapter 4"
    }"#;

    fn parse(content: &str) -> Result<LoadedExam, LoadError> {
        parse_exam_str(content)
    }

    #[test]
    fn parse_valid_exam() {
        let exam = parse(VALID_EXAM).unwrap().definition;
        assert_eq!(exam.title, "Ownership basics");
        assert_eq!(exam.question_count(), 2);
        assert_eq!(exam.questions[0].score, 2.0);
        assert_eq!(exam.questions[1].answers, vec!["Yes", "No"]);
        assert_eq!(exam.questions[1].correct_index, 1);
        assert_eq!(exam.questions[1].score, 1.0);
        assert!(exam.random_questions);
        assert!(!exam.random_answers);
        assert_eq!(exam.final_message_pass, "Well done");
        assert_eq!(exam.final_message_fail, "Review chapter 4");
    }

    #[test]
    fn defaults_apply_when_fields_missing() {
        let exam = parse(r#"{"questions": [{"text": "q", "answers": ["a", "b"]}]}"#)
            .unwrap()
            .definition;
        assert_eq!(exam.title, DEFAULT_TITLE);
        assert_eq!(exam.num_questions_to_run, 1);
        assert_eq!(exam.questions[0].correct_index, 0);
        assert_eq!(exam.questions[0].score, 1.0);
        assert_eq!(exam.questions[0].explanation, "");
        assert!(!exam.random_questions);
    }

    #[test]
    fn single_answer_is_padded() {
        let loaded = parse(r#"{"questions": [{"text": "q", "answers": ["OnlyOne"]}]}"#).unwrap();
        let q = &loaded.definition.questions[0];
        assert_eq!(q.answers, vec!["OnlyOne", ""]);
        assert_eq!(q.correct_index, 0);
        assert!(loaded.notes.iter().any(|n| n.message.contains("padded")));
    }

    #[test]
    fn non_object_entries_are_dropped() {
        let loaded = parse(r#"{"questions": ["bogus", 3, {"text": "kept", "answers": ["a", "b"]}]}"#)
            .unwrap();
        assert_eq!(loaded.definition.question_count(), 1);
        assert_eq!(loaded.definition.questions[0].text, "kept");
        assert_eq!(loaded.notes.len(), 2);
    }

    #[test]
    fn answers_of_other_types_are_stringified() {
        let exam = parse(r#"{"questions": [{"text": "q", "answers": [42, true, null, {"text": 7}]}]}"#)
            .unwrap()
            .definition;
        assert_eq!(exam.questions[0].answers, vec!["42", "true", "", "7"]);
    }

    #[test]
    fn numeric_fields_are_coerced() {
        let exam = parse(
            r#"{"questions": [{"text": "q", "answers": ["a", "b", "c"], "correct_index": "2", "score": "1.5"}],
                "num_questions_to_run": 1.0}"#,
        )
        .unwrap()
        .definition;
        assert_eq!(exam.questions[0].correct_index, 2);
        assert_eq!(exam.questions[0].score, 1.5);
        assert_eq!(exam.num_questions_to_run, 1);
    }

    #[test]
    fn out_of_range_correct_index_drops_question() {
        let loaded = parse(
            r#"{"questions": [
                {"text": "bad", "answers": ["a", "b"], "correct_index": 5},
                {"text": "negative", "answers": ["a", "b"], "correct_index": -1},
                {"text": "good", "answers": ["a", "b"], "correct_index": 1}
            ]}"#,
        )
        .unwrap();
        assert_eq!(loaded.definition.question_count(), 1);
        assert_eq!(loaded.definition.questions[0].text, "good");
    }

    #[test]
    fn run_count_is_clamped_to_total() {
        let loaded = parse(
            r#"{"questions": [{"text": "q", "answers": ["a", "b"]}], "num_questions_to_run": 9}"#,
        )
        .unwrap();
        assert_eq!(loaded.definition.num_questions_to_run, 1);
        assert!(loaded.notes.iter().any(|n| n.message.contains("clamped")));
    }

    #[test]
    fn non_positive_run_count_uses_all_questions() {
        let exam = parse(
            r#"{"questions": [{"text": "q", "answers": ["a", "b"]}, {"text": "r", "answers": ["a", "b"]}],
                "num_questions_to_run": 0}"#,
        )
        .unwrap()
        .definition;
        assert_eq!(exam.num_questions_to_run, 2);
    }

    #[test]
    fn legacy_final_message_fallback() {
        let exam = parse(
            r#"{"questions": [{"text": "q", "answers": ["a", "b"]}],
                "final_message": "Thanks", "final_message_pass": ""}"#,
        )
        .unwrap()
        .definition;
        assert_eq!(exam.final_message_pass, "Thanks");
        assert_eq!(exam.final_message_fail, "Thanks");
    }

    #[test]
    fn rejects_missing_questions() {
        assert!(matches!(parse(r#"{"title": "x"}"#), Err(LoadError::MissingQuestions)));
        assert!(matches!(
            parse(r#"{"questions": {"text": "q"}}"#),
            Err(LoadError::MissingQuestions)
        ));
    }

    #[test]
    fn rejects_non_mapping_and_malformed() {
        assert!(matches!(parse("[1, 2]"), Err(LoadError::NotAMapping)));
        assert!(matches!(parse("{not json"), Err(LoadError::Malformed(_))));
    }

    #[test]
    fn rejects_when_no_question_survives() {
        assert!(matches!(
            parse(r#"{"questions": ["a", 1, null]}"#),
            Err(LoadError::NoValidQuestions)
        ));
        assert!(matches!(
            parse(r#"{"questions": []}"#),
            Err(LoadError::NoValidQuestions)
        ));
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_exam(&dir.path().join("nope.test")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ownership.test");
        std::fs::write(&path, VALID_EXAM).unwrap();
        let exam = load_exam(&path).unwrap();
        assert_eq!(exam.title, "Ownership basics");
    }

    #[test]
    fn normalized_questions_hold_invariants() {
        let exam = parse(
            r#"{"questions": [
                {"text": "a", "answers": []},
                {"text": "b"},
                {"text": "c", "answers": ["x", "y", "z"], "correct_index": 2}
            ]}"#,
        )
        .unwrap()
        .definition;
        assert!(!exam.questions.is_empty());
        for q in &exam.questions {
            assert!(q.answers.len() >= MIN_ANSWERS);
            assert!(q.correct_index < q.answers.len());
        }
    }

    #[test]
    fn discover_exams_in_tests_folders() {
        let dir = tempfile::tempdir().unwrap();
        let ch1 = dir.path().join("01 Intro").join("Tests");
        let ch2 = dir.path().join("02 Traits").join("Tests");
        std::fs::create_dir_all(&ch1).unwrap();
        std::fs::create_dir_all(&ch2).unwrap();
        std::fs::write(ch1.join("b.test"), VALID_EXAM).unwrap();
        std::fs::write(ch1.join("a.test"), VALID_EXAM).unwrap();
        std::fs::write(ch1.join("notes.txt"), "ignored").unwrap();
        std::fs::write(ch2.join("traits.test"), VALID_EXAM).unwrap();
        std::fs::write(dir.path().join("stray.test"), VALID_EXAM).unwrap();

        let exams = discover_exams(dir.path(), "Tests", "test").unwrap();
        let names: Vec<_> = exams.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "traits"]);
    }

    #[test]
    fn discover_rejects_non_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_exams(&dir.path().join("missing"), "Tests", "test").is_err());
    }

    #[test]
    fn validate_flags_authoring_issues() {
        let exam = parse(
            r#"{"questions": [
                {"text": "", "answers": ["same", "same"], "score": 0},
                {"text": "q", "answers": ["OnlyOne"], "score": 0}
            ], "num_questions_to_run": 1}"#,
        )
        .unwrap()
        .definition;
        let warnings = validate_exam(&exam);
        assert!(warnings.iter().any(|w| w.message.contains("text is empty")));
        assert!(warnings.iter().any(|w| w.message.contains("duplicate answer")));
        assert!(warnings.iter().any(|w| w.message.contains("empty answer")));
        assert!(warnings.iter().any(|w| w.message.contains("total score is zero")));
        assert!(warnings.iter().any(|w| w.message.contains("first 1 of 2")));
    }

    #[test]
    fn validate_clean_exam() {
        let mut exam = parse(VALID_EXAM).unwrap().definition;
        exam.random_questions = false;
        assert!(validate_exam(&exam).is_empty());
    }
}

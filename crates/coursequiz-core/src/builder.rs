//! Runtime question set construction.
//!
//! Randomness is consumed once, here, when a session starts. The random
//! source is injected so tests and replays can use a seeded generator.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{ExamDefinition, QuestionSpec, RuntimeQuestion};

/// Derive the ordered questions one session will present.
///
/// The result has `min(num_questions_to_run, question_count)` entries. With
/// `random_questions` the selection is a uniformly shuffled subset, otherwise
/// it is the first questions in authoring order. With `random_answers` each
/// question's options are shuffled and its correct index follows the correct
/// answer to its new position.
pub fn build_runtime_questions<R>(exam: &ExamDefinition, rng: &mut R) -> Vec<RuntimeQuestion>
where
    R: Rng + ?Sized,
{
    let mut order: Vec<usize> = (0..exam.questions.len()).collect();
    if exam.random_questions {
        order.shuffle(rng);
    }
    order.truncate(exam.run_count());

    order
        .into_iter()
        .map(|source_index| {
            let spec = &exam.questions[source_index];
            if exam.random_answers {
                shuffled_question(source_index, spec, rng)
            } else {
                runtime_question(source_index, spec)
            }
        })
        .collect()
}

fn runtime_question(source_index: usize, spec: &QuestionSpec) -> RuntimeQuestion {
    RuntimeQuestion {
        source_index,
        text: spec.text.clone(),
        answers: spec.answers.clone(),
        correct_index: spec.correct_index,
        score: spec.score,
        explanation: spec.explanation.clone(),
    }
}

fn shuffled_question<R>(source_index: usize, spec: &QuestionSpec, rng: &mut R) -> RuntimeQuestion
where
    R: Rng + ?Sized,
{
    let mut paired: Vec<(usize, &String)> = spec.answers.iter().enumerate().collect();
    paired.shuffle(rng);

    let correct_index = paired
        .iter()
        .position(|(original, _)| *original == spec.correct_index)
        .unwrap_or(0);

    RuntimeQuestion {
        correct_index,
        answers: paired.into_iter().map(|(_, text)| text.clone()).collect(),
        ..runtime_question(source_index, spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn exam(count: usize, run: usize, random_questions: bool, random_answers: bool) -> ExamDefinition {
        ExamDefinition {
            title: "Sample".into(),
            questions: (0..count)
                .map(|i| QuestionSpec {
                    text: format!("Question {i}"),
                    answers: (0..4).map(|a| format!("q{i}-answer{a}")).collect(),
                    correct_index: i % 4,
                    score: 1.0 + i as f64,
                    explanation: format!("because {i}"),
                })
                .collect(),
            num_questions_to_run: run,
            random_questions,
            random_answers,
            final_message_pass: String::new(),
            final_message_fail: String::new(),
        }
    }

    #[test]
    fn fixed_order_takes_leading_questions() {
        let exam = exam(5, 1, false, false);
        let questions = build_runtime_questions(&exam, &mut StdRng::seed_from_u64(1));
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].source_index, 0);
        assert_eq!(questions[0].text, exam.questions[0].text);
        assert_eq!(questions[0].answers, exam.questions[0].answers);
        assert_eq!(questions[0].correct_index, exam.questions[0].correct_index);
    }

    #[test]
    fn oversized_run_count_is_clamped() {
        let exam = exam(3, 10, true, false);
        let questions = build_runtime_questions(&exam, &mut StdRng::seed_from_u64(2));
        assert_eq!(questions.len(), 3);
    }

    #[test]
    fn random_subset_traces_back_to_distinct_sources() {
        let exam = exam(10, 4, true, true);
        for seed in 0..20 {
            let questions = build_runtime_questions(&exam, &mut StdRng::seed_from_u64(seed));
            assert_eq!(questions.len(), 4);

            let mut sources: Vec<usize> = questions.iter().map(|q| q.source_index).collect();
            sources.sort_unstable();
            sources.dedup();
            assert_eq!(sources.len(), 4, "seed {seed} repeated a question");

            for q in &questions {
                let spec = &exam.questions[q.source_index];
                assert_eq!(q.text, spec.text);
                assert_eq!(q.score, spec.score);
                assert_eq!(q.explanation, spec.explanation);
            }
        }
    }

    #[test]
    fn shuffled_answers_keep_the_correct_answer() {
        let exam = exam(6, 6, false, true);
        for seed in 0..20 {
            let questions = build_runtime_questions(&exam, &mut StdRng::seed_from_u64(seed));
            for q in &questions {
                let spec = &exam.questions[q.source_index];

                let mut before = spec.answers.clone();
                let mut after = q.answers.clone();
                before.sort();
                after.sort();
                assert_eq!(before, after);

                assert_eq!(q.correct_answer(), spec.answers[spec.correct_index]);
            }
        }
    }

    #[test]
    fn same_seed_same_session() {
        let exam = exam(8, 5, true, true);
        let a = build_runtime_questions(&exam, &mut StdRng::seed_from_u64(42));
        let b = build_runtime_questions(&exam, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn question_shuffle_changes_order_for_some_seed() {
        let exam = exam(6, 6, true, false);
        let reordered = (0..20).any(|seed| {
            build_runtime_questions(&exam, &mut StdRng::seed_from_u64(seed))
                .iter()
                .enumerate()
                .any(|(pos, q)| q.source_index != pos)
        });
        assert!(reordered);
    }
}

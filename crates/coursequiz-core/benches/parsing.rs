use criterion::{black_box, criterion_group, criterion_main, Criterion};

use coursequiz_core::parser::{parse_exam_str, validate_exam};

fn bench_exam_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("exam_parsing");

    let small = generate_exam_json(10);
    let large = generate_exam_json(500);

    group.bench_function("10_questions", |b| {
        b.iter(|| parse_exam_str(black_box(&small)))
    });

    group.bench_function("500_questions", |b| {
        b.iter(|| parse_exam_str(black_box(&large)))
    });

    let mixed = r#"{
        "questions": [
            "dropped",
            {"text": "record answers", "answers": [{"text": "a"}, {"text": "b"}], "correct_index": "1"},
            {"text": "padded", "answers": ["only"], "score": "2.5"},
            {"text": "coerced", "answers": [1, true, null], "correct_index": 2.0}
        ],
        "final_message": "legacy"
    }"#;

    group.bench_function("mixed_normalization", |b| {
        b.iter(|| parse_exam_str(black_box(mixed)))
    });

    group.finish();
}

fn bench_validation(c: &mut Criterion) {
    let exam = parse_exam_str(&generate_exam_json(500))
        .expect("generated exam parses")
        .definition;

    c.bench_function("validate_500_questions", |b| {
        b.iter(|| validate_exam(black_box(&exam)))
    });
}

fn generate_exam_json(n: usize) -> String {
    let questions: Vec<String> = (0..n)
        .map(|i| {
            format!(
                r#"{{"text": "Question {i}", "answers": ["a{i}", "b{i}", "c{i}", "d{i}"], "correct_index": {}, "score": 1.5, "explanation": "Because {i}."}}"#,
                i % 4
            )
        })
        .collect();
    format!(
        r#"{{"title": "Benchmark", "random_questions": true, "random_answers": true, "questions": [{}]}}"#,
        questions.join(",")
    )
}

criterion_group!(benches, bench_exam_parsing, bench_validation);
criterion_main!(benches);

//! The `coursequiz init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("coursequiz.toml").exists() {
        println!("coursequiz.toml already exists, skipping.");
    } else {
        std::fs::write("coursequiz.toml", SAMPLE_CONFIG)?;
        println!("Created coursequiz.toml");
    }

    std::fs::create_dir_all("Tests")?;
    let example_path = std::path::Path::new("Tests/example.test");
    if example_path.exists() {
        println!("Tests/example.test already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_EXAM)?;
        println!("Created Tests/example.test");
    }

    println!("\nNext steps:");
    println!("  1. Edit coursequiz.toml if your data should live elsewhere");
    println!("  2. Run: coursequiz validate --exam Tests/example.test");
    println!("  3. Run: coursequiz take --exam Tests/example.test");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# coursequiz configuration

# Where the user data file lives. COURSEQUIZ_DATA_DIR overrides this.
# data_dir = "${HOME}/.local/share/coursequiz"
data_file_name = "user_data.data"

# Exams are *.test files inside folders with this name.
tests_dir_name = "Tests"
exam_extension = "test"

default_theme = "light"
"#;

const EXAMPLE_EXAM: &str = r#"{
    "title": "Example Evaluation",
    "random_questions": true,
    "random_answers": true,
    "num_questions_to_run": 3,
    "final_message_pass": "Nice work, on to the next chapter!",
    "final_message_fail": "Review the chapter videos and try again.",
    "questions": [
        {
            "text": "Which keyword declares an immutable binding in Rust?",
            "answers": ["let", "mut", "const fn", "static mut"],
            "correct_index": 0,
            "score": 1,
            "explanation": "`let` bindings are immutable unless marked `mut`."
        },
        {
            "text": "What does `cargo build --release` enable?",
            "answers": ["Optimizations", "Debug assertions", "Incremental tests"],
            "correct_index": 0,
            "score": 1,
            "explanation": "Release profile builds are optimized."
        },
        {
            "text": "Which type owns a growable UTF-8 string?",
            "answers": ["&str", "String", "char"],
            "correct_index": 1,
            "score": 2,
            "explanation": "`String` owns its heap buffer; `&str` borrows."
        },
        {
            "text": "What does the `?` operator do on an `Err` value?",
            "answers": ["Panics", "Returns it early", "Ignores it"],
            "correct_index": 1,
            "score": 1,
            "explanation": "`?` converts and returns the error from the enclosing function."
        }
    ]
}
"#;

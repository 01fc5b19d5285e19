//! The `coursequiz validate` command.

use std::path::PathBuf;

use anyhow::Result;
use coursequiz_core::parser::{discover_exams, read_exam, validate_exam, ValidationWarning};

use super::DataPaths;

pub fn execute(paths: &DataPaths, exam_path: PathBuf) -> Result<()> {
    let files = if exam_path.is_dir() {
        let config = paths.load_config()?;
        let found = discover_exams(&exam_path, &config.tests_dir_name, &config.exam_extension)?;
        if found.is_empty() {
            anyhow::bail!(
                "no .{} files found in '{}' folders under {}",
                config.exam_extension,
                config.tests_dir_name,
                exam_path.display()
            );
        }
        found.into_iter().map(|entry| entry.path).collect()
    } else {
        vec![exam_path]
    };

    let mut total_warnings = 0;
    let mut failed = 0;

    for file in &files {
        let loaded = match read_exam(file) {
            Ok(loaded) => loaded,
            Err(e) => {
                println!("{}: FAILED: {e}", file.display());
                failed += 1;
                continue;
            }
        };
        let exam = &loaded.definition;
        println!(
            "Exam: {} ({} questions, {} per session) [{}]",
            exam.title,
            exam.question_count(),
            exam.run_count(),
            file.display()
        );

        for note in &loaded.notes {
            println!("{} NOTE: {}", prefix(note), note.message);
        }
        let warnings = validate_exam(exam);
        for w in &warnings {
            println!("{} WARNING: {}", prefix(w), w.message);
        }
        total_warnings += warnings.len();
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} exam(s) failed to load", files.len());
    }
    if total_warnings == 0 {
        println!("All exams valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}

fn prefix(warning: &ValidationWarning) -> String {
    warning
        .question
        .map(|i| format!("  [question {}]", i + 1))
        .unwrap_or_else(|| "  ".to_string())
}

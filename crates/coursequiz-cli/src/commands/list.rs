//! The `coursequiz list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};
use coursequiz_core::history::AttemptHistory;
use coursequiz_core::model::ExamIdentity;
use coursequiz_core::parser::{discover_exams, load_exam};

use super::{relative_to, DataPaths};

pub fn execute(paths: &DataPaths, course: PathBuf) -> Result<()> {
    let config = paths.load_config()?;
    let exams = discover_exams(&course, &config.tests_dir_name, &config.exam_extension)?;
    if exams.is_empty() {
        println!("No exams found under {}.", course.display());
        return Ok(());
    }

    let store = paths.open_store(&config);
    let mut table = Table::new();
    table.set_header(vec!["Exam", "Path", "Questions", "Attempts", "Best %"]);

    for entry in &exams {
        let questions = match load_exam(&entry.path) {
            Ok(exam) => exam.question_count().to_string(),
            Err(e) => {
                tracing::warn!("{}: {e}", entry.path.display());
                "invalid".to_string()
            }
        };
        let history = AttemptHistory::load(&store, &ExamIdentity::new(&course, &entry.name));
        let best = history
            .best_percent()
            .map(|p| format!("{p:.2}%"))
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(&entry.name),
            Cell::new(relative_to(&entry.path, &course).display()),
            Cell::new(questions),
            Cell::new(history.len()),
            Cell::new(best),
        ]);
    }

    println!("{table}");
    println!("{} exam(s)", exams.len());
    Ok(())
}

//! The `coursequiz history` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};
use coursequiz_core::history::AttemptHistory;
use coursequiz_core::model::ExamIdentity;

use super::{course_root, fmt_points, DataPaths};

pub fn execute(
    paths: &DataPaths,
    exam_path: PathBuf,
    course: Option<PathBuf>,
    format: String,
) -> Result<()> {
    let config = paths.load_config()?;
    let store = paths.open_store(&config);
    let identity = ExamIdentity::from_exam_file(course_root(course)?, &exam_path);
    let history = AttemptHistory::load(&store, &identity);

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&history)?),
        "text" => print_history(&identity, &history),
        other => anyhow::bail!("unknown format: {other} (expected text or json)"),
    }
    Ok(())
}

fn print_history(identity: &ExamIdentity, history: &AttemptHistory) {
    println!("Exam: {}", identity.exam_name);
    if history.is_empty() {
        println!("{}", history.headline());
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Score", "Max", "%"]);
    for attempt in &history.attempts {
        table.add_row(vec![
            Cell::new(&attempt.date),
            Cell::new(fmt_points(attempt.score)),
            Cell::new(fmt_points(attempt.max)),
            Cell::new(format!("{:.2}%", attempt.percent)),
        ]);
    }
    println!("{table}");
    println!("{}", history.headline());
    println!("Passed: {} of {}", history.passed_count(), history.len());
}

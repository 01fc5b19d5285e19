//! The `coursequiz take` command.

use std::cell::{Cell, RefCell};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use coursequiz_core::builder::build_runtime_questions;
use coursequiz_core::history::AttemptHistory;
use coursequiz_core::model::{ExamDefinition, ExamIdentity, QuestionState, RuntimeQuestion};
use coursequiz_core::parser::read_exam;
use coursequiz_core::session::{ExamOutcome, ExamSession, Feedback, SessionObserver, SessionState, Step};
use coursequiz_core::AttemptStore;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{course_root, fmt_points, DataPaths};

pub fn execute(
    paths: &DataPaths,
    exam_path: PathBuf,
    course: Option<PathBuf>,
    seed: Option<u64>,
    yes: bool,
) -> Result<()> {
    let config = paths.load_config()?;
    let loaded = read_exam(&exam_path)
        .with_context(|| format!("failed to load exam: {}", exam_path.display()))?;

    let identity = ExamIdentity::from_exam_file(course_root(course)?, &exam_path);
    let mut store = paths.open_store(&config);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let options = TakeOptions {
        seed,
        skip_confirmation: yes,
    };
    run(&loaded.definition, identity, &mut store, options, stdin.lock(), stdout.lock())?;
    Ok(())
}

/// How an interactive run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    /// The user declined to start.
    NotStarted,
    /// The session reached its summary.
    Finished,
    /// The session was abandoned.
    Cancelled,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TakeOptions {
    pub seed: Option<u64>,
    pub skip_confirmation: bool,
}

/// Run one evaluation over line-based input and output.
pub fn run<R, W>(
    exam: &ExamDefinition,
    identity: ExamIdentity,
    store: &mut dyn AttemptStore,
    options: TakeOptions,
    input: R,
    output: W,
) -> Result<RunEnd>
where
    R: BufRead,
    W: Write,
{
    let view = TerminalView::new(output);
    let mut lines = input.lines();

    view.line(&format!("{} ({} question(s))", exam.title, exam.run_count()));
    view.line(&AttemptHistory::load(&*store, &identity).headline());
    view.flush()?;

    if !options.skip_confirmation && !ask(&mut lines, &view, "Start the evaluation? [Y/n] ", true)? {
        view.line("Evaluation not started.");
        view.flush()?;
        return Ok(RunEnd::NotStarted);
    }

    let questions = match options.seed {
        Some(seed) => build_runtime_questions(exam, &mut StdRng::seed_from_u64(seed)),
        None => build_runtime_questions(exam, &mut rand::thread_rng()),
    };
    view.set_total(questions.len());
    view.line(HELP);

    let mut session = ExamSession::from_questions(exam, identity, questions, store).with_observer(&view);
    session.show_current();
    view.flush()?;

    while let SessionState::InProgress(_) = session.state() {
        view.write("> ");
        view.flush()?;
        let Some(line) = lines.next() else {
            // Input closed mid-session: nothing gets recorded.
            session.cancel(true);
            break;
        };
        let line = line.context("failed to read input")?;
        let answer_count = session.current().map_or(0, |(q, _)| q.answers.len());

        match Command::parse(&line, answer_count) {
            Command::Select(answer) => match session.select(answer) {
                Ok(()) => view.line(&format!("Selected {}.", answer + 1)),
                Err(e) => view.line(&format!("{e}.")),
            },
            Command::Check => match session.check() {
                Ok(Some(_)) => {}
                Ok(None) => view.line("This question has already been checked."),
                Err(e) => view.line(&format!("{e}.")),
            },
            Command::Next => {
                if let Step::ConfirmIncomplete { unanswered } = session.next()? {
                    let prompt = format!(
                        "{} question(s) have no answer and will count as incorrect. Finish anyway? [y/N] ",
                        unanswered.len()
                    );
                    if ask(&mut lines, &view, &prompt, false)? {
                        session.finish(true)?;
                    } else {
                        session.show_current();
                    }
                }
            }
            Command::Previous => {
                if let Step::Unchanged = session.previous()? {
                    view.line("Already at the first question.");
                }
            }
            Command::History => view.history(&session.history()),
            Command::Quit => {
                let confirmed =
                    ask(&mut lines, &view, "Cancel the evaluation? Nothing will be saved. [y/N] ", false)?;
                if !session.cancel(confirmed) {
                    session.show_current();
                }
            }
            Command::Help => view.line(HELP),
            Command::Empty => {}
            Command::Unknown(input) => view.line(&format!("Unknown command '{input}'. {HELP}")),
        }
        view.flush()?;
    }

    Ok(match session.state() {
        SessionState::Summary => RunEnd::Finished,
        _ => RunEnd::Cancelled,
    })
}

const HELP: &str =
    "Commands: 1-9 or a letter to select, c check, n next, p previous, h history, q quit.";

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Select(usize),
    Check,
    Next,
    Previous,
    History,
    Quit,
    Help,
    Empty,
    Unknown(String),
}

impl Command {
    /// Command keys win over answer letters; every answer stays reachable by
    /// its number.
    fn parse(input: &str, answer_count: usize) -> Self {
        let input = input.trim().to_lowercase();
        match input.as_str() {
            "" => return Command::Empty,
            "c" | "check" => return Command::Check,
            "n" | "next" => return Command::Next,
            "p" | "prev" | "previous" => return Command::Previous,
            "h" | "history" => return Command::History,
            "q" | "quit" => return Command::Quit,
            "?" | "help" => return Command::Help,
            _ => {}
        }

        if let Ok(number) = input.parse::<usize>() {
            if number >= 1 {
                return Command::Select(number - 1);
            }
        }

        let mut chars = input.chars();
        if let (Some(letter @ 'a'..='z'), None) = (chars.next(), chars.next()) {
            let answer = (letter as u8 - b'a') as usize;
            if answer < answer_count {
                return Command::Select(answer);
            }
        }
        Command::Unknown(input)
    }
}

/// Read a yes/no answer. An empty line or closed input picks `default`.
fn ask<B, W>(lines: &mut io::Lines<B>, view: &TerminalView<W>, prompt: &str, default: bool) -> Result<bool>
where
    B: BufRead,
    W: Write,
{
    view.write(prompt);
    view.flush()?;
    let answer = match lines.next() {
        Some(line) => line.context("failed to read input")?,
        None => return Ok(default),
    };
    Ok(match answer.trim().to_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    })
}

/// Renders session events as plain text.
///
/// Write errors are kept and surfaced on the next [`TerminalView::flush`].
struct TerminalView<W: Write> {
    out: RefCell<W>,
    total: Cell<usize>,
    error: RefCell<Option<io::Error>>,
}

impl<W: Write> TerminalView<W> {
    fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
            total: Cell::new(0),
            error: RefCell::new(None),
        }
    }

    fn set_total(&self, total: usize) {
        self.total.set(total);
    }

    fn write(&self, text: &str) {
        let result = self.out.borrow_mut().write_all(text.as_bytes());
        self.keep(result);
    }

    fn line(&self, text: &str) {
        let result = writeln!(self.out.borrow_mut(), "{text}");
        self.keep(result);
    }

    fn flush(&self) -> io::Result<()> {
        if let Some(e) = self.error.borrow_mut().take() {
            return Err(e);
        }
        self.out.borrow_mut().flush()
    }

    fn keep(&self, result: io::Result<()>) {
        if let Err(e) = result {
            self.error.borrow_mut().get_or_insert(e);
        }
    }

    fn history(&self, history: &AttemptHistory) {
        self.line(&history.headline());
        for attempt in &history.attempts {
            self.line(&format!(
                "  {}  {}/{}  {:.2}%",
                attempt.date,
                fmt_points(attempt.score),
                fmt_points(attempt.max),
                attempt.percent
            ));
        }
    }
}

impl<W: Write> SessionObserver for TerminalView<W> {
    fn on_question(&self, index: usize, question: &RuntimeQuestion, state: &QuestionState) {
        self.line("");
        self.line(&format!("Question {} of {}", index + 1, self.total.get()));
        self.line(&question.text);
        for (i, answer) in question.answers.iter().enumerate() {
            let marker = if state.selected_index == Some(i) { '*' } else { ' ' };
            self.line(&format!(" {marker} {}) {answer}", i + 1));
        }
        if state.checked {
            let verdict = if state.correct { "correct" } else { "incorrect" };
            self.line(&format!("(checked: {verdict})"));
        }
    }

    fn on_feedback(&self, feedback: &Feedback) {
        if feedback.correct {
            self.line("Correct!");
        } else {
            self.line(&format!("Incorrect. The correct answer is: {}", feedback.correct_answer));
        }
        if !feedback.explanation.is_empty() {
            self.line(&feedback.explanation);
        }
    }

    fn on_finished(&self, outcome: &ExamOutcome) {
        let summary = &outcome.summary;
        self.line("");
        self.line("=== Results ===");
        self.line(&format!(
            "Score: {} / {} ({:.2}%)",
            fmt_points(summary.score),
            fmt_points(summary.max),
            summary.percent
        ));
        self.line(outcome.band.message());
        if !outcome.final_message.is_empty() {
            self.line(&outcome.final_message);
        }
        if !summary.correct.is_empty() {
            self.line("Correct:");
            for item in &summary.correct {
                self.line(&format!("  {item}"));
            }
        }
        if !summary.incorrect.is_empty() {
            self.line("Incorrect:");
            for item in &summary.incorrect {
                self.line(&format!("  {item}"));
            }
        }
        if let Some(e) = &outcome.record_error {
            self.line(&format!("Warning: the attempt could not be saved: {e:#}"));
        }
    }

    fn on_cancelled(&self) {
        self.line("Evaluation cancelled. Nothing was recorded.");
    }
}

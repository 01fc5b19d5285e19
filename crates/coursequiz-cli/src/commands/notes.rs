//! The `coursequiz notes` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use coursequiz_store::{NoteRow, NoteScope};

use super::{course_root, media_key, DataPaths};

#[derive(Subcommand)]
pub enum NotesAction {
    /// Show the note of a media file, or every note of the course
    Show {
        /// Course root (default: current directory)
        #[arg(long)]
        course: Option<PathBuf>,

        /// Media file, relative to the course root
        #[arg(long)]
        media: Option<PathBuf>,
    },

    /// Replace the note of a media file
    Set {
        /// Course root (default: current directory)
        #[arg(long)]
        course: Option<PathBuf>,

        /// Media file, relative to the course root
        #[arg(long)]
        media: PathBuf,

        /// Note text; an empty string clears the note
        #[arg(long)]
        text: String,
    },

    /// Export notes as semicolon-separated CSV
    Export {
        /// Course root (default: current directory)
        #[arg(long)]
        course: Option<PathBuf>,

        /// Media file for `--scope item`
        #[arg(long)]
        media: Option<PathBuf>,

        /// What to export: item, course, all
        #[arg(long, default_value = "course")]
        scope: String,

        /// Output CSV file
        #[arg(long)]
        output: PathBuf,
    },
}

pub fn execute(paths: &DataPaths, action: NotesAction) -> Result<()> {
    let config = paths.load_config()?;
    let mut store = paths.open_store(&config);

    match action {
        NotesAction::Show { course, media } => {
            let course = course_root(course)?;
            let scope = match media {
                Some(media) => NoteScope::Item {
                    media: media_key(&course, &media),
                    course,
                },
                None => NoteScope::Course(course),
            };
            let rows = store.note_rows(&scope);
            if rows.is_empty() {
                println!("No notes.");
            }
            for row in rows {
                println!("[{}]\n{}\n", row.media, row.text);
            }
        }
        NotesAction::Set {
            course,
            media,
            text,
        } => {
            let course = course_root(course)?;
            let key = media_key(&course, &media);
            store.set_notes(&course, &key, &text)?;
            println!("Saved note for {key}.");
        }
        NotesAction::Export {
            course,
            media,
            scope,
            output,
        } => {
            let scope = match scope.as_str() {
                "item" => {
                    let course = course_root(course)?;
                    let Some(media) = media else {
                        anyhow::bail!("--scope item needs --media");
                    };
                    NoteScope::Item {
                        media: media_key(&course, &media),
                        course,
                    }
                }
                "course" => NoteScope::Course(course_root(course)?),
                "all" => NoteScope::All,
                other => anyhow::bail!("unknown scope: {other} (expected item, course or all)"),
            };

            let rows = store.note_rows(&scope);
            if rows.is_empty() {
                println!("No notes to export.");
                return Ok(());
            }
            write_csv(&output, &rows)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("Exported {} note(s) to {}", rows.len(), output.display());
        }
    }
    Ok(())
}

fn write_csv(path: &Path, rows: &[NoteRow]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_path(path)?;
    writer.write_record(["Course", "File", "Notes"])?;
    for row in rows {
        writer.write_record([&row.course, &row.media, &row.text])?;
    }
    writer.flush()?;
    Ok(())
}

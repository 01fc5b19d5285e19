//! The `coursequiz watched` command.

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use super::{course_root, media_key, DataPaths};

#[derive(Subcommand)]
pub enum WatchedAction {
    /// Mark a media file as watched
    Mark {
        /// Course root (default: current directory)
        #[arg(long)]
        course: Option<PathBuf>,

        /// Media file, relative to the course root
        #[arg(long)]
        media: PathBuf,
    },

    /// Mark a media file as not watched
    Unmark {
        /// Course root (default: current directory)
        #[arg(long)]
        course: Option<PathBuf>,

        /// Media file, relative to the course root
        #[arg(long)]
        media: PathBuf,
    },

    /// List watched media of a course
    List {
        /// Course root (default: current directory)
        #[arg(long)]
        course: Option<PathBuf>,
    },
}

pub fn execute(paths: &DataPaths, action: WatchedAction) -> Result<()> {
    let config = paths.load_config()?;
    let mut store = paths.open_store(&config);

    match action {
        WatchedAction::Mark { course, media } => {
            let course = course_root(course)?;
            let key = media_key(&course, &media);
            store.set_video_completed(&course, &key, true)?;
            println!("Marked {key} as watched.");
        }
        WatchedAction::Unmark { course, media } => {
            let course = course_root(course)?;
            let key = media_key(&course, &media);
            store.set_video_completed(&course, &key, false)?;
            println!("Marked {key} as not watched.");
        }
        WatchedAction::List { course } => {
            let course = course_root(course)?;
            let watched = store.watched(&course);
            if watched.is_empty() {
                println!("Nothing watched yet.");
            }
            for media in watched {
                println!("{media}");
            }
        }
    }
    Ok(())
}

pub mod history;
pub mod init;
pub mod list;
pub mod notes;
pub mod reset;
pub mod settings;
pub mod take;
pub mod validate;
pub mod watched;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use coursequiz_store::store::course_key;
use coursequiz_store::{load_config_from, CoursequizConfig, JsonStore};

/// Global path options shared by every command.
pub struct DataPaths {
    pub config: Option<PathBuf>,
    pub data_file: Option<PathBuf>,
}

impl DataPaths {
    pub fn load_config(&self) -> Result<CoursequizConfig> {
        load_config_from(self.config.as_deref())
    }

    /// Open the user data store, honouring `--data-file`.
    pub fn open_store(&self, config: &CoursequizConfig) -> JsonStore {
        match &self.data_file {
            Some(path) => JsonStore::open_with_theme(path, &config.default_theme),
            None => JsonStore::from_config(config),
        }
    }
}

/// The course an exam belongs to, defaulting to the current directory.
pub fn course_root(course: Option<PathBuf>) -> Result<PathBuf> {
    match course {
        Some(path) => Ok(path),
        None => std::env::current_dir().context("failed to determine the current directory"),
    }
}

/// Render points without a trailing `.0` for whole numbers.
pub fn fmt_points(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{points:.0}")
    } else {
        format!("{points:.2}")
    }
}

/// `path` relative to `base` when possible.
pub fn relative_to<'p>(path: &'p Path, base: &Path) -> &'p Path {
    path.strip_prefix(base).unwrap_or(path)
}

/// Key of a media file inside a course: its path relative to the course
/// root. Relative inputs are taken as already relative.
pub fn media_key(course: &Path, media: &Path) -> String {
    let base = PathBuf::from(course_key(course));
    let media = if media.is_absolute() {
        media.strip_prefix(&base).unwrap_or(media)
    } else {
        media
    };
    media.to_string_lossy().into_owned()
}

//! JSON document store for user data.
//!
//! The whole document lives in memory and is rewritten on every change.
//! Writes go to a temporary file in the same directory which then replaces
//! the data file, so a crash never leaves a half-written document behind.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use coursequiz_core::model::AttemptRecord;
use coursequiz_core::traits::AttemptStore;

use crate::config::CoursequizConfig;
use crate::error::StoreError;

const THEME_KEY: &str = "theme";
const IDE_PATH_KEY: &str = "ide_path";

/// The on-disk document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    /// Application settings (theme, editor path, arbitrary UI state).
    #[serde(default)]
    pub config: Map<String, Value>,
    /// Per-course data keyed by absolute course path.
    #[serde(default)]
    pub courses: BTreeMap<String, CourseData>,
}

/// Everything recorded for one course.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseData {
    /// Relative paths of media marked as watched.
    #[serde(default)]
    pub history: Vec<String>,
    /// Notes keyed by relative media path.
    #[serde(default)]
    pub notes: BTreeMap<String, String>,
    /// Attempt histories keyed by exam name.
    #[serde(default)]
    pub tests: BTreeMap<String, Vec<AttemptRecord>>,
}

/// User data persisted as a single JSON file.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    data: UserData,
}

impl JsonStore {
    /// Open the store at `path`, starting empty if the file is missing.
    ///
    /// An unreadable or corrupt file is moved aside to `<name>.bak` (or
    /// `<name>.bak.N` when earlier backups exist) and the store starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::open_with_theme(path, "light")
    }

    /// Open the store configured by `config`.
    pub fn from_config(config: &CoursequizConfig) -> Self {
        Self::open_with_theme(config.data_file_path(), &config.default_theme)
    }

    /// Open the store at `path`, writing `default_theme` into a fresh document.
    pub fn open_with_theme(path: impl Into<PathBuf>, default_theme: &str) -> Self {
        let path = path.into();
        let mut data = if path.exists() {
            match read_document(&path) {
                Ok(data) => data,
                Err(e) => {
                    let backup = backup_path(&path);
                    tracing::warn!(
                        "user data at {} is unreadable ({e}); moving it to {} and starting fresh",
                        path.display(),
                        backup.display()
                    );
                    if let Err(e) = std::fs::rename(&path, &backup) {
                        tracing::warn!("failed to back up {}: {e}", path.display());
                    }
                    UserData::default()
                }
            }
        } else {
            UserData::default()
        };

        data.config
            .entry(THEME_KEY)
            .or_insert_with(|| Value::String(default_theme.to_string()));
        data.config
            .entry(IDE_PATH_KEY)
            .or_insert_with(|| Value::String(String::new()));

        tracing::debug!(path = %path.display(), courses = data.courses.len(), "user data opened");
        Self { path, data }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &UserData {
        &self.data
    }

    /// Write the document to disk.
    pub fn save(&self) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.data.serialize(&mut ser)?;

        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(&buf).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }

    /// Apply `change` and save. On a failed save the change is rolled back.
    fn update<F>(&mut self, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut UserData),
    {
        let previous = self.data.clone();
        change(&mut self.data);
        if let Err(e) = self.save() {
            self.data = previous;
            return Err(e);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Settings
    // -----------------------------------------------------------------------

    pub fn theme(&self) -> &str {
        self.data
            .config
            .get(THEME_KEY)
            .and_then(Value::as_str)
            .unwrap_or("light")
    }

    pub fn set_theme(&mut self, theme: &str) -> Result<(), StoreError> {
        self.set_setting(THEME_KEY, Value::String(theme.to_string()))
    }

    /// An arbitrary stored setting.
    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.data.config.get(key)
    }

    pub fn set_setting(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        let key = key.to_string();
        self.update(|data| {
            data.config.insert(key, value);
        })
    }

    // -----------------------------------------------------------------------
    // Watched media and notes
    // -----------------------------------------------------------------------

    pub fn is_video_completed(&self, course_path: &Path, media: &str) -> bool {
        self.course(course_path)
            .is_some_and(|c| c.history.iter().any(|m| m == media))
    }

    /// Mark or unmark `media` as watched. Repeating either is a no-op.
    pub fn set_video_completed(
        &mut self,
        course_path: &Path,
        media: &str,
        completed: bool,
    ) -> Result<(), StoreError> {
        let key = course_key(course_path);
        self.update(|data| {
            let history = &mut data.courses.entry(key).or_default().history;
            let present = history.iter().any(|m| m == media);
            if completed && !present {
                history.push(media.to_string());
            } else if !completed {
                history.retain(|m| m != media);
            }
        })
    }

    /// Watched media of a course, in the order they were marked.
    pub fn watched(&self, course_path: &Path) -> &[String] {
        self.course(course_path)
            .map(|c| c.history.as_slice())
            .unwrap_or_default()
    }

    pub fn notes(&self, course_path: &Path, media: &str) -> &str {
        self.course(course_path)
            .and_then(|c| c.notes.get(media))
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn set_notes(&mut self, course_path: &Path, media: &str, text: &str) -> Result<(), StoreError> {
        let key = course_key(course_path);
        self.update(|data| {
            data.courses
                .entry(key)
                .or_default()
                .notes
                .insert(media.to_string(), text.to_string());
        })
    }

    /// Non-blank notes within `scope`, ordered by course then media path.
    pub fn note_rows(&self, scope: &NoteScope) -> Vec<NoteRow> {
        let mut rows = Vec::new();
        let mut push = |key: &str, course: &CourseData, only: Option<&str>| {
            for (media, text) in &course.notes {
                if only.is_some_and(|m| m != media.as_str()) || text.trim().is_empty() {
                    continue;
                }
                rows.push(NoteRow {
                    course: file_name_of(key),
                    media: file_name_of(media),
                    text: text.clone(),
                });
            }
        };

        match scope {
            NoteScope::Item { course, media } => {
                let key = course_key(course);
                if let Some(data) = self.data.courses.get(&key) {
                    push(&key, data, Some(media.as_str()));
                }
            }
            NoteScope::Course(course) => {
                let key = course_key(course);
                if let Some(data) = self.data.courses.get(&key) {
                    push(&key, data, None);
                }
            }
            NoteScope::All => {
                for (key, data) in &self.data.courses {
                    push(key, data, None);
                }
            }
        }
        rows
    }

    // -----------------------------------------------------------------------
    // Clearing
    // -----------------------------------------------------------------------

    pub fn clear_all_notes(&mut self) -> Result<(), StoreError> {
        self.update(|data| data.courses.values_mut().for_each(|c| c.notes.clear()))
    }

    pub fn clear_all_history(&mut self) -> Result<(), StoreError> {
        self.update(|data| data.courses.values_mut().for_each(|c| c.history.clear()))
    }

    pub fn clear_all_tests(&mut self) -> Result<(), StoreError> {
        self.update(|data| data.courses.values_mut().for_each(|c| c.tests.clear()))
    }

    /// Drop every course and setting except the theme.
    pub fn reset_all_data(&mut self) -> Result<(), StoreError> {
        let theme = self.theme().to_string();
        self.update(|data| {
            *data = UserData::default();
            data.config.insert(THEME_KEY.into(), Value::String(theme));
            data.config
                .insert(IDE_PATH_KEY.into(), Value::String(String::new()));
        })
    }

    fn course(&self, course_path: &Path) -> Option<&CourseData> {
        self.data.courses.get(&course_key(course_path))
    }
}

impl AttemptStore for JsonStore {
    fn test_history(&self, course_path: &Path, exam_name: &str) -> Vec<AttemptRecord> {
        self.course(course_path)
            .and_then(|c| c.tests.get(exam_name))
            .cloned()
            .unwrap_or_default()
    }

    fn add_test_attempt(
        &mut self,
        course_path: &Path,
        exam_name: &str,
        attempt: AttemptRecord,
    ) -> anyhow::Result<()> {
        let key = course_key(course_path);
        self.update(|data| {
            data.courses
                .entry(key)
                .or_default()
                .tests
                .entry(exam_name.to_string())
                .or_default()
                .push(attempt);
        })?;
        Ok(())
    }
}

/// Which notes to collect for an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteScope {
    /// One media file of one course.
    Item { course: PathBuf, media: String },
    /// Every note of one course.
    Course(PathBuf),
    /// Every note of every course.
    All,
}

/// One exported note: course folder name, media file name, text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteRow {
    pub course: String,
    pub media: String,
    pub text: String,
}

/// Courses are keyed by their absolute path, without trailing separators.
pub fn course_key(course_path: &Path) -> String {
    std::path::absolute(course_path)
        .unwrap_or_else(|_| course_path.to_path_buf())
        .components()
        .collect::<PathBuf>()
        .to_string_lossy()
        .into_owned()
}

fn file_name_of(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

fn read_document(path: &Path) -> anyhow::Result<UserData> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// First free backup name: `<name>.bak`, then `<name>.bak.1`, `<name>.bak.2`...
fn backup_path(path: &Path) -> PathBuf {
    let base = path.file_name().unwrap_or_default().to_string_lossy().into_owned();
    let first = path.with_file_name(format!("{base}.bak"));
    if !first.exists() {
        return first;
    }
    (1u32..)
        .map(|n| path.with_file_name(format!("{base}.bak.{n}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(first)
}

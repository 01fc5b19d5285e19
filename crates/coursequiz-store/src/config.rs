//! Application configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides [`CoursequizConfig::data_dir`].
pub const DATA_DIR_ENV: &str = "COURSEQUIZ_DATA_DIR";

/// Top-level coursequiz configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoursequizConfig {
    /// Directory holding the user data file.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Name of the user data file inside `data_dir`.
    #[serde(default = "default_data_file_name")]
    pub data_file_name: String,
    /// Name of the per-chapter folder that holds exam files.
    #[serde(default = "default_tests_dir_name")]
    pub tests_dir_name: String,
    /// Extension of exam files, without the dot.
    #[serde(default = "default_exam_extension")]
    pub exam_extension: String,
    /// Theme written into a fresh data file.
    #[serde(default = "default_theme")]
    pub default_theme: String,
}

fn default_data_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        if !xdg.is_empty() {
            return PathBuf::from(xdg).join("coursequiz");
        }
    }
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(".local").join("share").join("coursequiz"))
        .unwrap_or_else(|_| PathBuf::from(".coursequiz"))
}
fn default_data_file_name() -> String {
    "user_data.data".to_string()
}
fn default_tests_dir_name() -> String {
    "Tests".to_string()
}
fn default_exam_extension() -> String {
    "test".to_string()
}
fn default_theme() -> String {
    "light".to_string()
}

impl Default for CoursequizConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            data_file_name: default_data_file_name(),
            tests_dir_name: default_tests_dir_name(),
            exam_extension: default_exam_extension(),
            default_theme: default_theme(),
        }
    }
}

impl CoursequizConfig {
    /// Full path of the user data file.
    pub fn data_file_path(&self) -> PathBuf {
        self.data_dir.join(&self.data_file_name)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `coursequiz.toml` in the current directory
/// 2. `~/.config/coursequiz/config.toml`
///
/// `COURSEQUIZ_DATA_DIR` overrides the data directory.
pub fn load_config() -> Result<CoursequizConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<CoursequizConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("coursequiz.toml");
        if local.exists() {
            Some(local)
        } else {
            config_home()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<CoursequizConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => CoursequizConfig::default(),
    };

    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            config.data_dir = PathBuf::from(dir);
        }
    }
    config.data_dir = PathBuf::from(resolve_env_vars(&config.data_dir.to_string_lossy()));

    Ok(config)
}

fn config_home() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("coursequiz"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_COURSEQUIZ_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_COURSEQUIZ_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_COURSEQUIZ_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("unterminated ${VAR"), "unterminated ${VAR");
        std::env::remove_var("_COURSEQUIZ_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = CoursequizConfig::default();
        assert_eq!(config.data_file_name, "user_data.data");
        assert_eq!(config.tests_dir_name, "Tests");
        assert_eq!(config.exam_extension, "test");
        assert_eq!(config.default_theme, "light");
        assert!(config.data_file_path().ends_with("user_data.data"));
    }

    #[test]
    fn parse_partial_config() {
        let config: CoursequizConfig = toml::from_str(
            r#"
data_dir = "/srv/coursequiz"
tests_dir_name = "Exams"
"#,
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/coursequiz"));
        assert_eq!(config.tests_dir_name, "Exams");
        assert_eq!(config.exam_extension, "test");
        assert_eq!(
            config.data_file_path(),
            PathBuf::from("/srv/coursequiz/user_data.data")
        );
    }

    #[test]
    fn load_explicit_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coursequiz.toml");
        std::fs::write(&path, "data_file_name = \"progress.json\"\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.data_file_name, "progress.json");
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "data_dir = [").unwrap();
        assert!(load_config_from(Some(&path)).is_err());
    }
}

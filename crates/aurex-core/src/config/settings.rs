//! Explorer configuration loaded from a TOML file.
//!
//! Every section and field has a default, so a missing or partial file
//! behaves like the built-in settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Top-level explorer configuration.
///
/// Call [`Config::load`] to read from a TOML path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tree: TreeConfig,
    #[serde(default)]
    pub archives: ArchiveConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Loads configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::PermissionDenied`] if the file is not readable.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CoreError::from_io(e, path))?;
        toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }
}

/// Which filesystem entries appear in the tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    #[serde(default = "default_true")]
    pub show_hidden: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self { show_hidden: true }
    }
}

/// Archive expansion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Show ERF, RIM and KEY files as expandable nodes.
    #[serde(default = "default_true")]
    pub expand: bool,
    /// Match the BIF names stored in KEY files without regard to case.
    #[serde(default = "default_true")]
    pub case_insensitive_lookup: bool,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            expand: true,
            case_insensitive_lookup: true,
        }
    }
}

/// Preview settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    #[serde(default = "default_text_max_lines")]
    pub text_max_lines: usize,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            text_max_lines: default_text_max_lines(),
        }
    }
}

/// Log output settings for front ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// A `tracing` level name: `error`, `warn`, `info`, `debug` or `trace`.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Write logs to this file instead of stderr.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_text_max_lines() -> usize {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_config_tree() {
        let config = Config::default();
        assert!(config.tree.show_hidden);
    }

    #[test]
    fn default_config_archives() {
        let config = Config::default();
        assert!(config.archives.expand);
        assert!(config.archives.case_insensitive_lookup);
    }

    #[test]
    fn default_config_preview_and_logging() {
        let config = Config::default();
        assert_eq!(config.preview.text_max_lines, 500);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, None);
    }

    #[test]
    fn load_full_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("aurex.toml");
        fs::write(
            &path,
            r#"
[tree]
show_hidden = false

[archives]
expand = false
case_insensitive_lookup = false

[preview]
text_max_lines = 40

[logging]
level = "debug"
file = "/tmp/aurex.log"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        assert!(!config.tree.show_hidden);
        assert!(!config.archives.expand);
        assert!(!config.archives.case_insensitive_lookup);
        assert_eq!(config.preview.text_max_lines, 40);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/aurex.log")));
    }

    #[test]
    fn load_partial_toml_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("aurex.toml");
        fs::write(
            &path,
            r#"
[archives]
expand = false
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        assert!(!config.archives.expand);
        assert!(config.archives.case_insensitive_lookup);
        assert!(config.tree.show_hidden);
        assert_eq!(config.preview.text_max_lines, 500);
    }

    #[test]
    fn load_empty_toml_uses_all_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("aurex.toml");
        fs::write(&path, "").unwrap();

        let config = Config::load(&path).unwrap();
        let default = Config::default();

        assert_eq!(config.tree.show_hidden, default.tree.show_hidden);
        assert_eq!(config.logging.level, default.logging.level);
    }

    #[test]
    fn load_nonexistent_returns_not_found() {
        let tmp = TempDir::new().unwrap();
        let result = Config::load(&tmp.path().join("nonexistent.toml"));
        assert!(matches!(result.unwrap_err(), CoreError::NotFound(_)));
    }

    #[test]
    fn load_invalid_toml_returns_config_parse() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("aurex.toml");
        fs::write(&path, "this is not valid [[[toml").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result.unwrap_err(), CoreError::ConfigParse(_)));
    }

    #[test]
    fn wrong_value_type_is_a_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("aurex.toml");
        fs::write(&path, "[preview]\ntext_max_lines = \"many\"\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, CoreError::ConfigParse(_)));
    }

    #[test]
    fn options_follow_config() {
        let mut config = Config::default();
        config.tree.show_hidden = false;
        config.archives.case_insensitive_lookup = false;

        let options = crate::tree::TreeOptions::from_config(&config);
        assert!(!options.show_hidden);
        assert!(options.expand_archives);
        assert!(!options.case_insensitive_lookup);
    }
}

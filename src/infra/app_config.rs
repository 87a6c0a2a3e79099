use crate::domain::ConfigError;
use crate::infra::diff::DEFAULT_SPACER_LINES;
use crate::infra::diff::engine::DEFAULT_MAX_INLINE_LEN;
use crate::ui::diff::syntax::DEFAULT_OVERLAP_THRESHOLD;
use crate::ui::diff::syntax::shared_cache::DEFAULT_SHARED_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tunables for one diff view. Every field has a default so partial config
/// files are valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Extra rows materialized above and below the viewport.
    pub buffer_rows: usize,
    /// Token/color cache size that triggers trimming.
    pub trim_ceiling: usize,
    /// Rows around the visible range that survive a trim.
    pub trim_buffer: usize,
    /// Spacer rows inserted between files of a multi-file patch.
    pub spacer_lines: usize,
    pub shared_cache_capacity: usize,
    /// Fraction of a token that a higher-priority token must cover to drop it.
    pub overlap_threshold: f32,
    /// Lines longer than this (in chars) skip character-level diffing.
    pub max_inline_len: usize,
    pub gutter_chars: usize,
    pub text_padding: f32,
    pub highlight_lookaround: usize,
    /// Documents up to this many lines are highlighted in one pass.
    pub whole_document_highlight_limit: usize,
    pub dark_mode: bool,
    pub ignore_whitespace: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            buffer_rows: 20,
            trim_ceiling: 2000,
            trim_buffer: 200,
            spacer_lines: DEFAULT_SPACER_LINES,
            shared_cache_capacity: DEFAULT_SHARED_CAPACITY,
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
            max_inline_len: DEFAULT_MAX_INLINE_LEN,
            gutter_chars: 10,
            text_padding: 8.0,
            highlight_lookaround: 200,
            whole_document_highlight_limit: 5000,
            dark_mode: true,
            ignore_whitespace: false,
        }
    }
}

pub fn load_config() -> ViewConfig {
    let path = config_path();
    if !path.exists() {
        return ViewConfig::default();
    }
    match load_config_from(&path) {
        Ok(config) => config,
        Err(err) => {
            log::warn!(
                target: "config",
                "Ignoring config at {}: {}; using defaults",
                path.display(),
                err
            );
            ViewConfig::default()
        }
    }
}

pub fn load_config_from(path: &Path) -> Result<ViewConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

pub fn save_config(config: &ViewConfig) -> Result<(), ConfigError> {
    save_config_to(&config_path(), config)
}

pub fn save_config_to(path: &Path, config: &ViewConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("DIFFSURFACE_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    app_data_dir().join("config.toml")
}

fn app_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var("DIFFSURFACE_DATA_HOME") {
        return PathBuf::from(path);
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = home::home_dir() {
            return home
                .join("Library")
                .join("Application Support")
                .join("diffsurface");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("diffsurface");
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(xdg) = std::env::var_os("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("diffsurface");
        }
        if let Some(home) = home::home_dir() {
            return home.join(".local").join("share").join("diffsurface");
        }
    }

    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".diffsurface")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: ViewConfig = toml::from_str("buffer_rows = 4\ndark_mode = false\n").unwrap();
        assert_eq!(config.buffer_rows, 4);
        assert!(!config.dark_mode);
        assert_eq!(config.trim_ceiling, ViewConfig::default().trim_ceiling);
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = ViewConfig {
            spacer_lines: 3,
            overlap_threshold: 0.75,
            ..Default::default()
        };

        save_config_to(&path, &config).unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "buffer_rows = \"many\"").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }
}

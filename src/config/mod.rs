// Configuration management for lyricpad
// Handles loading/saving settings, with sensible defaults when config is missing

use crate::composer::TargetMode;
use anyhow::Result;
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub log_dir: PathBuf,
    pub rhymes: RhymeConfig,
    pub editor: EditorConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhymeConfig {
    /// Name of the environment variable holding the API key (never the key itself)
    pub api_key_env: String,
    pub api_base: String,
    pub model: String,
    pub language: String, // language the rhymes are asked for in
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    pub autosave_debounce_ms: u64,
    pub default_target_mode: TargetMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    pub status_duration_ms: u64,
    pub show_help: bool,
}

impl Default for Config {
    fn default() -> Self {
        let log_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lyricpad")
            .join("logs");

        Self {
            log_dir,
            rhymes: RhymeConfig {
                api_key_env: "GEMINI_API_KEY".to_string(),
                api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                model: "gemini-3-flash-preview".to_string(),
                language: "Portuguese".to_string(),
                timeout_secs: 20,
            },
            editor: EditorConfig {
                autosave_debounce_ms: 750,
                default_target_mode: TargetMode::Last,
            },
            ui: UiConfig {
                status_duration_ms: 3000,
                show_help: true,
            },
        }
    }
}

impl EditorConfig {
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }
}

impl UiConfig {
    pub fn status_duration(&self) -> Duration {
        Duration::from_millis(self.status_duration_ms)
    }
}

impl Config {
    /// Load from the default location, writing defaults there on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(config_path, content)?;

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("lyricpad");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("api_key_env = \"GEMINI_API_KEY\""));
        assert!(written.contains("default_target_mode = \"last\""));
    }

    #[test]
    fn test_roundtrip_keeps_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.rhymes.language = "English".to_string();
        config.editor.default_target_mode = TargetMode::Penultimate;
        config.editor.autosave_debounce_ms = 200;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.rhymes.language, "English");
        assert_eq!(loaded.editor.default_target_mode, TargetMode::Penultimate);
        assert_eq!(loaded.editor.autosave_delay(), Duration::from_millis(200));
    }

    #[test]
    fn test_broken_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "rhymes = 12").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::i18n::Language;

const MIN_DELAY_MS: u64 = 100;
const MAX_DELAY_MS: u64 = 5_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub random_mode: bool,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_feedback_delay_ms")]
    pub feedback_delay_ms: u64,
    #[serde(default = "default_summary_delay_ms")]
    pub summary_delay_ms: u64,
    #[serde(default)]
    pub username: Option<String>,
}

fn default_language() -> String {
    Language::default().code().to_string()
}
fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_feedback_delay_ms() -> u64 {
    500
}
fn default_summary_delay_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: default_language(),
            random_mode: false,
            theme: default_theme(),
            feedback_delay_ms: default_feedback_delay_ms(),
            summary_delay_ms: default_summary_delay_ms(),
            username: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lingodrill")
            .join("config.toml")
    }

    /// Clamp delays and reset an unknown language code.
    /// Call after deserialization to handle hand-edited files.
    pub fn validate(&mut self) {
        self.feedback_delay_ms = self.feedback_delay_ms.clamp(MIN_DELAY_MS, MAX_DELAY_MS);
        self.summary_delay_ms = self.summary_delay_ms.clamp(MIN_DELAY_MS, MAX_DELAY_MS);
        match Language::from_code(&self.language) {
            Some(language) => self.language = language.code().to_string(),
            None => {
                warn!(
                    target: "lingodrill::config",
                    language = %self.language,
                    "unknown language in config, using default"
                );
                self.language = default_language();
            }
        }
        if self
            .username
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            self.username = None;
        }
    }

    pub fn language(&self) -> Language {
        Language::from_code(&self.language).unwrap_or_default()
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language.code().to_string();
    }

    pub fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_delay_ms)
    }

    pub fn summary_delay(&self) -> Duration {
        Duration::from_millis(self.summary_delay_ms)
    }
}

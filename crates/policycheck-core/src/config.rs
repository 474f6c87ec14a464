//! Layered configuration and path helpers.
//!
//! Uses Figment to merge built-in defaults, `config.toml`, `config.<env>.toml`
//! and `APP_*` env vars (`__` separates nesting, e.g. `APP_JUDGE__MODEL`).
//! Paths expand `~` and `${VAR}`.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub document_directory: String,
    pub index_directory: String,
    pub report_path: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            document_directory: "data/pdfs".to_string(),
            index_directory: "data/vector_store".to_string(),
            report_path: "data/compliance_results.json".to_string(),
        }
    }
}

/// Word-window chunking. `overlap` must be strictly smaller than `window_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub window_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self { window_size: 1000, overlap: 200 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub max_vocabulary_size: usize,
    pub min_document_frequency: usize,
    pub max_document_fraction: f64,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self { max_vocabulary_size: 5000, min_document_frequency: 1, max_document_fraction: 0.95 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub top_k_default: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { top_k_default: 3 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JudgeProvider {
    Gemini,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeSettings {
    pub provider: JudgeProvider,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for JudgeSettings {
    fn default() -> Self {
        Self {
            provider: JudgeProvider::Gemini,
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

/// Every recognised option. Passed explicitly to the retriever, judge and evaluator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub chunking: ChunkingSettings,
    pub index: IndexSettings,
    pub search: SearchSettings,
    pub judge: JudgeSettings,
}

impl Settings {
    pub fn document_directory(&self) -> PathBuf {
        expand_path(&self.data.document_directory)
    }

    pub fn index_directory(&self) -> PathBuf {
        expand_path(&self.data.index_directory)
    }

    pub fn report_path(&self) -> PathBuf {
        expand_path(&self.data.report_path)
    }

    pub fn validate(&self) -> Result<()> {
        let c = &self.chunking;
        if c.window_size == 0 {
            return Err(Error::InvalidConfig("chunking.window_size must be greater than 0".into()));
        }
        if c.overlap >= c.window_size {
            return Err(Error::InvalidConfig(format!(
                "chunking.overlap ({}) must be smaller than chunking.window_size ({})",
                c.overlap, c.window_size
            )));
        }
        if self.index.max_vocabulary_size == 0 {
            return Err(Error::InvalidConfig("index.max_vocabulary_size must be greater than 0".into()));
        }
        let f = self.index.max_document_fraction;
        if !(f > 0.0 && f <= 1.0) {
            return Err(Error::InvalidConfig(format!("index.max_document_fraction must be in (0, 1], got {}", f)));
        }
        if self.search.top_k_default == 0 {
            return Err(Error::InvalidConfig("search.top_k_default must be greater than 0".into()));
        }
        if self.judge.timeout_secs == 0 {
            return Err(Error::InvalidConfig("judge.timeout_secs must be greater than 0".into()));
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));
        Ok(Self { figment })
    }

    /// Wrap an already assembled figment; defaults are layered underneath it.
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment: Figment::from(Serialized::defaults(Settings::default())).merge(figment) }
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }

    /// Extract and validate the typed settings. `GEMINI_API_KEY` fills a missing `judge.api_key`.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        if settings.judge.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            settings.judge.api_key = env::var("GEMINI_API_KEY").ok().filter(|k| !k.trim().is_empty());
        }
        settings.validate()?;
        Ok(settings)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

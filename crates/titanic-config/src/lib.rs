//! Configuration loading for Titanic Chat.
//! Reads titanic.toml from the current directory or the path in the
//! TITANIC_CONFIG env var, then applies TITANIC_* environment overrides.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_ENV: &str = "TITANIC_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "titanic.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub charts: ChartConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String { "0.0.0.0:8000".to_string() }

impl Default for ServerConfig {
    fn default() -> Self { Self { bind: default_bind() } }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,
}

fn default_dataset_path() -> PathBuf { PathBuf::from("titanic.csv") }

impl Default for DatasetConfig {
    fn default() -> Self { Self { path: default_dataset_path() } }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Name of the environment variable holding the inference API token.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_llm_base_url() -> String { "https://router.huggingface.co".to_string() }
fn default_llm_model()    -> String { "Qwen/Qwen2.5-7B-Instruct:together".to_string() }
fn default_api_key_env()  -> String { "HUGGINGFACEHUB_API_TOKEN".to_string() }
fn default_max_tokens()   -> u32    { 512 }
fn default_temperature()  -> f32    { 0.1 }
fn default_llm_timeout()  -> u64    { 60 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url:     default_llm_base_url(),
            model:        default_llm_model(),
            api_key_env:  default_api_key_env(),
            max_tokens:   default_max_tokens(),
            temperature:  default_temperature(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl LlmConfig {
    /// Read the inference token from the configured environment variable.
    /// Blank values and the `.env` template placeholder count as unset.
    pub fn api_key(&self) -> Option<SecretString> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| is_real_token(k))
            .map(SecretString::from)
    }
}

fn is_real_token(value: &str) -> bool {
    let v = value.trim();
    !v.is_empty() && v != "your_token_here"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_max_observation_chars")]
    pub max_observation_chars: usize,
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

fn default_max_iterations()        -> usize { 8 }
fn default_max_observation_chars() -> usize { 2000 }
fn default_preview_rows()          -> usize { 5 }

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations:        default_max_iterations(),
            max_observation_chars: default_max_observation_chars(),
            preview_rows:          default_preview_rows(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_chart_width")]
    pub width: u32,
    #[serde(default = "default_chart_height")]
    pub height: u32,
    /// TTF/OTF font used for titles and labels. Falls back to well-known
    /// system fonts; charts are drawn without text if none is found.
    #[serde(default)]
    pub font_path: Option<PathBuf>,
}

fn default_chart_width()  -> u32 { 800 }
fn default_chart_height() -> u32 { 500 }

impl Default for ChartConfig {
    fn default() -> Self {
        Self { width: default_chart_width(), height: default_chart_height(), font_path: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_client_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_plot_dir")]
    pub plot_dir: PathBuf,
    #[serde(default = "bool_true")]
    pub autostart_backend: bool,
    #[serde(default = "default_server_command")]
    pub server_command: String,
    #[serde(default = "default_startup_wait")]
    pub startup_wait_ms: u64,
}

fn default_api_url()        -> String  { "http://localhost:8000".to_string() }
fn default_client_timeout() -> u64     { 60 }
fn default_plot_dir()       -> PathBuf { PathBuf::from("plots") }
fn bool_true()              -> bool    { true }
fn default_server_command() -> String  { "titanic-server".to_string() }
fn default_startup_wait()   -> u64     { 10_000 }

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url:           default_api_url(),
            timeout_secs:      default_client_timeout(),
            plot_dir:          default_plot_dir(),
            autostart_backend: bool_true(),
            server_command:    default_server_command(),
            startup_wait_ms:   default_startup_wait(),
        }
    }
}

mod tests;

/// Load `.env` from the current directory or its parents, if present.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Loaded .env");
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!("Ignoring unreadable .env: {e}");
            None
        }
    }
}

impl Config {
    /// Load configuration from titanic.toml.
    /// Checks TITANIC_CONFIG env var first, then the current directory.
    /// Without an explicit path a missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var(CONFIG_ENV).ok();
        let path = explicit
            .clone()
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        let mut config = Self::load_from(Path::new(&path), explicit.is_some())?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from(path: &Path, required: bool) -> Result<Self, ConfigError> {
        if !path.exists() {
            if required {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply TITANIC_* overrides using `lookup` as the environment.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = lookup("TITANIC_BIND") {
            self.server.bind = bind;
        }
        if let Some(path) = lookup("TITANIC_DATASET") {
            self.dataset.path = PathBuf::from(path);
        }
        if let Some(url) = lookup("TITANIC_API_URL") {
            self.client.api_url = url;
        }
        if let Some(model) = lookup("TITANIC_MODEL") {
            self.llm.model = model;
        }
    }
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Request body limit for uploads, in megabytes
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Extra attempts after the first on transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Gcs,
    Local,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gcs => write!(f, "gcs"),
            Self::Local => write!(f, "local"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub bucket: String,
    /// OAuth2 bearer token used for uploads
    #[serde(default)]
    pub access_token: String,
    #[serde(default = "default_upload_base_url")]
    pub upload_base_url: String,
    /// Base of the returned download URL; derived from the backend when unset
    #[serde(default)]
    pub public_base_url: Option<String>,
    #[serde(default = "default_local_dir")]
    pub local_dir: PathBuf,
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_upload_mb() -> usize {
    10
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_timeout_seconds() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

fn default_upload_base_url() -> String {
    "https://storage.googleapis.com".to_string()
}

fn default_local_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_prefix() -> String {
    "change_orders".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_llm_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout_seconds(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: String::new(),
            access_token: String::new(),
            upload_base_url: default_upload_base_url(),
            public_base_url: None,
            local_dir: default_local_dir(),
            prefix: default_prefix(),
        }
    }
}

impl ServerConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

/// Load configuration from an optional TOML file, overridden by
/// `CHANGE_ORDER__SECTION__KEY` environment variables.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let cfg = load_unvalidated(path)?;
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Same sources as [`load_config`], without validation
pub fn load_unvalidated(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("CHANGE_ORDER").separator("__"))
        .build()?;

    Ok(config.try_deserialize()?)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    validate_server(&cfg.server)?;
    validate_llm(&cfg.llm)?;
    validate_storage(&cfg.storage)
}

pub fn validate_server(server: &ServerConfig) -> anyhow::Result<()> {
    if server.port == 0 {
        anyhow::bail!("server.port must be non-zero");
    }

    if server.max_upload_mb == 0 {
        anyhow::bail!("server.max_upload_mb must be at least 1");
    }

    Ok(())
}

pub fn validate_llm(llm: &LlmConfig) -> anyhow::Result<()> {
    if llm.api_key.trim().is_empty() {
        anyhow::bail!("llm.api_key must be set (or CHANGE_ORDER__LLM__API_KEY)");
    }

    if !(0.0..=2.0).contains(&llm.temperature) {
        anyhow::bail!(
            "llm.temperature must be between 0.0 and 2.0, got {}",
            llm.temperature
        );
    }

    if llm.model.trim().is_empty() {
        anyhow::bail!("llm.model cannot be empty");
    }

    Ok(())
}

pub fn validate_storage(storage: &StorageConfig) -> anyhow::Result<()> {
    if storage.backend == StorageBackend::Gcs {
        if storage.bucket.trim().is_empty() {
            anyhow::bail!("storage.bucket must be set when storage.backend is 'gcs'");
        }
        if storage.access_token.trim().is_empty() {
            anyhow::bail!("storage.access_token must be set when storage.backend is 'gcs'");
        }
    }

    Ok(())
}

use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};

use crate::analysis::selection::KeepPolicy;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub server_url: String,
    pub api_key: String,
    /// Library names to scan. Empty means every library.
    #[serde(default)]
    pub libraries: Vec<String>,
    #[serde(default)]
    pub keep_policy: KeepPolicy,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_report_dir")]
    pub report_dir: String,
}

fn default_page_size() -> u32 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_report_dir() -> String {
    ".".to_string()
}

impl AppConfig {
    pub fn new(server_url: &str, api_key: &str) -> Self {
        Self {
            server_url: normalize_server_url(server_url),
            api_key: api_key.to_string(),
            libraries: Vec::new(),
            keep_policy: KeepPolicy::default(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            report_dir: default_report_dir(),
        }
    }

    /// Copy of the config safe to print: the API key is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.api_key = mask_secret(&self.api_key);
        copy
    }
}

/// Load `Config.toml` (optional) overlaid with `EMBY_DUPER_*` environment variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(
            Environment::with_prefix("EMBY_DUPER")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("libraries"),
        )
        .build()?;
    let mut config = builder.try_deserialize::<AppConfig>()?;

    if config.server_url.trim().is_empty() {
        return Err(ConfigError::Message("server_url must not be empty".to_string()));
    }
    if config.api_key.trim().is_empty() {
        return Err(ConfigError::Message("api_key must not be empty".to_string()));
    }
    if config.max_attempts == 0 {
        return Err(ConfigError::Message("max_attempts must be at least 1".to_string()));
    }
    config.server_url = normalize_server_url(&config.server_url);
    Ok(config)
}

/// Trim whitespace, trailing slashes and a trailing `/emby` segment; assume
/// `http://` when no scheme is given. Request paths add `/emby` themselves.
pub fn normalize_server_url(url: &str) -> String {
    let mut trimmed = url.trim().trim_end_matches('/');
    if let Some(split) = trimmed.len().checked_sub("/emby".len()) {
        if trimmed.is_char_boundary(split) && trimmed[split..].eq_ignore_ascii_case("/emby") {
            trimmed = trimmed[..split].trim_end_matches('/');
        }
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

//! Layered settings: built-in defaults, then `rentbot.toml`, then `RENTBOT_*` environment
//! variables, then programmatic overrides. Validation runs once over the merged result.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONFIG_FILE_CANDIDATES: [&str; 2] = ["rentbot.toml", "config/rentbot.toml"];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub server: ServerConfig,
    pub assistant: AssistantConfig,
    pub messaging: MessagingConfig,
    pub reports: ReportsConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<SecretString>,
    /// Unset means the provider's public endpoint.
    pub base_url: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
    pub static_dir: String,
}

#[derive(Clone, Debug)]
pub struct AssistantConfig {
    /// Currency token quoted in replies; also the price marker the media rule looks for.
    pub currency_code: String,
    pub seed_catalog: bool,
}

#[derive(Clone, Debug)]
pub struct MessagingConfig {
    pub enabled: bool,
}

#[derive(Clone, Debug)]
pub struct ReportsConfig {
    pub enabled: bool,
    pub recipient: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    #[serde(alias = "openai")]
    OpenAi,
    Ollama,
}

impl LlmProvider {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Ollama => "http://localhost:11434/v1",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" | "open_ai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::Validation(format!(
                "llm.provider `{other}` is not one of openai|ollama"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "logging.format `{other}` is not one of compact|pretty|json"
            ))),
        }
    }
}

/// Values set by the embedding program. They win over every other source.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub llm_provider: Option<LlmProvider>,
    pub llm_model: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_base_url: Option<String>,
    pub currency_code: Option<String>,
    pub seed_catalog: Option<bool>,
    pub messaging_enabled: Option<bool>,
    pub reports_enabled: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    /// Read this file instead of searching the working directory.
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("failed to parse `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("config file `{0}` does not exist")]
    MissingConfigFile(PathBuf),
    #[error("`${{{var}}}` is referenced in the config file but not set in the environment")]
    MissingEnvInterpolation { var: String },
    #[error("config file contains a `${{` without a closing `}}`")]
    UnterminatedInterpolation,
    #[error("{key}=`{value}` could not be parsed")]
    InvalidEnvOverride { key: String, value: String },
    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://rentbot.db?mode=rwc".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            llm: LlmConfig {
                provider: LlmProvider::Ollama,
                api_key: None,
                base_url: None,
                model: "llama3.1".to_string(),
                timeout_secs: 60,
                max_retries: 2,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 5000,
                graceful_shutdown_secs: 15,
                static_dir: "static".to_string(),
            },
            assistant: AssistantConfig { currency_code: "AED".to_string(), seed_catalog: true },
            messaging: MessagingConfig { enabled: true },
            reports: ReportsConfig { enabled: true, recipient: None },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        match locate_file(options.config_path.as_deref()) {
            Some(path) => config.merge(Layer::from_file(&path)?),
            None if options.require_file => {
                let expected = options
                    .config_path
                    .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_CANDIDATES[0]));
                return Err(ConfigError::MissingConfigFile(expected));
            }
            None => {}
        }

        config.merge(Layer::from_env()?);
        config.merge(Layer::from(options.overrides));
        config.validate()?;

        Ok(config)
    }

    /// Base URL of the chat completions API, falling back to the provider default.
    pub fn llm_base_url(&self) -> String {
        self.llm
            .base_url
            .clone()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| self.llm.provider.default_base_url().to_string())
    }

    /// Checks every section and reports all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues: Vec<String> = Vec::new();

        let url = self.database.url.trim();
        if !url.starts_with("sqlite:") && url != ":memory:" {
            issues.push("database.url must be a sqlite URL (`sqlite://...` or `sqlite::memory:`)".into());
        }
        if self.database.max_connections == 0 {
            issues.push("database.max_connections must be at least 1".into());
        }
        if !(1..=300).contains(&self.database.timeout_secs) {
            issues.push("database.timeout_secs must be within 1..=300".into());
        }

        if !(1..=300).contains(&self.llm.timeout_secs) {
            issues.push("llm.timeout_secs must be within 1..=300".into());
        }
        if self.llm.max_retries > 10 {
            issues.push(format!("llm.max_retries must be within 0..=10, got {}", self.llm.max_retries));
        }
        if self.llm.model.trim().is_empty() {
            issues.push("llm.model must not be empty".into());
        }
        if let Some(base_url) = &self.llm.base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                issues.push(format!("llm.base_url `{base_url}` must use http:// or https://"));
            }
        }
        let has_key =
            self.llm.api_key.as_ref().is_some_and(|key| !key.expose_secret().trim().is_empty());
        if self.llm.provider == LlmProvider::OpenAi && !has_key {
            issues.push(
                "llm.api_key is required for the openai provider (set RENTBOT_LLM_API_KEY or OPENAI_API_KEY)"
                    .into(),
            );
        }

        if self.server.port == 0 {
            issues.push("server.port must not be 0".into());
        }
        if self.server.graceful_shutdown_secs == 0 {
            issues.push("server.graceful_shutdown_secs must be at least 1".into());
        }

        let code = self.assistant.currency_code.trim();
        if code.len() != 3 || !code.chars().all(|ch| ch.is_ascii_uppercase()) {
            issues.push(format!(
                "assistant.currency_code must be three uppercase letters such as AED, got `{code}`"
            ));
        }

        if let Some(recipient) = &self.reports.recipient {
            if !recipient.contains('@') {
                issues.push(format!("reports.recipient `{recipient}` is not an email address"));
            }
        }

        let level = self.logging.level.trim().to_ascii_lowercase();
        if !matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
            issues.push("logging.level must be one of trace|debug|info|warn|error".into());
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(issues.join("; ")))
        }
    }

    fn merge(&mut self, layer: Layer) {
        let Layer { database, llm, server, assistant, messaging, reports, logging } = layer;

        replace(&mut self.database.url, database.url);
        replace(&mut self.database.max_connections, database.max_connections);
        replace(&mut self.database.timeout_secs, database.timeout_secs);

        replace(&mut self.llm.provider, llm.provider);
        replace(&mut self.llm.api_key, llm.api_key.map(|key| Some(SecretString::from(key))));
        replace(&mut self.llm.base_url, llm.base_url.map(Some));
        replace(&mut self.llm.model, llm.model);
        replace(&mut self.llm.timeout_secs, llm.timeout_secs);
        replace(&mut self.llm.max_retries, llm.max_retries);

        replace(&mut self.server.bind_address, server.bind_address);
        replace(&mut self.server.port, server.port);
        replace(&mut self.server.graceful_shutdown_secs, server.graceful_shutdown_secs);
        replace(&mut self.server.static_dir, server.static_dir);

        replace(&mut self.assistant.currency_code, assistant.currency_code);
        replace(&mut self.assistant.seed_catalog, assistant.seed_catalog);
        replace(&mut self.messaging.enabled, messaging.enabled);
        replace(&mut self.reports.enabled, reports.enabled);
        replace(&mut self.reports.recipient, reports.recipient.map(Some));

        replace(&mut self.logging.level, logging.level);
        replace(&mut self.logging.format, logging.format);
    }
}

fn replace<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn locate_file(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => path.exists().then(|| path.to_path_buf()),
        None => CONFIG_FILE_CANDIDATES.iter().map(PathBuf::from).find(|path| path.exists()),
    }
}

/// Replaces each `${NAME}` with the value of the environment variable `NAME`.
fn interpolate_env(raw: &str) -> Result<String, ConfigError> {
    let mut rendered = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find("${") {
        rendered.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        let end = tail.find('}').ok_or(ConfigError::UnterminatedInterpolation)?;
        let var = &tail[..end];
        let value = env::var(var)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: var.to_string() })?;
        rendered.push_str(&value);
        rest = &tail[end + 1..];
    }

    rendered.push_str(rest);
    Ok(rendered)
}

/// First non-blank variable among `keys`, parsed as `T`.
fn env_value<T: FromStr>(keys: &[&str]) -> Result<Option<T>, ConfigError> {
    for key in keys {
        let Some(raw) = env::var(key).ok().filter(|value| !value.trim().is_empty()) else {
            continue;
        };
        return raw.trim().parse::<T>().map(Some).map_err(|_| ConfigError::InvalidEnvOverride {
            key: (*key).to_string(),
            value: raw.clone(),
        });
    }
    Ok(None)
}

/// One configuration source. Unset fields leave the value below untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Layer {
    database: DatabaseLayer,
    llm: LlmLayer,
    server: ServerLayer,
    assistant: AssistantLayer,
    messaging: MessagingLayer,
    reports: ReportsLayer,
    logging: LoggingLayer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DatabaseLayer {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LlmLayer {
    provider: Option<LlmProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServerLayer {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
    static_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AssistantLayer {
    currency_code: Option<String>,
    seed_catalog: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MessagingLayer {
    enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReportsLayer {
    enabled: Option<bool>,
    recipient: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoggingLayer {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl Layer {
    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
        toml::from_str(&interpolate_env(&raw)?)
            .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
    }

    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database: DatabaseLayer {
                url: env_value(&["RENTBOT_DATABASE_URL"])?,
                max_connections: env_value(&["RENTBOT_DATABASE_MAX_CONNECTIONS"])?,
                timeout_secs: env_value(&["RENTBOT_DATABASE_TIMEOUT_SECS"])?,
            },
            llm: LlmLayer {
                provider: env_value(&["RENTBOT_LLM_PROVIDER"])?,
                api_key: env_value(&["RENTBOT_LLM_API_KEY", "OPENAI_API_KEY"])?,
                base_url: env_value(&["RENTBOT_LLM_BASE_URL"])?,
                model: env_value(&["RENTBOT_LLM_MODEL"])?,
                timeout_secs: env_value(&["RENTBOT_LLM_TIMEOUT_SECS"])?,
                max_retries: env_value(&["RENTBOT_LLM_MAX_RETRIES"])?,
            },
            server: ServerLayer {
                bind_address: env_value(&["RENTBOT_SERVER_BIND_ADDRESS"])?,
                port: env_value(&["RENTBOT_SERVER_PORT"])?,
                graceful_shutdown_secs: env_value(&["RENTBOT_SERVER_GRACEFUL_SHUTDOWN_SECS"])?,
                static_dir: env_value(&["RENTBOT_SERVER_STATIC_DIR"])?,
            },
            assistant: AssistantLayer {
                currency_code: env_value(&["RENTBOT_ASSISTANT_CURRENCY_CODE"])?,
                seed_catalog: env_value(&["RENTBOT_ASSISTANT_SEED_CATALOG"])?,
            },
            messaging: MessagingLayer { enabled: env_value(&["RENTBOT_MESSAGING_ENABLED"])? },
            reports: ReportsLayer {
                enabled: env_value(&["RENTBOT_REPORTS_ENABLED"])?,
                recipient: env_value(&["RENTBOT_REPORTS_RECIPIENT"])?,
            },
            logging: LoggingLayer {
                level: env_value(&["RENTBOT_LOGGING_LEVEL", "RENTBOT_LOG_LEVEL"])?,
                format: env_value(&["RENTBOT_LOGGING_FORMAT", "RENTBOT_LOG_FORMAT"])?,
            },
        })
    }
}

impl From<ConfigOverrides> for Layer {
    fn from(overrides: ConfigOverrides) -> Self {
        Self {
            database: DatabaseLayer { url: overrides.database_url, ..DatabaseLayer::default() },
            llm: LlmLayer {
                provider: overrides.llm_provider,
                api_key: overrides.llm_api_key,
                base_url: overrides.llm_base_url,
                model: overrides.llm_model,
                ..LlmLayer::default()
            },
            assistant: AssistantLayer {
                currency_code: overrides.currency_code,
                seed_catalog: overrides.seed_catalog,
            },
            messaging: MessagingLayer { enabled: overrides.messaging_enabled },
            reports: ReportsLayer { enabled: overrides.reports_enabled, recipient: None },
            logging: LoggingLayer { level: overrides.log_level, format: None },
            ..Self::default()
        }
    }
}

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rentbot_core::config::{AppConfig, LoadOptions};
use toml::Value;

struct ConfigField {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

impl ConfigField {
    fn new(key: &'static str, value: impl Into<String>, env_keys: &'static [&'static str]) -> Self {
        Self { key, value: value.into(), env_keys }
    }
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(effective_fields(&config).into_iter().map(|field| {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        format!("- {} = {} (source: {source})", field.key, field.value)
    }));

    lines.join("\n")
}

fn effective_fields(config: &AppConfig) -> Vec<ConfigField> {
    let api_key = if config.llm.api_key.is_some() { "<redacted>" } else { "<unset>" };
    let llm_base_url = match &config.llm.base_url {
        Some(url) => url.clone(),
        None => format!("{} (provider default)", config.llm_base_url()),
    };

    vec![
        ConfigField::new("database.url", &config.database.url, &["RENTBOT_DATABASE_URL"]),
        ConfigField::new(
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["RENTBOT_DATABASE_MAX_CONNECTIONS"],
        ),
        ConfigField::new(
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["RENTBOT_DATABASE_TIMEOUT_SECS"],
        ),
        ConfigField::new(
            "llm.provider",
            format!("{:?}", config.llm.provider),
            &["RENTBOT_LLM_PROVIDER"],
        ),
        ConfigField::new("llm.model", &config.llm.model, &["RENTBOT_LLM_MODEL"]),
        ConfigField::new("llm.base_url", llm_base_url, &["RENTBOT_LLM_BASE_URL"]),
        ConfigField::new("llm.api_key", api_key, &["RENTBOT_LLM_API_KEY", "OPENAI_API_KEY"]),
        ConfigField::new(
            "llm.timeout_secs",
            config.llm.timeout_secs.to_string(),
            &["RENTBOT_LLM_TIMEOUT_SECS"],
        ),
        ConfigField::new(
            "llm.max_retries",
            config.llm.max_retries.to_string(),
            &["RENTBOT_LLM_MAX_RETRIES"],
        ),
        ConfigField::new(
            "server.bind_address",
            &config.server.bind_address,
            &["RENTBOT_SERVER_BIND_ADDRESS"],
        ),
        ConfigField::new("server.port", config.server.port.to_string(), &["RENTBOT_SERVER_PORT"]),
        ConfigField::new(
            "server.static_dir",
            &config.server.static_dir,
            &["RENTBOT_SERVER_STATIC_DIR"],
        ),
        ConfigField::new(
            "assistant.currency_code",
            &config.assistant.currency_code,
            &["RENTBOT_ASSISTANT_CURRENCY_CODE"],
        ),
        ConfigField::new(
            "assistant.seed_catalog",
            config.assistant.seed_catalog.to_string(),
            &["RENTBOT_ASSISTANT_SEED_CATALOG"],
        ),
        ConfigField::new(
            "messaging.enabled",
            config.messaging.enabled.to_string(),
            &["RENTBOT_MESSAGING_ENABLED"],
        ),
        ConfigField::new(
            "reports.enabled",
            config.reports.enabled.to_string(),
            &["RENTBOT_REPORTS_ENABLED"],
        ),
        ConfigField::new(
            "reports.recipient",
            config.reports.recipient.as_deref().unwrap_or("<unset>"),
            &["RENTBOT_REPORTS_RECIPIENT"],
        ),
        ConfigField::new(
            "logging.level",
            &config.logging.level,
            &["RENTBOT_LOGGING_LEVEL", "RENTBOT_LOG_LEVEL"],
        ),
        ConfigField::new(
            "logging.format",
            format!("{:?}", config.logging.format),
            &["RENTBOT_LOGGING_FORMAT", "RENTBOT_LOG_FORMAT"],
        ),
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("rentbot.toml"), PathBuf::from("config/rentbot.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use almanac_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

/// One reported key: its dotted path, display value, and the env vars that can set it.
struct Entry {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for entry in entries(&config) {
        let source = field_source(
            entry.key,
            entry.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(entry.key, &entry.value, source));
    }

    lines.join("\n")
}

fn entries(config: &AppConfig) -> Vec<Entry> {
    let llm_api_key = if config.llm.api_key.is_some() { "<redacted>" } else { "<unset>" };

    vec![
        Entry {
            key: "database.url",
            value: config.database.url.clone(),
            env_keys: &["ALMANAC_DATABASE_URL"],
        },
        Entry {
            key: "database.max_connections",
            value: config.database.max_connections.to_string(),
            env_keys: &["ALMANAC_DATABASE_MAX_CONNECTIONS"],
        },
        Entry {
            key: "database.connect_retries",
            value: config.database.connect_retries.to_string(),
            env_keys: &["ALMANAC_DATABASE_CONNECT_RETRIES"],
        },
        Entry {
            key: "telegram.bot_token",
            value: redact_token(config.telegram.bot_token.expose_secret()),
            env_keys: &["ALMANAC_TELEGRAM_BOT_TOKEN", "BOT_TOKEN"],
        },
        Entry {
            key: "telegram.api_base",
            value: config.telegram.api_base.clone(),
            env_keys: &["ALMANAC_TELEGRAM_API_BASE"],
        },
        Entry {
            key: "telegram.max_concurrent_messages",
            value: config.telegram.max_concurrent_messages.to_string(),
            env_keys: &["ALMANAC_TELEGRAM_MAX_CONCURRENT_MESSAGES"],
        },
        Entry {
            key: "llm.model",
            value: config.llm.model.clone(),
            env_keys: &["ALMANAC_LLM_MODEL"],
        },
        Entry {
            key: "llm.base_url",
            value: config.llm.base_url.clone(),
            env_keys: &["ALMANAC_LLM_BASE_URL"],
        },
        Entry {
            key: "llm.api_key",
            value: llm_api_key.to_string(),
            env_keys: &["ALMANAC_LLM_API_KEY", "AI_API_KEY"],
        },
        Entry {
            key: "llm.timeout_secs",
            value: config.llm.timeout_secs.to_string(),
            env_keys: &["ALMANAC_LLM_TIMEOUT_SECS"],
        },
        Entry {
            key: "authz.privileged_user_id",
            value: config.authz.privileged_user_id.clone().unwrap_or_else(|| "<unset>".to_string()),
            env_keys: &["ALMANAC_AUTHZ_PRIVILEGED_USER_ID", "ALLOWED_USER_ID"],
        },
        Entry {
            key: "server.bind_address",
            value: config.server.bind_address.clone(),
            env_keys: &["ALMANAC_SERVER_BIND_ADDRESS"],
        },
        Entry {
            key: "server.health_check_port",
            value: config.server.health_check_port.to_string(),
            env_keys: &["ALMANAC_SERVER_HEALTH_CHECK_PORT"],
        },
        Entry {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["ALMANAC_LOGGING_LEVEL", "ALMANAC_LOG_LEVEL"],
        },
        Entry {
            key: "logging.format",
            value: format!("{:?}", config.logging.format),
            env_keys: &["ALMANAC_LOGGING_FORMAT", "ALMANAC_LOG_FORMAT"],
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("almanac.toml"), PathBuf::from("config/almanac.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
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

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps the public bot id and hides the secret half of `<bot id>:<secret>`.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((bot_id, _)) = trimmed.split_once(':') {
        return format!("{bot_id}:***");
    }

    "<redacted>".to_string()
}

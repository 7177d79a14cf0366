use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub telegram: TelegramConfig,
    pub llm: LlmConfig,
    pub authz: AuthzConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
    pub connect_retries: u32,
    pub connect_backoff_ms: u64,
}

#[derive(Clone, Debug)]
pub struct TelegramConfig {
    pub bot_token: SecretString,
    pub api_base: String,
    pub poll_timeout_secs: u64,
    pub max_concurrent_messages: usize,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Clone, Debug)]
pub struct AuthzConfig {
    /// The only caller allowed to add, update or delete events.
    pub privileged_user_id: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub health_check_port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub llm_model: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_base_url: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub telegram_api_base: Option<String>,
    pub privileged_user_id: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_LLM_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_LLM_MODEL: &str = "gemini-2.5-flash";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://almanac.db?mode=rwc".to_string(),
                max_connections: 5,
                timeout_secs: 30,
                connect_retries: 3,
                connect_backoff_ms: 500,
            },
            telegram: TelegramConfig {
                bot_token: String::new().into(),
                api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
                poll_timeout_secs: 30,
                max_concurrent_messages: 4,
            },
            llm: LlmConfig {
                api_key: None,
                base_url: DEFAULT_LLM_BASE_URL.to_string(),
                model: DEFAULT_LLM_MODEL.to_string(),
                timeout_secs: 20,
                max_retries: 1,
            },
            authz: AuthzConfig { privileged_user_id: None },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                health_check_port: 8080,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("almanac.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
            if let Some(connect_retries) = database.connect_retries {
                self.database.connect_retries = connect_retries;
            }
            if let Some(connect_backoff_ms) = database.connect_backoff_ms {
                self.database.connect_backoff_ms = connect_backoff_ms;
            }
        }

        if let Some(telegram) = patch.telegram {
            if let Some(bot_token_value) = telegram.bot_token {
                self.telegram.bot_token = secret_value(bot_token_value);
            }
            if let Some(api_base) = telegram.api_base {
                self.telegram.api_base = api_base;
            }
            if let Some(poll_timeout_secs) = telegram.poll_timeout_secs {
                self.telegram.poll_timeout_secs = poll_timeout_secs;
            }
            if let Some(max_concurrent_messages) = telegram.max_concurrent_messages {
                self.telegram.max_concurrent_messages = max_concurrent_messages;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = base_url;
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
            if let Some(max_retries) = llm.max_retries {
                self.llm.max_retries = max_retries;
            }
        }

        if let Some(authz) = patch.authz {
            if let Some(privileged_user_id) = authz.privileged_user_id {
                self.authz.privileged_user_id = Some(privileged_user_id);
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(health_check_port) = server.health_check_port {
                self.server.health_check_port = health_check_port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("ALMANAC_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("ALMANAC_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("ALMANAC_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("ALMANAC_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("ALMANAC_DATABASE_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("ALMANAC_DATABASE_CONNECT_RETRIES") {
            self.database.connect_retries =
                parse_u32("ALMANAC_DATABASE_CONNECT_RETRIES", &value)?;
        }
        if let Some(value) = read_env("ALMANAC_DATABASE_CONNECT_BACKOFF_MS") {
            self.database.connect_backoff_ms =
                parse_u64("ALMANAC_DATABASE_CONNECT_BACKOFF_MS", &value)?;
        }

        let bot_token =
            read_env("ALMANAC_TELEGRAM_BOT_TOKEN").or_else(|| read_env("BOT_TOKEN"));
        if let Some(value) = bot_token {
            self.telegram.bot_token = secret_value(value);
        }
        if let Some(value) = read_env("ALMANAC_TELEGRAM_API_BASE") {
            self.telegram.api_base = value;
        }
        if let Some(value) = read_env("ALMANAC_TELEGRAM_POLL_TIMEOUT_SECS") {
            self.telegram.poll_timeout_secs =
                parse_u64("ALMANAC_TELEGRAM_POLL_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("ALMANAC_TELEGRAM_MAX_CONCURRENT_MESSAGES") {
            self.telegram.max_concurrent_messages =
                parse_usize("ALMANAC_TELEGRAM_MAX_CONCURRENT_MESSAGES", &value)?;
        }

        let llm_api_key = read_env("ALMANAC_LLM_API_KEY").or_else(|| read_env("AI_API_KEY"));
        if let Some(value) = llm_api_key {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("ALMANAC_LLM_BASE_URL") {
            self.llm.base_url = value;
        }
        if let Some(value) = read_env("ALMANAC_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("ALMANAC_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("ALMANAC_LLM_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("ALMANAC_LLM_MAX_RETRIES") {
            self.llm.max_retries = parse_u32("ALMANAC_LLM_MAX_RETRIES", &value)?;
        }

        let privileged_user_id = read_env("ALMANAC_AUTHZ_PRIVILEGED_USER_ID")
            .or_else(|| read_env("ALLOWED_USER_ID"));
        if let Some(value) = privileged_user_id {
            self.authz.privileged_user_id = Some(value);
        }

        if let Some(value) = read_env("ALMANAC_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("ALMANAC_SERVER_HEALTH_CHECK_PORT") {
            self.server.health_check_port =
                parse_u16("ALMANAC_SERVER_HEALTH_CHECK_PORT", &value)?;
        }
        if let Some(value) = read_env("ALMANAC_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("ALMANAC_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level = read_env("ALMANAC_LOGGING_LEVEL").or_else(|| read_env("ALMANAC_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("ALMANAC_LOGGING_FORMAT").or_else(|| read_env("ALMANAC_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = llm_model;
        }
        if let Some(llm_api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(llm_api_key));
        }
        if let Some(llm_base_url) = overrides.llm_base_url {
            self.llm.base_url = llm_base_url;
        }
        if let Some(telegram_bot_token) = overrides.telegram_bot_token {
            self.telegram.bot_token = secret_value(telegram_bot_token);
        }
        if let Some(telegram_api_base) = overrides.telegram_api_base {
            self.telegram.api_base = telegram_api_base;
        }
        if let Some(privileged_user_id) = overrides.privileged_user_id {
            self.authz.privileged_user_id = Some(privileged_user_id);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_telegram(&self.telegram)?;
        validate_llm(&self.llm)?;
        validate_authz(&self.authz)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("almanac.toml"), PathBuf::from("config/almanac.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if database.connect_retries > 10 {
        return Err(ConfigError::Validation(
            "database.connect_retries must be in range 0..=10".to_string(),
        ));
    }

    Ok(())
}

fn validate_telegram(telegram: &TelegramConfig) -> Result<(), ConfigError> {
    let bot_token = telegram.bot_token.expose_secret();
    if bot_token.is_empty() {
        return Err(ConfigError::Validation(
            "telegram.bot_token is required. Create a bot with @BotFather and copy the HTTP API token".to_string(),
        ));
    }

    let well_formed = bot_token
        .split_once(':')
        .map(|(bot_id, secret)| {
            !bot_id.is_empty() && bot_id.bytes().all(|b| b.is_ascii_digit()) && !secret.is_empty()
        })
        .unwrap_or(false);
    if !well_formed {
        return Err(ConfigError::Validation(
            "telegram.bot_token must look like `<bot id>:<secret>` as issued by @BotFather"
                .to_string(),
        ));
    }

    let api_base = telegram.api_base.trim();
    if !api_base.starts_with("http://") && !api_base.starts_with("https://") {
        return Err(ConfigError::Validation(
            "telegram.api_base must start with http:// or https://".to_string(),
        ));
    }

    if telegram.poll_timeout_secs > 50 {
        return Err(ConfigError::Validation(
            "telegram.poll_timeout_secs must be in range 0..=50".to_string(),
        ));
    }

    if telegram.max_concurrent_messages == 0 {
        return Err(ConfigError::Validation(
            "telegram.max_concurrent_messages must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if llm.max_retries > 1 {
        return Err(ConfigError::Validation(
            "llm.max_retries must be 0 or 1; classification is retried at most once".to_string(),
        ));
    }

    let missing_key =
        llm.api_key.as_ref().map(|value| value.expose_secret().trim().is_empty()).unwrap_or(true);
    if missing_key {
        return Err(ConfigError::Validation(
            "llm.api_key is required. Create a key at https://aistudio.google.com/apikey"
                .to_string(),
        ));
    }

    let base_url = llm.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "llm.base_url must start with http:// or https://".to_string(),
        ));
    }

    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }

    Ok(())
}

fn validate_authz(authz: &AuthzConfig) -> Result<(), ConfigError> {
    if let Some(user_id) = &authz.privileged_user_id {
        if user_id.trim().is_empty() || user_id.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(
                "authz.privileged_user_id must be a single non-empty identifier".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.health_check_port == 0 {
        return Err(ConfigError::Validation(
            "server.health_check_port must be greater than zero".to_string(),
        ));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    telegram: Option<TelegramPatch>,
    llm: Option<LlmPatch>,
    authz: Option<AuthzPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
    connect_retries: Option<u32>,
    connect_backoff_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct TelegramPatch {
    bot_token: Option<String>,
    api_base: Option<String>,
    poll_timeout_secs: Option<u64>,
    max_concurrent_messages: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthzPatch {
    privileged_user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    health_check_port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const MANAGED_VARS: &[&str] = &[
        "ALMANAC_DATABASE_URL",
        "ALMANAC_TELEGRAM_BOT_TOKEN",
        "ALMANAC_LLM_API_KEY",
        "ALMANAC_LLM_MAX_RETRIES",
        "ALMANAC_AUTHZ_PRIVILEGED_USER_ID",
        "ALMANAC_LOG_LEVEL",
        "ALMANAC_LOG_FORMAT",
        "BOT_TOKEN",
        "AI_API_KEY",
        "ALLOWED_USER_ID",
        "TEST_TELEGRAM_BOT_TOKEN",
        "TEST_LLM_API_KEY",
    ];

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars() {
        for var in MANAGED_VARS {
            env::remove_var(var);
        }
    }

    fn set_required_env() {
        env::set_var("ALMANAC_TELEGRAM_BOT_TOKEN", "123456:test-secret");
        env::set_var("ALMANAC_LLM_API_KEY", "llm-test-key");
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();

        env::set_var("TEST_TELEGRAM_BOT_TOKEN", "987654:from-env");
        env::set_var("TEST_LLM_API_KEY", "key-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("almanac.toml");
            fs::write(
                &path,
                r#"
[telegram]
bot_token = "${TEST_TELEGRAM_BOT_TOKEN}"

[llm]
api_key = "${TEST_LLM_API_KEY}"

[authz]
privileged_user_id = "5550001"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.telegram.bot_token.expose_secret() == "987654:from-env",
                "bot token should be interpolated from environment",
            )?;
            ensure(
                config.llm.api_key.as_ref().map(|key| key.expose_secret() == "key-from-env")
                    == Some(true),
                "llm key should be interpolated from environment",
            )?;
            ensure(
                config.authz.privileged_user_id.as_deref() == Some("5550001"),
                "privileged user id should come from the file",
            )?;
            Ok(())
        })();

        clear_vars();
        result
    }

    #[test]
    fn legacy_env_names_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();

        env::set_var("BOT_TOKEN", "111:legacy");
        env::set_var("AI_API_KEY", "legacy-key");
        env::set_var("ALLOWED_USER_ID", "42");
        env::set_var("ALMANAC_LOG_LEVEL", "warn");
        env::set_var("ALMANAC_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.telegram.bot_token.expose_secret() == "111:legacy", "legacy bot token")?;
            ensure(config.authz.privileged_user_id.as_deref() == Some("42"), "legacy user id")?;
            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars();
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();

        env::set_var("ALMANAC_DATABASE_URL", "sqlite://from-env.db");
        env::set_var("ALMANAC_TELEGRAM_BOT_TOKEN", "222:from-env");
        env::set_var("ALMANAC_LLM_API_KEY", "env-key");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("almanac.toml");
            fs::write(
                &path,
                r#"
[database]
url = "sqlite://from-file.db"

[telegram]
bot_token = "333:from-file"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    database_url: Some("sqlite://from-override.db".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.database.url == "sqlite://from-override.db",
                "override database url should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.telegram.bot_token.expose_secret() == "222:from-env",
                "env bot token should win over file and defaults",
            )?;
            Ok(())
        })();

        clear_vars();
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();

        env::set_var("ALMANAC_TELEGRAM_BOT_TOKEN", "not-a-bot-token");
        env::set_var("ALMANAC_LLM_API_KEY", "key");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("telegram.bot_token")
            );
            ensure(has_message, "validation failure should mention telegram.bot_token")
        })();

        clear_vars();
        result
    }

    #[test]
    fn classification_retries_are_capped_at_one() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();
        set_required_env();
        env::set_var("ALMANAC_LLM_MAX_RETRIES", "3");

        let result = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => Err("retry count above one should be rejected".to_string()),
            Err(ConfigError::Validation(message)) if message.contains("llm.max_retries") => Ok(()),
            Err(other) => Err(format!("unexpected error: {other}")),
        };

        clear_vars();
        result
    }

    #[test]
    fn missing_privileged_user_is_allowed() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();
        set_required_env();

        let result = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))
            .and_then(|config| {
                ensure(
                    config.authz.privileged_user_id.is_none(),
                    "privileged user should default to unset",
                )
            });

        clear_vars();
        result
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();

        env::set_var("ALMANAC_TELEGRAM_BOT_TOKEN", "444:bot-secret-value");
        env::set_var("ALMANAC_LLM_API_KEY", "llm-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("bot-secret-value"), "debug output should not contain bot token")?;
            ensure(!debug.contains("llm-secret-value"), "debug output should not contain llm key")?;
            ensure(
                matches!(config.logging.format, LogFormat::Compact),
                "default logging format should be compact",
            )?;
            Ok(())
        })();

        clear_vars();
        result
    }
}

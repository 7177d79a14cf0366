use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use almanac_core::config::TelegramConfig;
use almanac_core::{ChatGateway, ChatId, GatewayError, MessageFormat, OutboundMessage};

use crate::events::{RawUpdate, TelegramUpdate};

/// Longest text a single `sendMessage` call accepts.
pub const MAX_MESSAGE_CHARS: usize = 4096;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport failed to connect: {0}")]
    Connect(String),
    #[error("transport read failed: {0}")]
    Receive(String),
}

#[async_trait]
pub trait UpdateTransport: Send + Sync {
    async fn connect(&self) -> Result<(), TransportError>;
    /// `Ok(None)` means the update stream is closed.
    async fn poll_updates(
        &self,
        offset: Option<i64>,
    ) -> Result<Option<Vec<TelegramUpdate>>, TransportError>;
    async fn disconnect(&self) -> Result<(), TransportError>;
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BotUser {
    id: i64,
    username: Option<String>,
}

enum ApiFailure {
    Status { status: StatusCode, description: String },
    Transport(String),
}

impl ApiFailure {
    fn describe(&self) -> String {
        match self {
            Self::Status { status, description } => format!("{status}: {description}"),
            Self::Transport(message) => message.clone(),
        }
    }
}

/// Bot API client used both as the update source and as the chat gateway.
pub struct BotApiClient {
    http: reqwest::Client,
    api_base: String,
    token: SecretString,
    poll_timeout_secs: u64,
}

impl BotApiClient {
    pub fn new(config: &TelegramConfig) -> Result<Self, TransportError> {
        // getUpdates holds the request open for poll_timeout_secs.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + 10))
            .build()
            .map_err(|error| TransportError::Connect(error.to_string()))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            token: config.bot_token.clone(),
            poll_timeout_secs: config.poll_timeout_secs,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token.expose_secret(), method)
    }

    async fn call<T>(&self, method: &str, body: &Value) -> Result<T, ApiFailure>
    where
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|error| ApiFailure::Transport(error.without_url().to_string()))?;

        let status = response.status();
        let payload: ApiResponse<T> = response
            .json()
            .await
            .map_err(|error| ApiFailure::Transport(error.without_url().to_string()))?;

        match payload {
            ApiResponse { ok: true, result: Some(result), .. } if status.is_success() => Ok(result),
            ApiResponse { description, .. } => Err(ApiFailure::Status {
                status,
                description: description.unwrap_or_else(|| "no description".to_owned()),
            }),
        }
    }

    async fn send_chunk(
        &self,
        chat_id: &ChatId,
        text: &str,
        mut format: MessageFormat,
    ) -> Result<(), GatewayError> {
        loop {
            let mut body = json!({ "chat_id": chat_id_value(chat_id), "text": text });
            if format == MessageFormat::Markdown {
                body["parse_mode"] = json!("Markdown");
            }

            match self.call::<Value>("sendMessage", &body).await {
                Ok(_) => return Ok(()),
                Err(ApiFailure::Status { status, description })
                    if format == MessageFormat::Markdown
                        && status == StatusCode::BAD_REQUEST
                        && description.contains("can't parse entities") =>
                {
                    warn!(
                        event_name = "egress.telegram.markdown_rejected",
                        chat_id = %chat_id.0,
                        "markdown rejected; resending as plain text"
                    );
                    format = MessageFormat::Plain;
                }
                Err(ApiFailure::Status { status, description }) if status.is_client_error() => {
                    return Err(GatewayError::Rejected(format!("{status}: {description}")));
                }
                Err(failure) => return Err(GatewayError::Unavailable(failure.describe())),
            }
        }
    }
}

#[async_trait]
impl UpdateTransport for BotApiClient {
    async fn connect(&self) -> Result<(), TransportError> {
        let me: BotUser = self
            .call("getMe", &json!({}))
            .await
            .map_err(|failure| TransportError::Connect(failure.describe()))?;

        info!(
            event_name = "ingress.telegram.connected",
            bot_id = me.id,
            bot_username = me.username.as_deref().unwrap_or("unknown"),
            "telegram bot identity confirmed"
        );
        Ok(())
    }

    async fn poll_updates(
        &self,
        offset: Option<i64>,
    ) -> Result<Option<Vec<TelegramUpdate>>, TransportError> {
        let mut body = json!({ "timeout": self.poll_timeout_secs, "allowed_updates": ["message"] });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }

        let raw: Vec<RawUpdate> = self
            .call("getUpdates", &body)
            .await
            .map_err(|failure| TransportError::Receive(failure.describe()))?;

        debug!(event_name = "ingress.telegram.updates_polled", count = raw.len(), "polled updates");
        Ok(Some(raw.into_iter().map(TelegramUpdate::from).collect()))
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

#[async_trait]
impl ChatGateway for BotApiClient {
    async fn send(&self, message: OutboundMessage) -> Result<(), GatewayError> {
        for chunk in split_message(&message.text, MAX_MESSAGE_CHARS) {
            self.send_chunk(&message.chat_id, &chunk, message.format).await?;
        }
        Ok(())
    }
}

fn chat_id_value(chat_id: &ChatId) -> Value {
    chat_id.0.parse::<i64>().map(Value::from).unwrap_or_else(|_| Value::from(chat_id.0.clone()))
}

/// Splits on line boundaries where possible; a single overlong line is cut by characters.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if text.chars().count() <= limit {
        return vec![text.to_owned()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len > limit {
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(limit) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

//! Port between the dispatcher and whatever chat transport delivers messages.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallerId(pub String);

impl CallerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub from_user_id: CallerId,
    pub text: String,
    pub correlation_id: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageFormat {
    #[default]
    Markdown,
    Plain,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub format: MessageFormat,
}

impl OutboundMessage {
    pub fn markdown(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self { chat_id, text: text.into(), format: MessageFormat::Markdown }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("chat gateway rejected message: {0}")]
    Rejected(String),
    #[error("chat gateway unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn send(&self, message: OutboundMessage) -> Result<(), GatewayError>;
}

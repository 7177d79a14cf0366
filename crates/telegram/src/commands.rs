use async_trait::async_trait;
use thiserror::Error;

use crate::events::{ChatMessage, EventContext};
use crate::messages::{self, MessageTemplate};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BotCommand {
    Start,
    Hello,
    Help,
    Thanks,
    Delete,
}

impl BotCommand {
    /// Recognises `/name` and `/name@botname`, ignoring any trailing arguments.
    /// Unknown commands return `None` so they fall through to free-text handling.
    pub fn parse(text: &str) -> Option<Self> {
        let first = text.split_whitespace().next()?;
        let name = first.strip_prefix('/')?;
        let name = name.split_once('@').map(|(name, _bot)| name).unwrap_or(name);

        match name.to_ascii_lowercase().as_str() {
            "start" => Some(Self::Start),
            "hello" => Some(Self::Hello),
            "help" => Some(Self::Help),
            "thanks" => Some(Self::Thanks),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Hello => "hello",
            Self::Help => "help",
            Self::Thanks => "thanks",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandRouteError {
    #[error("command service failed: {0}")]
    Service(String),
}

/// Commands that need more than a fixed reply.
#[async_trait]
pub trait CommandService: Send + Sync {
    /// `Ok(None)` means the service already replied through the chat gateway.
    async fn delete_past_events(
        &self,
        message: &ChatMessage,
        ctx: &EventContext,
    ) -> Result<Option<MessageTemplate>, CommandRouteError>;
}

pub struct CommandRouter<S> {
    service: S,
}

impl<S> CommandRouter<S>
where
    S: CommandService,
{
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub async fn route(
        &self,
        command: BotCommand,
        message: &ChatMessage,
        ctx: &EventContext,
    ) -> Result<Option<MessageTemplate>, CommandRouteError> {
        match command {
            BotCommand::Start | BotCommand::Hello => Ok(Some(messages::greeting_message())),
            BotCommand::Help => Ok(Some(messages::help_message())),
            BotCommand::Thanks => Ok(Some(messages::thanks_message())),
            BotCommand::Delete => self.service.delete_past_events(message, ctx).await,
        }
    }
}

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    commands::{BotCommand, CommandRouteError, CommandRouter, CommandService},
    messages::MessageTemplate,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TelegramUpdate {
    pub update_id: i64,
    pub event: TelegramEvent,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelegramEvent {
    Command { command: BotCommand, message: ChatMessage },
    Message(ChatMessage),
    Unsupported { kind: String },
}

impl TelegramEvent {
    pub fn event_type(&self) -> TelegramEventType {
        match self {
            Self::Command { .. } => TelegramEventType::Command,
            Self::Message(_) => TelegramEventType::Message,
            Self::Unsupported { .. } => TelegramEventType::Unsupported,
        }
    }

    pub fn chat_id(&self) -> Option<i64> {
        match self {
            Self::Command { message, .. } | Self::Message(message) => Some(message.chat_id),
            Self::Unsupported { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TelegramEventType {
    Command,
    Message,
    Unsupported,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub chat_id: i64,
    pub from_user_id: i64,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawUpdate {
    update_id: i64,
    message: Option<RawMessage>,
    edited_message: Option<RawMessage>,
    channel_post: Option<RawMessage>,
    callback_query: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    chat: RawChat,
    from: Option<RawUser>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawChat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    id: i64,
}

impl From<RawUpdate> for TelegramUpdate {
    fn from(raw: RawUpdate) -> Self {
        let event = match raw.message {
            Some(RawMessage { chat, from: Some(from), text: Some(text) }) => {
                let message = ChatMessage { chat_id: chat.id, from_user_id: from.id, text };
                match BotCommand::parse(&message.text) {
                    Some(command) => TelegramEvent::Command { command, message },
                    None => TelegramEvent::Message(message),
                }
            }
            Some(_) => TelegramEvent::Unsupported { kind: "non_text_message".to_owned() },
            None if raw.edited_message.is_some() => {
                TelegramEvent::Unsupported { kind: "edited_message".to_owned() }
            }
            None if raw.channel_post.is_some() => {
                TelegramEvent::Unsupported { kind: "channel_post".to_owned() }
            }
            None if raw.callback_query.is_some() => {
                TelegramEvent::Unsupported { kind: "callback_query".to_owned() }
            }
            None => TelegramEvent::Unsupported { kind: "unknown".to_owned() },
        };

        Self { update_id: raw.update_id, event }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl EventContext {
    pub fn for_update(update: &TelegramUpdate) -> Self {
        Self { correlation_id: format!("upd-{}", update.update_id) }
    }
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerResult {
    Responded(MessageTemplate),
    Processed,
    Ignored,
}

impl From<Option<MessageTemplate>> for HandlerResult {
    fn from(reply: Option<MessageTemplate>) -> Self {
        match reply {
            Some(message) => Self::Responded(message),
            None => Self::Processed,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventHandlerError {
    #[error(transparent)]
    Route(#[from] CommandRouteError),
    #[error("message handler failure: {0}")]
    Message(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error(transparent)]
    Handler(#[from] EventHandlerError),
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    fn event_type(&self) -> TelegramEventType;
    async fn handle(
        &self,
        update: &TelegramUpdate,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError>;
}

#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<TelegramEventType, Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher wired with the command and free-text handlers.
    pub fn with_services<C, M>(commands: C, messages: M) -> Self
    where
        C: CommandService + 'static,
        M: MessageService + 'static,
    {
        let mut dispatcher = Self::new();
        dispatcher.register(CommandHandler::new(commands));
        dispatcher.register(MessageHandler::new(messages));
        dispatcher
    }

    pub fn register<H>(&mut self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.handlers.insert(handler.event_type(), Arc::new(handler));
    }

    pub async fn dispatch(
        &self,
        update: &TelegramUpdate,
        ctx: &EventContext,
    ) -> Result<HandlerResult, DispatchError> {
        let Some(handler) = self.handlers.get(&update.event.event_type()) else {
            return Ok(HandlerResult::Ignored);
        };

        handler.handle(update, ctx).await.map_err(DispatchError::from)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

pub struct CommandHandler<S> {
    router: CommandRouter<S>,
}

impl<S> CommandHandler<S>
where
    S: CommandService,
{
    pub fn new(service: S) -> Self {
        Self { router: CommandRouter::new(service) }
    }
}

#[async_trait]
impl<S> EventHandler for CommandHandler<S>
where
    S: CommandService + 'static,
{
    fn event_type(&self) -> TelegramEventType {
        TelegramEventType::Command
    }

    async fn handle(
        &self,
        update: &TelegramUpdate,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let TelegramEvent::Command { command, message } = &update.event else {
            return Ok(HandlerResult::Ignored);
        };

        debug!(
            event_name = "ingress.telegram.command_routed",
            correlation_id = %ctx.correlation_id,
            command = command.name(),
            "routing slash command"
        );
        let reply = self.router.route(*command, message, ctx).await?;
        Ok(reply.into())
    }
}

/// Free text that is not a recognised slash command.
#[async_trait]
pub trait MessageService: Send + Sync {
    async fn handle_message(
        &self,
        message: &ChatMessage,
        ctx: &EventContext,
    ) -> Result<Option<MessageTemplate>, EventHandlerError>;
}

pub struct MessageHandler<S> {
    service: S,
}

impl<S> MessageHandler<S>
where
    S: MessageService,
{
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<S> EventHandler for MessageHandler<S>
where
    S: MessageService + 'static,
{
    fn event_type(&self) -> TelegramEventType {
        TelegramEventType::Message
    }

    async fn handle(
        &self,
        update: &TelegramUpdate,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let TelegramEvent::Message(message) = &update.event else {
            return Ok(HandlerResult::Ignored);
        };

        let reply = self.service.handle_message(message, ctx).await?;
        Ok(reply.into())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::{
        ChatMessage, DispatchError, EventContext, EventDispatcher, EventHandlerError, HandlerResult,
        MessageService, RawUpdate, TelegramEvent, TelegramUpdate,
    };
    use crate::commands::{BotCommand, CommandRouteError, CommandService};
    use crate::messages::{MessageTemplate, GREETING};

    /// Echoes free text back; `/delete` replies out of band.
    pub(crate) struct EchoServices;

    #[async_trait]
    impl MessageService for EchoServices {
        async fn handle_message(
            &self,
            message: &ChatMessage,
            _ctx: &EventContext,
        ) -> Result<Option<MessageTemplate>, EventHandlerError> {
            if message.text == "boom" {
                return Err(EventHandlerError::Message("exploded".to_owned()));
            }
            Ok(Some(MessageTemplate::markdown(format!("echo: {}", message.text))))
        }
    }

    #[async_trait]
    impl CommandService for EchoServices {
        async fn delete_past_events(
            &self,
            _message: &ChatMessage,
            _ctx: &EventContext,
        ) -> Result<Option<MessageTemplate>, CommandRouteError> {
            Ok(None)
        }
    }

    pub(crate) fn update(update_id: i64, text: &str) -> TelegramUpdate {
        let raw: RawUpdate = serde_json::from_value(json!({
            "update_id": update_id,
            "message": {"message_id": 1, "chat": {"id": 42}, "from": {"id": 7}, "text": text}
        }))
        .expect("raw update");
        raw.into()
    }

    #[test]
    fn text_updates_become_commands_or_messages() {
        assert_eq!(
            update(1, "/hello@almanac_bot").event,
            TelegramEvent::Command {
                command: BotCommand::Hello,
                message: ChatMessage {
                    chat_id: 42,
                    from_user_id: 7,
                    text: "/hello@almanac_bot".to_owned()
                },
            }
        );
        assert!(matches!(update(2, "/unknown thing").event, TelegramEvent::Message(_)));
        assert!(matches!(update(3, "what is on friday").event, TelegramEvent::Message(_)));
    }

    #[test]
    fn non_text_updates_are_unsupported() {
        let photo: RawUpdate = serde_json::from_value(json!({
            "update_id": 9,
            "message": {"message_id": 1, "chat": {"id": 42}, "from": {"id": 7}, "photo": []}
        }))
        .expect("raw update");
        let edited: RawUpdate = serde_json::from_value(json!({
            "update_id": 10,
            "edited_message": {"message_id": 1, "chat": {"id": 42}, "text": "x"}
        }))
        .expect("raw update");

        assert_eq!(
            TelegramUpdate::from(photo).event,
            TelegramEvent::Unsupported { kind: "non_text_message".to_owned() }
        );
        assert_eq!(
            TelegramUpdate::from(edited).event,
            TelegramEvent::Unsupported { kind: "edited_message".to_owned() }
        );
    }

    #[tokio::test]
    async fn dispatcher_routes_by_event_type() {
        let dispatcher = EventDispatcher::with_services(EchoServices, EchoServices);
        assert_eq!(dispatcher.handler_count(), 2);
        let ctx = EventContext::default();

        let greeting = dispatcher.dispatch(&update(1, "/start"), &ctx).await.expect("dispatch");
        assert_eq!(greeting, HandlerResult::Responded(MessageTemplate::markdown(GREETING)));

        let echoed = dispatcher.dispatch(&update(2, "hi there"), &ctx).await.expect("dispatch");
        assert_eq!(echoed, HandlerResult::Responded(MessageTemplate::markdown("echo: hi there")));

        let deleted = dispatcher.dispatch(&update(3, "/delete"), &ctx).await.expect("dispatch");
        assert_eq!(deleted, HandlerResult::Processed);
    }

    #[tokio::test]
    async fn handler_failures_surface_as_dispatch_errors() {
        let dispatcher = EventDispatcher::with_services(EchoServices, EchoServices);
        let error = dispatcher
            .dispatch(&update(1, "boom"), &EventContext::default())
            .await
            .expect_err("handler should fail");
        assert_eq!(
            error,
            DispatchError::Handler(EventHandlerError::Message("exploded".to_owned()))
        );
    }

    #[tokio::test]
    async fn unregistered_event_types_are_ignored() {
        let dispatcher = EventDispatcher::new();
        let result = dispatcher
            .dispatch(&update(1, "hello"), &EventContext::default())
            .await
            .expect("dispatch");
        assert_eq!(result, HandlerResult::Ignored);
    }

    #[test]
    fn correlation_id_follows_update_id() {
        assert_eq!(EventContext::for_update(&update(77, "hi")).correlation_id, "upd-77");
    }
}

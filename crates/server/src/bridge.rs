use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use almanac_agent::AgentRuntime;
use almanac_core::{CallerId, ChatId, InboundMessage};
use almanac_telegram::commands::{CommandRouteError, CommandService};
use almanac_telegram::events::{ChatMessage, EventContext, EventHandlerError, MessageService};
use almanac_telegram::messages::MessageTemplate;

/// Hands Telegram messages to the agent runtime. The runtime replies through
/// the chat gateway itself, so nothing is returned for the poller to send.
#[derive(Clone)]
pub struct RuntimeBridge {
    runtime: Arc<AgentRuntime>,
}

impl RuntimeBridge {
    pub fn new(runtime: Arc<AgentRuntime>) -> Self {
        Self { runtime }
    }
}

fn inbound(message: &ChatMessage, ctx: &EventContext) -> InboundMessage {
    InboundMessage {
        chat_id: ChatId(message.chat_id.to_string()),
        from_user_id: CallerId(message.from_user_id.to_string()),
        text: message.text.clone(),
        correlation_id: ctx.correlation_id.clone(),
    }
}

#[async_trait]
impl MessageService for RuntimeBridge {
    async fn handle_message(
        &self,
        message: &ChatMessage,
        ctx: &EventContext,
    ) -> Result<Option<MessageTemplate>, EventHandlerError> {
        match self.runtime.handle_message(&inbound(message, ctx)).await {
            Ok(outcome) => {
                info!(
                    event_name = "agent.runtime.dispatched",
                    correlation_id = %ctx.correlation_id,
                    intent = outcome.intent_kind.map(|kind| kind.function_name()).unwrap_or("none"),
                    states = ?outcome.states(),
                    replies = outcome.replies.len(),
                    "message dispatched"
                );
                Ok(None)
            }
            Err(error) => {
                warn!(
                    event_name = "agent.runtime.dispatch_failed",
                    correlation_id = %ctx.correlation_id,
                    error = %error,
                    "message dispatch failed"
                );
                Err(EventHandlerError::Message(error.to_string()))
            }
        }
    }
}

#[async_trait]
impl CommandService for RuntimeBridge {
    async fn delete_past_events(
        &self,
        message: &ChatMessage,
        ctx: &EventContext,
    ) -> Result<Option<MessageTemplate>, CommandRouteError> {
        let outcome = self
            .runtime
            .delete_past_events(&inbound(message, ctx))
            .await
            .map_err(|error| CommandRouteError::Service(error.to_string()))?;

        info!(
            event_name = "agent.runtime.delete_dispatched",
            correlation_id = %ctx.correlation_id,
            states = ?outcome.states(),
            "delete command dispatched"
        );
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::json;

    use almanac_agent::llm::{FunctionCall, FunctionCallRequest, FunctionCallingClient, LlmError};
    use almanac_agent::{
        AgentRuntime, AuthorizationPolicy, EventStore, IntentClassifier, ToolRegistry,
    };
    use almanac_core::audit::InMemoryAuditSink;
    use almanac_core::{ChatGateway, FixedClock, GatewayError, NewEvent, OutboundMessage};
    use almanac_db::{EventRepository, InMemoryEventRepository};
    use almanac_telegram::commands::BotCommand;
    use almanac_telegram::events::{
        ChatMessage, EventContext, EventDispatcher, HandlerResult, TelegramEvent, TelegramUpdate,
    };

    use super::RuntimeBridge;

    struct FixedCall(Option<FunctionCall>);

    #[async_trait]
    impl FunctionCallingClient for FixedCall {
        async fn call_function(
            &self,
            _request: &FunctionCallRequest,
        ) -> Result<Option<FunctionCall>, LlmError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct RecordingGateway {
        sent: Mutex<Vec<String>>,
    }

    impl RecordingGateway {
        fn texts(&self) -> Vec<String> {
            self.sent.lock().expect("sent lock").clone()
        }
    }

    #[async_trait]
    impl ChatGateway for RecordingGateway {
        async fn send(&self, message: OutboundMessage) -> Result<(), GatewayError> {
            self.sent.lock().expect("sent lock").push(message.text);
            Ok(())
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).expect("date")
    }

    fn dispatcher(
        call: Option<FunctionCall>,
        repository: Arc<InMemoryEventRepository>,
        gateway: Arc<RecordingGateway>,
    ) -> EventDispatcher {
        let clock = Arc::new(FixedClock(today()));
        let classifier = IntentClassifier::new(
            Arc::new(FixedCall(call)),
            ToolRegistry::event_functions(),
            clock.clone(),
            Duration::from_secs(5),
        );
        let runtime = AgentRuntime::new(
            classifier,
            EventStore::new(repository, clock),
            AuthorizationPolicy::new(Some("42".to_string())),
            gateway,
            Arc::new(InMemoryAuditSink::default()),
        );
        let bridge = RuntimeBridge::new(Arc::new(runtime));
        EventDispatcher::with_services(bridge.clone(), bridge)
    }

    fn chat(from_user_id: i64, text: &str) -> ChatMessage {
        ChatMessage { chat_id: 100, from_user_id, text: text.to_string() }
    }

    #[tokio::test]
    async fn free_text_from_operator_adds_event() {
        let repository = Arc::new(InMemoryEventRepository::default());
        let gateway = Arc::new(RecordingGateway::default());
        let call = FunctionCall {
            name: "add_event".to_string(),
            args: json!({"name": "team sync", "date": "2025-12-13"}),
        };
        let dispatcher = dispatcher(Some(call), repository.clone(), gateway.clone());

        let update = TelegramUpdate {
            update_id: 5,
            event: TelegramEvent::Message(chat(42, "Remind me about the team sync on 2025-12-13")),
        };
        let result =
            dispatcher.dispatch(&update, &EventContext::for_update(&update)).await.expect("dispatch");

        assert_eq!(result, HandlerResult::Processed);
        assert_eq!(gateway.texts(), vec!["Event added successfully"]);
        assert_eq!(repository.find_by_name("team sync").await.expect("find").len(), 1);
    }

    #[tokio::test]
    async fn delete_command_from_stranger_is_denied() {
        let past = NaiveDate::from_ymd_opt(2025, 1, 1).expect("date");
        let repository = Arc::new(InMemoryEventRepository::with_events([
            NewEvent::new("exam", past).expect("event"),
        ]));
        let gateway = Arc::new(RecordingGateway::default());
        let dispatcher = dispatcher(None, repository.clone(), gateway.clone());

        let update = TelegramUpdate {
            update_id: 6,
            event: TelegramEvent::Command { command: BotCommand::Delete, message: chat(7, "/delete") },
        };
        dispatcher.dispatch(&update, &EventContext::for_update(&update)).await.expect("dispatch");

        assert_eq!(gateway.texts(), vec!["You are not authorised to delete updates"]);
        assert_eq!(repository.list_all().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn delete_command_from_operator_clears_past_events() {
        let past = NaiveDate::from_ymd_opt(2025, 1, 1).expect("date");
        let future = NaiveDate::from_ymd_opt(2025, 9, 1).expect("date");
        let repository = Arc::new(InMemoryEventRepository::with_events([
            NewEvent::new("exam", past).expect("event"),
            NewEvent::new("gala", future).expect("event"),
        ]));
        let gateway = Arc::new(RecordingGateway::default());
        let dispatcher = dispatcher(None, repository.clone(), gateway.clone());

        let update = TelegramUpdate {
            update_id: 7,
            event: TelegramEvent::Command {
                command: BotCommand::Delete,
                message: chat(42, "/delete"),
            },
        };
        dispatcher.dispatch(&update, &EventContext::for_update(&update)).await.expect("dispatch");

        assert_eq!(gateway.texts(), vec!["Events deleted successfully."]);
        let remaining = repository.list_all().await.expect("list");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "gala");
    }
}

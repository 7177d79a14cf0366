use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use almanac_core::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use almanac_core::domain::event::format_iso_date;
use almanac_core::{
    ApplicationError, ChatGateway, Classification, DispatchEvent, DispatchFlow, DispatchState,
    DispatchTrace, DispatchTransitionError, GatewayError, InboundMessage, Intent, IntentKind,
    OutboundMessage,
};

use crate::classifier::IntentClassifier;
use crate::guardrails::{AuthorizationPolicy, GuardedAction, GuardrailDecision};
use crate::store::{EventStore, StoreError};

pub const FALLBACK_MESSAGE: &str = "I am not sure if I can do that. Type /help to explore more";
pub const NO_EVENTS_MESSAGE: &str = "No events found.";

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Transition(#[from] DispatchTransitionError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// What one inbound message did: the states it passed through and every
/// reply that went out, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub trace: DispatchTrace,
    pub replies: Vec<String>,
    pub intent_kind: Option<IntentKind>,
}

impl DispatchOutcome {
    pub fn states(&self) -> &[DispatchState] {
        self.trace.states()
    }
}

pub struct AgentRuntime {
    classifier: IntentClassifier,
    store: EventStore,
    policy: AuthorizationPolicy,
    gateway: Arc<dyn ChatGateway>,
    audit: Arc<dyn AuditSink>,
    flow: DispatchFlow,
}

/// Per-message bookkeeping: advances the trace and records replies as they go out.
struct Dispatch<'a> {
    runtime: &'a AgentRuntime,
    message: &'a InboundMessage,
    trace: DispatchTrace,
    replies: Vec<String>,
    intent_kind: Option<IntentKind>,
}

impl Dispatch<'_> {
    fn advance(&mut self, event: DispatchEvent) -> Result<(), RuntimeError> {
        self.runtime.flow.apply(&mut self.trace, event)?;
        Ok(())
    }

    async fn send(&mut self, text: impl Into<String>) -> Result<(), RuntimeError> {
        let text = text.into();
        self.runtime
            .gateway
            .send(OutboundMessage::markdown(self.message.chat_id.clone(), text.clone()))
            .await?;
        self.replies.push(text);
        Ok(())
    }

    async fn respond(mut self, text: impl Into<String>) -> Result<DispatchOutcome, RuntimeError> {
        self.send(text).await?;
        if self.trace.current() != DispatchState::Responded {
            self.advance(DispatchEvent::ReplySent)?;
        }

        info!(
            event_name = "agent.runtime.dispatch_completed",
            correlation_id = %self.message.correlation_id,
            intent = self.intent_kind.map(IntentKind::function_name).unwrap_or("none"),
            states = ?self.trace.states(),
            replies = self.replies.len(),
            "message dispatched"
        );

        Ok(DispatchOutcome { trace: self.trace, replies: self.replies, intent_kind: self.intent_kind })
    }
}

impl AgentRuntime {
    pub fn new(
        classifier: IntentClassifier,
        store: EventStore,
        policy: AuthorizationPolicy,
        gateway: Arc<dyn ChatGateway>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self { classifier, store, policy, gateway, audit, flow: DispatchFlow }
    }

    fn begin<'a>(&'a self, message: &'a InboundMessage) -> Dispatch<'a> {
        Dispatch {
            runtime: self,
            message,
            trace: DispatchTrace::default(),
            replies: Vec::new(),
            intent_kind: None,
        }
    }

    /// Runs one free-text message through classify, authorize, execute, respond.
    pub async fn handle_message(
        &self,
        message: &InboundMessage,
    ) -> Result<DispatchOutcome, RuntimeError> {
        let mut dispatch = self.begin(message);

        let classification = match self.classifier.classify(&message.text).await {
            Ok(classification) => classification,
            Err(error) => {
                warn!(
                    event_name = "agent.runtime.classification_failed",
                    correlation_id = %message.correlation_id,
                    error = %error,
                    "classification failed, replying with fallback"
                );
                dispatch.advance(DispatchEvent::ClassificationFailed)?;
                return dispatch.respond(FALLBACK_MESSAGE).await;
            }
        };

        dispatch.advance(DispatchEvent::MessageClassified)?;
        let (kind, intent) = match classification {
            Classification::None => {
                dispatch.advance(DispatchEvent::NoIntent)?;
                return dispatch.respond(FALLBACK_MESSAGE).await;
            }
            Classification::Intent(intent) => (intent.kind(), Ok(intent)),
            Classification::Invalid { kind, error } => (kind, Err(error)),
        };
        dispatch.intent_kind = Some(kind);

        if let Some(denial) = self.authorize(message, GuardedAction::Intent(kind)) {
            dispatch.advance(DispatchEvent::AccessDenied)?;
            return dispatch.respond(denial).await;
        }
        dispatch.advance(DispatchEvent::AccessGranted)?;

        let intent = match intent {
            Ok(intent) => intent,
            Err(error) => {
                info!(
                    event_name = "agent.runtime.validation_failed",
                    correlation_id = %message.correlation_id,
                    error = %error,
                    "intent arguments failed validation"
                );
                dispatch.advance(DispatchEvent::OperationFailed)?;
                let interface =
                    ApplicationError::Domain(error).into_interface(message.correlation_id.clone());
                return dispatch.respond(interface.user_message()).await;
            }
        };

        if let Some(acknowledgement) = acknowledgement(&intent) {
            dispatch.send(acknowledgement).await?;
        }

        let result = match &intent {
            Intent::ListAll => self.store.list_all().await,
            Intent::Add(args) => self.store.add(&args.name, args.date).await,
            Intent::Update(args) => self.store.update(&args.name, args.date).await,
            Intent::ListBeforeDate(args) => self.store.get_before_date(args.date).await,
            Intent::FindByName(args) => self.store.find_by_name(&args.name).await,
        };

        let reply = self.finish_operation(&mut dispatch, GuardedAction::Intent(kind), result)?;
        dispatch.respond(reply).await
    }

    /// Administrative bulk delete of everything dated today or earlier.
    pub async fn delete_past_events(
        &self,
        message: &InboundMessage,
    ) -> Result<DispatchOutcome, RuntimeError> {
        let mut dispatch = self.begin(message);
        dispatch.advance(DispatchEvent::MessageClassified)?;

        if let Some(denial) = self.authorize(message, GuardedAction::DeletePastEvents) {
            dispatch.advance(DispatchEvent::AccessDenied)?;
            return dispatch.respond(denial).await;
        }
        dispatch.advance(DispatchEvent::AccessGranted)?;

        let result = self.store.delete_before(self.store.today()).await;
        let reply = self.finish_operation(&mut dispatch, GuardedAction::DeletePastEvents, result)?;
        dispatch.respond(reply).await
    }

    fn authorize(&self, message: &InboundMessage, action: GuardedAction) -> Option<String> {
        let decision = self.policy.evaluate(&message.from_user_id, action);
        let context = AuditContext::new(
            Some(message.chat_id.0.clone()),
            message.correlation_id.clone(),
            message.from_user_id.as_str(),
        );
        if let Some(event) = self.policy.audit_event(&context, action, &decision) {
            self.audit.emit(event);
        }

        match decision {
            GuardrailDecision::Allow => None,
            GuardrailDecision::Deny { reason_code, user_message } => {
                info!(
                    event_name = "agent.runtime.access_denied",
                    correlation_id = %message.correlation_id,
                    action = action.action_key(),
                    reason_code,
                    "mutation denied"
                );
                Some(user_message)
            }
        }
    }

    fn finish_operation(
        &self,
        dispatch: &mut Dispatch<'_>,
        action: GuardedAction,
        result: Result<String, StoreError>,
    ) -> Result<String, RuntimeError> {
        let correlation_id = dispatch.message.correlation_id.clone();
        let failure = match result {
            Ok(text) => {
                dispatch.advance(DispatchEvent::OperationCompleted)?;
                self.audit_mutation(dispatch.message, action, AuditOutcome::Success);
                if text.is_empty() {
                    return Ok(NO_EVENTS_MESSAGE.to_string());
                }
                return Ok(text);
            }
            Err(StoreError::Validation(error)) => ApplicationError::Domain(error),
            Err(StoreError::Repository(source)) => {
                error!(
                    event_name = "agent.runtime.store_failed",
                    correlation_id = %correlation_id,
                    error = %source,
                    "event store operation failed"
                );
                ApplicationError::Persistence(source.to_string())
            }
        };

        dispatch.advance(DispatchEvent::OperationFailed)?;
        self.audit_mutation(dispatch.message, action, AuditOutcome::Failed);
        Ok(failure.into_interface(correlation_id).user_message().to_string())
    }

    /// Records the result of a write that got past authorization; reads are not audited.
    fn audit_mutation(
        &self,
        message: &InboundMessage,
        action: GuardedAction,
        outcome: AuditOutcome,
    ) {
        if !action.is_mutating() {
            return;
        }
        let context = AuditContext::new(
            Some(message.chat_id.0.clone()),
            message.correlation_id.clone(),
            message.from_user_id.as_str(),
        );
        let event_type = match outcome {
            AuditOutcome::Success => "store.mutation_applied",
            AuditOutcome::Rejected | AuditOutcome::Failed => "store.mutation_failed",
        };
        self.audit.emit(
            AuditEvent::new(&context, event_type, AuditCategory::Persistence, outcome)
                .with_metadata("action", action.action_key()),
        );
    }
}

fn acknowledgement(intent: &Intent) -> Option<String> {
    match intent {
        Intent::ListAll => Some("Fetching all events...".to_string()),
        Intent::ListBeforeDate(args) => {
            Some(format!("Fetching all events before {}", format_iso_date(args.date)))
        }
        Intent::FindByName(args) => Some(format!("Fetching date for {}", args.name)),
        Intent::Add(_) | Intent::Update(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use almanac_core::audit::{AuditCategory, AuditOutcome, InMemoryAuditSink};
    use almanac_core::{
        CallerId, ChatGateway, ChatId, DispatchState, FixedClock, GatewayError, InboundMessage,
        IntentKind, OutboundMessage,
    };
    use almanac_db::EventRepository;

    use super::{AgentRuntime, FALLBACK_MESSAGE, NO_EVENTS_MESSAGE};
    use crate::classifier::tests::ScriptedClient;
    use crate::classifier::IntentClassifier;
    use crate::guardrails::AuthorizationPolicy;
    use crate::llm::LlmError;
    use crate::store::tests::{date, CountingRepository, FailingRepository};
    use crate::store::EventStore;
    use crate::tools::ToolRegistry;

    const OPERATOR: &str = "5550001";
    const STRANGER: &str = "777";

    #[derive(Default)]
    struct RecordingGateway {
        sent: Mutex<Vec<OutboundMessage>>,
    }

    impl RecordingGateway {
        fn texts(&self) -> Vec<String> {
            self.sent.lock().expect("sent lock").iter().map(|message| message.text.clone()).collect()
        }
    }

    #[async_trait]
    impl ChatGateway for RecordingGateway {
        async fn send(&self, message: OutboundMessage) -> Result<(), GatewayError> {
            self.sent.lock().expect("sent lock").push(message);
            Ok(())
        }
    }

    struct Harness {
        runtime: AgentRuntime,
        repository: Arc<CountingRepository>,
        gateway: Arc<RecordingGateway>,
        audit: InMemoryAuditSink,
    }

    fn harness(client: ScriptedClient) -> Harness {
        harness_with_repository(client, Arc::new(CountingRepository::default()))
    }

    fn harness_with_repository(
        client: ScriptedClient,
        repository: Arc<CountingRepository>,
    ) -> Harness {
        let clock = Arc::new(FixedClock(date(2025, 6, 1)));
        let gateway = Arc::new(RecordingGateway::default());
        let audit = InMemoryAuditSink::default();
        let classifier = IntentClassifier::new(
            Arc::new(client),
            ToolRegistry::event_functions(),
            clock.clone(),
            Duration::from_secs(5),
        );
        let runtime = AgentRuntime::new(
            classifier,
            EventStore::new(repository.clone(), clock),
            AuthorizationPolicy::new(Some(OPERATOR.to_string())),
            gateway.clone(),
            Arc::new(audit.clone()),
        );
        Harness { runtime, repository, gateway, audit }
    }

    fn message(from: &str, text: &str) -> InboundMessage {
        InboundMessage {
            chat_id: ChatId("-100200".to_string()),
            from_user_id: CallerId(from.to_string()),
            text: text.to_string(),
            correlation_id: "upd-1".to_string(),
        }
    }

    #[tokio::test]
    async fn operator_adds_event() {
        let h = harness(ScriptedClient::calling(
            "add_event",
            json!({"name": "team sync", "date": "2025-12-13"}),
        ));

        let outcome = h
            .runtime
            .handle_message(&message(OPERATOR, "Remind me about the team sync on 2025-12-13"))
            .await
            .expect("dispatch");

        assert_eq!(outcome.replies, vec!["Event added successfully".to_string()]);
        assert_eq!(outcome.intent_kind, Some(IntentKind::Add));
        assert_eq!(
            outcome.states(),
            &[
                DispatchState::Received,
                DispatchState::Classified,
                DispatchState::Authorized,
                DispatchState::Executed,
                DispatchState::Responded,
            ]
        );
        assert_eq!(h.repository.inner.find_by_name("team sync").await.expect("find").len(), 1);
        assert_eq!(h.gateway.texts(), outcome.replies);
    }

    #[tokio::test]
    async fn operator_writes_are_audited_after_authorization() {
        let h = harness(ScriptedClient::calling(
            "update_event",
            json!({"name": "gala", "date": "2026-01-02"}),
        ));

        h.runtime.handle_message(&message(OPERATOR, "move gala")).await.expect("dispatch");

        let audited = h.audit.events();
        let kinds: Vec<(&str, AuditCategory, AuditOutcome)> = audited
            .iter()
            .map(|event| (event.event_type.as_str(), event.category.clone(), event.outcome.clone()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("authz.mutation_allowed", AuditCategory::Authorization, AuditOutcome::Success),
                ("store.mutation_applied", AuditCategory::Persistence, AuditOutcome::Success),
            ]
        );
        assert_eq!(audited[1].metadata.get("action").map(String::as_str), Some("update_event"));
    }

    #[tokio::test]
    async fn reads_leave_no_audit_trail() {
        let h = harness(ScriptedClient::calling("get_all_events", json!({})));

        h.runtime.handle_message(&message(OPERATOR, "list")).await.expect("dispatch");

        assert!(h.audit.events().is_empty());
    }

    #[tokio::test]
    async fn stranger_cannot_add_and_store_is_untouched() {
        let h = harness(ScriptedClient::calling(
            "add_event",
            json!({"name": "team sync", "date": "2025-12-13"}),
        ));

        let outcome = h
            .runtime
            .handle_message(&message(STRANGER, "Remind me about the team sync on 2025-12-13"))
            .await
            .expect("dispatch");

        assert_eq!(outcome.replies, vec!["You are not authorised to add updates".to_string()]);
        assert!(outcome.trace.visited(DispatchState::Denied));
        assert!(!outcome.trace.visited(DispatchState::Executed));
        assert_eq!(h.repository.calls(), 0);

        let audited = h.audit.events();
        assert_eq!(audited.len(), 1);
        assert_eq!(audited[0].outcome, AuditOutcome::Rejected);
        assert_eq!(audited[0].actor, STRANGER);
    }

    #[tokio::test]
    async fn stranger_cannot_update() {
        let h = harness(ScriptedClient::calling(
            "update_event",
            json!({"name": "gala", "date": "2026-01-02"}),
        ));

        let outcome =
            h.runtime.handle_message(&message(STRANGER, "move gala")).await.expect("dispatch");

        assert_eq!(outcome.replies, vec!["You are not authorised to update events".to_string()]);
        assert_eq!(h.repository.calls(), 0);
    }

    #[tokio::test]
    async fn past_cutoff_is_acknowledged_then_refused_without_store_access() {
        let h = harness(ScriptedClient::calling("get_datewise_event", json!({"date": "2024-07-29"})));

        let outcome = h
            .runtime
            .handle_message(&message(STRANGER, "what events are before 2024-07-29"))
            .await
            .expect("dispatch");

        assert_eq!(
            outcome.replies,
            vec![
                "Fetching all events before 2024-07-29".to_string(),
                "Invalid date was entered.".to_string(),
            ]
        );
        assert_eq!(h.repository.calls(), 0);
    }

    #[tokio::test]
    async fn gibberish_gets_the_fallback() {
        let h = harness(ScriptedClient::with_reply(Ok(None)));

        let outcome = h.runtime.handle_message(&message(STRANGER, "qwzx plok")).await.expect("dispatch");

        assert_eq!(outcome.replies, vec![FALLBACK_MESSAGE.to_string()]);
        assert_eq!(
            outcome.states(),
            &[DispatchState::Received, DispatchState::Classified, DispatchState::Responded]
        );
        assert_eq!(outcome.intent_kind, None);
    }

    #[tokio::test]
    async fn classification_failure_gets_the_fallback() {
        let h = harness(ScriptedClient::with_reply(Err(LlmError::HttpStatus {
            status: 503,
            body: "overloaded".to_string(),
        })));

        let outcome = h.runtime.handle_message(&message(OPERATOR, "list")).await.expect("dispatch");

        assert_eq!(outcome.replies, vec![FALLBACK_MESSAGE.to_string()]);
        assert_eq!(h.repository.calls(), 0);
    }

    #[tokio::test]
    async fn empty_listing_is_replaced_with_placeholder() {
        let h = harness(ScriptedClient::calling("get_all_events", json!({})));

        let outcome = h.runtime.handle_message(&message(STRANGER, "show events")).await.expect("dispatch");

        assert_eq!(
            outcome.replies,
            vec!["Fetching all events...".to_string(), NO_EVENTS_MESSAGE.to_string()]
        );
    }

    #[tokio::test]
    async fn added_event_is_found_by_name() {
        let h = harness(
            ScriptedClient::calling("add_event", json!({"name": "gala", "date": "2026-01-02"}))
                .then_calling("get_specific_event", json!({"name": "gala"})),
        );

        h.runtime.handle_message(&message(OPERATOR, "add gala jan 2")).await.expect("add");
        let outcome =
            h.runtime.handle_message(&message(STRANGER, "when is gala")).await.expect("find");

        assert_eq!(
            outcome.replies,
            vec!["Fetching date for gala".to_string(), "Date: 02/01/2026".to_string()]
        );
    }

    #[tokio::test]
    async fn update_is_reflected_by_find() {
        let h = harness(
            ScriptedClient::calling("add_event", json!({"name": "gala", "date": "2026-01-02"}))
                .then_calling("update_event", json!({"name": "gala", "date": "2026-02-14"}))
                .then_calling("get_specific_event", json!({"name": "gala"})),
        );

        h.runtime.handle_message(&message(OPERATOR, "add gala")).await.expect("add");
        let updated = h.runtime.handle_message(&message(OPERATOR, "move gala")).await.expect("update");
        let found = h.runtime.handle_message(&message(OPERATOR, "when is gala")).await.expect("find");

        assert_eq!(updated.replies, vec!["Event updated successfully".to_string()]);
        assert_eq!(found.replies.last().map(String::as_str), Some("Date: 14/02/2026"));
    }

    #[tokio::test]
    async fn invalid_arguments_are_denied_before_validation_for_strangers() {
        let h = harness(ScriptedClient::calling("add_event", json!({"name": "gala", "date": "soon"})));

        let outcome = h.runtime.handle_message(&message(STRANGER, "add gala soon")).await.expect("dispatch");

        assert_eq!(outcome.replies, vec!["You are not authorised to add updates".to_string()]);
    }

    #[tokio::test]
    async fn invalid_arguments_explain_themselves_to_the_operator() {
        let h = harness(ScriptedClient::calling("add_event", json!({"name": "gala", "date": "soon"})));

        let outcome = h.runtime.handle_message(&message(OPERATOR, "add gala soon")).await.expect("dispatch");

        assert_eq!(outcome.replies, vec!["Invalid date was entered.".to_string()]);
        assert!(outcome.trace.visited(DispatchState::Executed));
        assert_eq!(h.repository.calls(), 0);
    }

    #[tokio::test]
    async fn store_failure_gets_generic_reply() {
        let clock = Arc::new(FixedClock(date(2025, 6, 1)));
        let gateway = Arc::new(RecordingGateway::default());
        let runtime = AgentRuntime::new(
            IntentClassifier::new(
                Arc::new(ScriptedClient::calling("get_all_events", json!({}))),
                ToolRegistry::event_functions(),
                clock.clone(),
                Duration::from_secs(5),
            ),
            EventStore::new(Arc::new(FailingRepository), clock),
            AuthorizationPolicy::new(Some(OPERATOR.to_string())),
            gateway.clone(),
            Arc::new(InMemoryAuditSink::default()),
        );

        let outcome = runtime.handle_message(&message(STRANGER, "list")).await.expect("dispatch");

        assert_eq!(
            outcome.replies.last().map(String::as_str),
            Some("Something went wrong while accessing events. Please try again later.")
        );
    }

    #[tokio::test]
    async fn failed_delete_is_audited_as_a_persistence_failure() {
        let clock = Arc::new(FixedClock(date(2025, 6, 1)));
        let audit = InMemoryAuditSink::default();
        let runtime = AgentRuntime::new(
            IntentClassifier::new(
                Arc::new(ScriptedClient::with_reply(Ok(None))),
                ToolRegistry::event_functions(),
                clock.clone(),
                Duration::from_secs(5),
            ),
            EventStore::new(Arc::new(FailingRepository), clock),
            AuthorizationPolicy::new(Some(OPERATOR.to_string())),
            Arc::new(RecordingGateway::default()),
            Arc::new(audit.clone()),
        );

        let outcome =
            runtime.delete_past_events(&message(OPERATOR, "/delete")).await.expect("delete");

        assert_eq!(
            outcome.replies,
            vec!["Something went wrong while accessing events. Please try again later.".to_string()]
        );
        let failed = audit.events().pop().expect("persistence audit event");
        assert_eq!(failed.event_type, "store.mutation_failed");
        assert_eq!(failed.category, AuditCategory::Persistence);
        assert_eq!(failed.outcome, AuditOutcome::Failed);
    }

    #[tokio::test]
    async fn repeated_delete_returns_same_text_and_keeps_future_events() {
        let h = harness(ScriptedClient::with_reply(Ok(None)));
        h.repository
            .inner
            .insert(almanac_core::NewEvent::new("old", date(2025, 5, 1)).expect("event"))
            .await
            .expect("seed");
        h.repository
            .inner
            .insert(almanac_core::NewEvent::new("next", date(2025, 9, 1)).expect("event"))
            .await
            .expect("seed");

        let first = h.runtime.delete_past_events(&message(OPERATOR, "/delete")).await.expect("delete");
        let second = h.runtime.delete_past_events(&message(OPERATOR, "/delete")).await.expect("delete");

        assert_eq!(first.replies, vec!["Events deleted successfully.".to_string()]);
        assert_eq!(second.replies, first.replies);
        let remaining = h.repository.inner.list_all().await.expect("list");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "next");
    }

    #[tokio::test]
    async fn stranger_cannot_delete() {
        let h = harness(ScriptedClient::with_reply(Ok(None)));

        let outcome = h.runtime.delete_past_events(&message(STRANGER, "/delete")).await.expect("delete");

        assert_eq!(outcome.replies, vec!["You are not authorised to delete updates".to_string()]);
        assert_eq!(h.repository.calls(), 0);
        assert_eq!(h.audit.events().len(), 1);
    }

    #[tokio::test]
    async fn shared_store_is_visible_across_runtimes() {
        let repository = Arc::new(CountingRepository::default());
        let writer = harness_with_repository(
            ScriptedClient::calling("add_event", json!({"name": "expo", "date": "2025-08-08"})),
            repository.clone(),
        );
        let reader = harness_with_repository(
            ScriptedClient::calling("get_datewise_event", json!({"date": "2025-12-31"})),
            repository,
        );

        writer.runtime.handle_message(&message(OPERATOR, "add expo")).await.expect("add");
        let outcome =
            reader.runtime.handle_message(&message(STRANGER, "before new year")).await.expect("list");

        assert_eq!(outcome.replies.last().map(String::as_str), Some("Event: expo | Date: 08/08/2025"));
    }
}

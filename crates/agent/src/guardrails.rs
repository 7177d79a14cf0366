use almanac_core::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome};
use almanac_core::{CallerId, IntentKind};

pub const ADD_DENIED_MESSAGE: &str = "You are not authorised to add updates";
pub const UPDATE_DENIED_MESSAGE: &str = "You are not authorised to update events";
pub const DELETE_DENIED_MESSAGE: &str = "You are not authorised to delete updates";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardedAction {
    Intent(IntentKind),
    DeletePastEvents,
}

impl GuardedAction {
    pub fn action_key(&self) -> &'static str {
        match self {
            Self::Intent(kind) => kind.function_name(),
            Self::DeletePastEvents => "delete_past_events",
        }
    }

    pub fn is_mutating(&self) -> bool {
        match self {
            Self::Intent(kind) => kind.is_mutating(),
            Self::DeletePastEvents => true,
        }
    }

    fn denial_message(&self) -> &'static str {
        match self {
            Self::Intent(IntentKind::Update) => UPDATE_DENIED_MESSAGE,
            Self::DeletePastEvents => DELETE_DENIED_MESSAGE,
            Self::Intent(_) => ADD_DENIED_MESSAGE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardrailDecision {
    Allow,
    Deny { reason_code: &'static str, user_message: String },
}

impl GuardrailDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Reads are open to everyone; writes belong to a single configured operator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorizationPolicy {
    privileged_user_id: Option<String>,
}

impl AuthorizationPolicy {
    pub fn new(privileged_user_id: Option<String>) -> Self {
        Self { privileged_user_id }
    }

    pub fn privileged_user_id(&self) -> Option<&str> {
        self.privileged_user_id.as_deref()
    }

    pub fn evaluate(&self, caller: &CallerId, action: GuardedAction) -> GuardrailDecision {
        if !action.is_mutating() {
            return GuardrailDecision::Allow;
        }

        match self.privileged_user_id.as_deref() {
            Some(privileged) if privileged == caller.as_str() => GuardrailDecision::Allow,
            Some(_) => GuardrailDecision::Deny {
                reason_code: "caller_not_privileged",
                user_message: action.denial_message().to_string(),
            },
            None => GuardrailDecision::Deny {
                reason_code: "privileged_user_unconfigured",
                user_message: action.denial_message().to_string(),
            },
        }
    }

    /// Audit record for a decision on a mutating action; reads are not audited.
    pub fn audit_event(
        &self,
        context: &AuditContext,
        action: GuardedAction,
        decision: &GuardrailDecision,
    ) -> Option<AuditEvent> {
        if !action.is_mutating() {
            return None;
        }

        let event = match decision {
            GuardrailDecision::Allow => AuditEvent::new(
                context,
                "authz.mutation_allowed",
                AuditCategory::Authorization,
                AuditOutcome::Success,
            ),
            GuardrailDecision::Deny { reason_code, .. } => AuditEvent::new(
                context,
                "authz.mutation_denied",
                AuditCategory::Authorization,
                AuditOutcome::Rejected,
            )
            .with_metadata("reason_code", *reason_code),
        };

        Some(event.with_metadata("action", action.action_key()))
    }
}

use thiserror::Error;

use crate::flows::states::{DispatchEvent, DispatchState, DispatchTrace};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DispatchTransitionError {
    #[error("invalid dispatch transition from {state:?} using event {event:?}")]
    InvalidTransition { state: DispatchState, event: DispatchEvent },
}

/// Per-message lifecycle: classify, authorize, execute, respond.
#[derive(Clone, Copy, Debug, Default)]
pub struct DispatchFlow;

impl DispatchFlow {
    pub fn initial_state(&self) -> DispatchState {
        DispatchState::Received
    }

    pub fn transition(
        &self,
        current: DispatchState,
        event: DispatchEvent,
    ) -> Result<DispatchState, DispatchTransitionError> {
        use DispatchEvent::{
            AccessDenied, AccessGranted, ClassificationFailed, MessageClassified, NoIntent,
            OperationCompleted, OperationFailed, ReplySent,
        };
        use DispatchState::{Authorized, Classified, Denied, Executed, Received, Responded};

        let next = match (current, event) {
            (Received, MessageClassified) => Classified,
            // The classification service never answered.
            (Received, ClassificationFailed) => Responded,
            (Classified, NoIntent) => Responded,
            (Classified, AccessGranted) => Authorized,
            (Classified, AccessDenied) => Denied,
            (Denied, ReplySent) => Responded,
            (Authorized, OperationCompleted) | (Authorized, OperationFailed) => Executed,
            (Executed, ReplySent) => Responded,
            (state, event) => {
                return Err(DispatchTransitionError::InvalidTransition { state, event });
            }
        };

        Ok(next)
    }

    pub fn apply(
        &self,
        trace: &mut DispatchTrace,
        event: DispatchEvent,
    ) -> Result<DispatchState, DispatchTransitionError> {
        let next = self.transition(trace.current(), event)?;
        trace.push(next);
        Ok(next)
    }
}

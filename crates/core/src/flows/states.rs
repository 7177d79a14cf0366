use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchState {
    Received,
    Classified,
    Authorized,
    Denied,
    Executed,
    Responded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchEvent {
    MessageClassified,
    NoIntent,
    ClassificationFailed,
    AccessGranted,
    AccessDenied,
    OperationCompleted,
    OperationFailed,
    ReplySent,
}

/// States visited while handling one inbound message, in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchTrace {
    states: Vec<DispatchState>,
}

impl Default for DispatchTrace {
    fn default() -> Self {
        Self { states: vec![DispatchState::Received] }
    }
}

impl DispatchTrace {
    pub fn current(&self) -> DispatchState {
        self.states.last().copied().unwrap_or(DispatchState::Received)
    }

    pub fn push(&mut self, state: DispatchState) {
        self.states.push(state);
    }

    pub fn states(&self) -> &[DispatchState] {
        &self.states
    }

    pub fn visited(&self, state: DispatchState) -> bool {
        self.states.contains(&state)
    }
}
